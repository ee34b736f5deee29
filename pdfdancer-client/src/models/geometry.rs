//! Positions and rectangles in page coordinates (PDF points).

use serde::Serialize;
use strum::{Display, EnumString};

/// A 2D point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle. Point queries use zero width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn point(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 0.0)
    }

    pub fn is_point(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// Geometric shape used when matching by area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShapeType {
    Point,
    Line,
    Circle,
    Rect,
}

/// How objects are matched against a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionMode {
    Intersect,
    Contains,
}

/// Query and placement descriptor.
///
/// Every field is optional; an empty `Position` means "whole document, no filter".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub page_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<PositionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_rect: Option<BoundingRect>,
    /// Case-insensitive text prefix
    pub text_starts_with: Option<String>,
    /// Regular expression searched (unanchored) in the text
    pub text_pattern: Option<String>,
    /// Form field name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Position {
    /// Whole page
    pub fn at_page(page_index: usize) -> Self {
        Self {
            page_index: Some(page_index),
            mode: Some(PositionMode::Contains),
            ..Default::default()
        }
    }

    /// A single point on a page
    pub fn at_page_coordinates(page_index: usize, x: f64, y: f64) -> Self {
        let mut position = Self::at_page(page_index);
        position.at_coordinates(Point::new(x, y));
        position
    }

    /// Form fields by name, across the whole document
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Switch this position to a point query
    pub fn at_coordinates(&mut self, point: Point) -> &mut Self {
        self.mode = Some(PositionMode::Contains);
        self.shape = Some(ShapeType::Point);
        self.bounding_rect = Some(BoundingRect::point(point.x, point.y));
        self
    }

    pub fn with_text_starts(mut self, text: impl Into<String>) -> Self {
        self.text_starts_with = Some(text.into());
        self
    }

    pub fn with_text_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.text_pattern = Some(pattern.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_bounding_rect(mut self, rect: BoundingRect) -> Self {
        self.bounding_rect = Some(rect);
        self
    }

    /// Shift horizontally. No-op without coordinates.
    pub fn move_x(&mut self, offset: f64) -> &mut Self {
        if let (Some(x), Some(y)) = (self.x(), self.y()) {
            self.at_coordinates(Point::new(x + offset, y));
        }
        self
    }

    /// Shift vertically. No-op without coordinates.
    pub fn move_y(&mut self, offset: f64) -> &mut Self {
        if let (Some(x), Some(y)) = (self.x(), self.y()) {
            self.at_coordinates(Point::new(x, y + offset));
        }
        self
    }

    pub fn x(&self) -> Option<f64> {
        self.bounding_rect.map(|rect| rect.x)
    }

    pub fn y(&self) -> Option<f64> {
        self.bounding_rect.map(|rect| rect.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_position() {
        let position = Position::at_page_coordinates(2, 72.0, 720.0);
        assert_eq!(position.page_index, Some(2));
        assert_eq!(position.shape, Some(ShapeType::Point));
        assert_eq!(position.mode, Some(PositionMode::Contains));
        assert!(position.bounding_rect.unwrap().is_point());
    }

    #[test]
    fn test_relative_moves() {
        let mut position = Position::at_page_coordinates(0, 10.0, 20.0);
        position.move_x(5.0).move_y(-12.0);
        assert_eq!(position.x(), Some(15.0));
        assert_eq!(position.y(), Some(8.0));

        let mut named = Position::by_name("Email");
        named.move_y(-12.0);
        assert_eq!(named.bounding_rect, None);
    }

    #[test]
    fn test_wire_shape() {
        let position = Position::at_page_coordinates(1, 3.0, 4.0).with_text_starts("Hello");
        let value = serde_json::to_value(&position).unwrap();
        assert_eq!(value["pageIndex"], 1);
        assert_eq!(value["shape"], "POINT");
        assert_eq!(value["mode"], "CONTAINS");
        assert_eq!(value["textStartsWith"], "Hello");
        assert!(value["textPattern"].is_null());
        assert!(value.get("name").is_none());
        assert_eq!(value["boundingRect"]["width"], 0.0);
    }
}
