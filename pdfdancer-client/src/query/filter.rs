//! Client-side filtering of snapshot elements.

use regex::Regex;

use crate::error::{PdfDancerError, PdfDancerResult};
use crate::models::{BoundingRect, ObjectType, Position, SnapshotElement};

/// Margin in points added around both rectangles before the overlap test
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Overlap test on rectangles grown by `tolerance` on every side.
/// Zero-size rectangles (point queries) match anything within `tolerance`.
pub fn rects_intersect(a: &BoundingRect, b: &BoundingRect, tolerance: f64) -> bool {
    let (a_left, a_right) = (a.x - tolerance, a.x + a.width + tolerance);
    let (a_top, a_bottom) = (a.y - tolerance, a.y + a.height + tolerance);
    let (b_left, b_right) = (b.x - tolerance, b.x + b.width + tolerance);
    let (b_top, b_bottom) = (b.y - tolerance, b.y + b.height + tolerance);

    if a_right < b_left || b_right < a_left {
        return false;
    }
    if a_bottom < b_top || b_bottom < a_top {
        return false;
    }
    true
}

/// A type filter plus the optional predicates of a [`Position`], compiled once.
///
/// Stages run in a fixed order: type, text prefix, text pattern, bounding
/// rectangle, field name. Empty strings count as absent.
#[derive(Debug)]
pub struct ElementFilter<'a> {
    object_type: ObjectType,
    prefix: Option<String>,
    pattern: Option<Regex>,
    rect: Option<&'a BoundingRect>,
    name: Option<&'a str>,
    tolerance: f64,
}

impl<'a> ElementFilter<'a> {
    pub fn new(
        object_type: ObjectType,
        position: Option<&'a Position>,
        tolerance: f64,
    ) -> PdfDancerResult<Self> {
        let non_empty = |value: &'a Option<String>| value.as_deref().filter(|v| !v.is_empty());

        let pattern = position
            .and_then(|p| non_empty(&p.text_pattern))
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    PdfDancerError::validation(format!("Invalid text pattern {:?}: {}", pattern, e))
                })
            })
            .transpose()?;

        Ok(Self {
            object_type,
            prefix: position
                .and_then(|p| non_empty(&p.text_starts_with))
                .map(str::to_lowercase),
            pattern,
            rect: position.and_then(|p| p.bounding_rect.as_ref()),
            name: position.and_then(|p| non_empty(&p.name)),
            tolerance,
        })
    }

    pub fn matches(&self, element: &SnapshotElement) -> bool {
        if !element.object_type().satisfies(self.object_type) {
            return false;
        }

        if let Some(prefix) = &self.prefix {
            match element.text().filter(|text| !text.is_empty()) {
                Some(text) if text.to_lowercase().starts_with(prefix.as_str()) => {}
                _ => return false,
            }
        }

        if let Some(pattern) = &self.pattern {
            match element.text().filter(|text| !text.is_empty()) {
                Some(text) if pattern.is_match(text) => {}
                _ => return false,
            }
        }

        if let Some(rect) = self.rect {
            match element.bounding_rect() {
                Some(bounds) if rects_intersect(bounds, rect, self.tolerance) => {}
                _ => return false,
            }
        }

        if let Some(name) = self.name {
            return element.name() == Some(name);
        }
        true
    }

    /// Matching elements, cloned, in source order
    pub fn apply<'e>(&self, elements: impl IntoIterator<Item = &'e SnapshotElement>) -> Vec<SnapshotElement> {
        elements
            .into_iter()
            .filter(|element| self.matches(element))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FormFieldRef, ObjectRef, TextObjectRef};

    fn text(id: &str, value: &str) -> SnapshotElement {
        let mut text = TextObjectRef::new(ObjectRef::new(id, Position::at_page(0), ObjectType::Paragraph));
        text.text = Some(value.to_string());
        SnapshotElement::Text(text)
    }

    fn placed(id: &str, object_type: ObjectType, rect: BoundingRect) -> SnapshotElement {
        SnapshotElement::Object(ObjectRef::new(
            id,
            Position::at_page(0).with_bounding_rect(rect),
            object_type,
        ))
    }

    fn field(id: &str, object_type: ObjectType, name: &str) -> SnapshotElement {
        SnapshotElement::FormField(FormFieldRef {
            object_ref: ObjectRef::new(id, Position::at_page(0), object_type),
            name: Some(name.to_string()),
            value: None,
        })
    }

    fn ids(elements: &[SnapshotElement]) -> Vec<&str> {
        elements.iter().map(|e| e.internal_id()).collect()
    }

    #[test]
    fn test_tolerant_point_intersection() {
        let point = BoundingRect::point(10.0, 10.0);
        let near = BoundingRect::new(10.005, 9.995, 5.0, 5.0);
        let far = BoundingRect::new(50.0, 50.0, 5.0, 5.0);

        assert!(rects_intersect(&near, &point, DEFAULT_TOLERANCE));
        assert!(!rects_intersect(&far, &point, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_point_just_outside_tolerance() {
        let point = BoundingRect::point(0.0, 0.0);
        let edge = BoundingRect::new(0.019, 0.0, 1.0, 1.0);
        let beyond = BoundingRect::new(0.021, 0.0, 1.0, 1.0);

        assert!(rects_intersect(&edge, &point, DEFAULT_TOLERANCE));
        assert!(!rects_intersect(&beyond, &point, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_case_insensitive_prefix() {
        let elements = vec![
            text("a", "Hello World"),
            text("b", "hello there"),
            text("c", "Goodbye"),
        ];
        let position = Position::at_page(0).with_text_starts("hello");
        let filter = ElementFilter::new(ObjectType::Paragraph, Some(&position), DEFAULT_TOLERANCE).unwrap();

        assert_eq!(ids(&filter.apply(&elements)), vec!["a", "b"]);
    }

    #[test]
    fn test_text_filters_drop_non_text_elements() {
        let elements = vec![
            text("p", "Invoice 2024"),
            field("f", ObjectType::TextField, "invoice"),
        ];
        let position = Position::default().with_text_starts("invoice");
        let filter = ElementFilter::new(ObjectType::FormField, Some(&position), DEFAULT_TOLERANCE).unwrap();
        assert!(filter.apply(&elements).is_empty());
    }

    #[test]
    fn test_pattern_is_unanchored_search() {
        let elements = vec![
            text("a", "Total: 42 EUR"),
            text("b", "Subtotal"),
            text("c", ""),
        ];
        let position = Position::default().with_text_pattern(r"\d+ EUR");
        let filter = ElementFilter::new(ObjectType::Paragraph, Some(&position), DEFAULT_TOLERANCE).unwrap();

        assert_eq!(ids(&filter.apply(&elements)), vec!["a"]);
    }

    #[test]
    fn test_invalid_pattern_is_validation_error() {
        let position = Position::default().with_text_pattern("(unclosed");
        let result = ElementFilter::new(ObjectType::Paragraph, Some(&position), DEFAULT_TOLERANCE);
        assert!(matches!(result, Err(PdfDancerError::Validation { .. })));
    }

    #[test]
    fn test_form_field_supertype() {
        let elements = vec![
            field("t", ObjectType::TextField, "name"),
            field("c", ObjectType::CheckBox, "agree"),
            field("r", ObjectType::RadioButton, "choice"),
            text("p", "Name"),
        ];
        let filter = ElementFilter::new(ObjectType::FormField, None, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(ids(&filter.apply(&elements)), vec!["t", "c", "r"]);
    }

    #[test]
    fn test_name_filter_is_exact() {
        let elements = vec![
            field("a", ObjectType::TextField, "email"),
            field("b", ObjectType::TextField, "Email"),
            field("c", ObjectType::TextField, "email"),
        ];
        let position = Position::by_name("email");
        let filter = ElementFilter::new(ObjectType::FormField, Some(&position), DEFAULT_TOLERANCE).unwrap();
        assert_eq!(ids(&filter.apply(&elements)), vec!["a", "c"]);
    }

    #[test]
    fn test_bounding_rect_requires_element_bounds() {
        let elements = vec![
            placed("near", ObjectType::Image, BoundingRect::new(100.0, 100.0, 50.0, 50.0)),
            SnapshotElement::Object(ObjectRef::new("unplaced", Position::at_page(0), ObjectType::Image)),
            placed("far", ObjectType::Image, BoundingRect::new(400.0, 400.0, 10.0, 10.0)),
        ];
        let position = Position::at_page_coordinates(0, 120.0, 130.0);
        let filter = ElementFilter::new(ObjectType::Image, Some(&position), DEFAULT_TOLERANCE).unwrap();
        assert_eq!(ids(&filter.apply(&elements)), vec!["near"]);
    }

    #[test]
    fn test_empty_strings_are_ignored() {
        let elements = vec![text("a", "anything")];
        let position = Position {
            text_starts_with: Some(String::new()),
            text_pattern: Some(String::new()),
            name: Some(String::new()),
            ..Default::default()
        };
        let filter = ElementFilter::new(ObjectType::Paragraph, Some(&position), DEFAULT_TOLERANCE).unwrap();
        assert_eq!(ids(&filter.apply(&elements)), vec!["a"]);
    }
}
