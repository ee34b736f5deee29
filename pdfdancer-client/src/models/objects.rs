//! Outbound objects submitted by add and modify requests.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Value, json};
use strum::{Display, EnumString};

use super::geometry::{Point, Position};
use super::refs::{Color, ObjectType};
use crate::error::{PdfDancerError, PdfDancerResult};

/// The 14 base fonts every PDF reader provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
pub enum StandardFont {
    #[strum(serialize = "Times-Roman")]
    TimesRoman,
    #[strum(serialize = "Times-Bold")]
    TimesBold,
    #[strum(serialize = "Times-Italic")]
    TimesItalic,
    #[strum(serialize = "Times-BoldItalic")]
    TimesBoldItalic,
    #[strum(serialize = "Helvetica")]
    Helvetica,
    #[strum(serialize = "Helvetica-Bold")]
    HelveticaBold,
    #[strum(serialize = "Helvetica-Oblique")]
    HelveticaOblique,
    #[strum(serialize = "Helvetica-BoldOblique")]
    HelveticaBoldOblique,
    #[strum(serialize = "Courier")]
    Courier,
    #[strum(serialize = "Courier-Bold")]
    CourierBold,
    #[strum(serialize = "Courier-Oblique")]
    CourierOblique,
    #[strum(serialize = "Courier-BoldOblique")]
    CourierBoldOblique,
    #[strum(serialize = "Symbol")]
    Symbol,
    #[strum(serialize = "ZapfDingbats")]
    ZapfDingbats,
}

/// Font face and size in points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub name: String,
    pub size: f64,
}

impl Font {
    pub fn new(name: impl Into<String>, size: f64) -> PdfDancerResult<Self> {
        if !(size > 0.0) {
            return Err(PdfDancerError::validation(format!(
                "Font size must be positive, got {}",
                size
            )));
        }
        Ok(Self {
            name: name.into(),
            size,
        })
    }

    pub fn standard(font: StandardFont, size: f64) -> PdfDancerResult<Self> {
        Self::new(font.to_string(), size)
    }
}

/// Multi-line paragraph, one entry per line
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub position: Option<Position>,
    pub text_lines: Vec<String>,
    pub font: Option<Font>,
    pub color: Option<Color>,
    pub line_spacing: f64,
}

impl Default for Paragraph {
    fn default() -> Self {
        Self {
            position: None,
            text_lines: Vec::new(),
            font: None,
            color: None,
            line_spacing: 1.2,
        }
    }
}

impl Paragraph {
    /// Paragraph whose lines come from splitting `text` on newlines
    pub fn from_text(text: &str, font: Font, position: Position) -> Self {
        Self {
            position: Some(position),
            text_lines: text.lines().map(str::to_string).collect(),
            font: Some(font),
            ..Default::default()
        }
    }

    fn payload(&self) -> Value {
        let position = self.position.as_ref();
        let color = self.color.as_ref();
        let lines: Vec<Value> = self
            .text_lines
            .iter()
            .map(|line| {
                let mut text_line = json!({
                    "textElements": [{
                        "text": line,
                        "font": self.font,
                        "color": color,
                        "position": position,
                    }]
                });
                if let Some(color) = color {
                    text_line["color"] = json!(color);
                }
                if let Some(position) = position {
                    text_line["position"] = json!(position);
                }
                text_line
            })
            .collect();

        json!({
            "type": "PARAGRAPH",
            "position": position,
            "lines": lines,
            "lineSpacings": [self.line_spacing],
            "font": self.font,
        })
    }
}

/// Raster image placed on a page
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Image {
    pub position: Option<Position>,
    /// Format hint such as `PNG` or `JPEG`
    pub format: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub data: Option<Bytes>,
}

impl Image {
    fn payload(&self) -> Value {
        let size = match (self.width, self.height) {
            (Some(width), Some(height)) => json!({ "width": width, "height": height }),
            _ => Value::Null,
        };
        json!({
            "type": "IMAGE",
            "position": self.position,
            "format": self.format,
            "size": size,
            "data": self.data.as_ref().map(|data| BASE64.encode(data)),
        })
    }
}

/// Geometry of a single path segment
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentGeometry {
    Line { p0: Point, p1: Point },
    Bezier { p0: Point, p1: Point, p2: Point, p3: Point },
}

/// One stroke of a vector path with its styling
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub geometry: SegmentGeometry,
    pub stroke_color: Option<Color>,
    pub fill_color: Option<Color>,
    pub stroke_width: Option<f64>,
    /// Empty for a solid stroke
    pub dash_array: Vec<f64>,
    pub dash_phase: Option<f64>,
}

impl PathSegment {
    pub fn line(p0: Point, p1: Point) -> Self {
        Self::from_geometry(SegmentGeometry::Line { p0, p1 })
    }

    pub fn bezier(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self::from_geometry(SegmentGeometry::Bezier { p0, p1, p2, p3 })
    }

    fn from_geometry(geometry: SegmentGeometry) -> Self {
        Self {
            geometry,
            stroke_color: None,
            fill_color: None,
            stroke_width: None,
            dash_array: Vec::new(),
            dash_phase: None,
        }
    }

    fn payload(&self, position: Option<&Position>) -> Value {
        let mut segment = serde_json::Map::new();
        if let Some(color) = &self.stroke_color {
            segment.insert("strokeColor".into(), json!(color));
        }
        if let Some(color) = &self.fill_color {
            segment.insert("fillColor".into(), json!(color));
        }
        if let Some(width) = self.stroke_width {
            segment.insert("strokeWidth".into(), json!(width));
        }
        if !self.dash_array.is_empty() {
            segment.insert("dashArray".into(), json!(self.dash_array));
        }
        if let Some(phase) = self.dash_phase {
            segment.insert("dashPhase".into(), json!(phase));
        }

        let (kind, points) = match &self.geometry {
            SegmentGeometry::Line { p0, p1 } => ("LINE", vec![("p0", p0), ("p1", p1)]),
            SegmentGeometry::Bezier { p0, p1, p2, p3 } => (
                "BEZIER",
                vec![("p0", p0), ("p1", p1), ("p2", p2), ("p3", p3)],
            ),
        };
        segment.insert("type".into(), json!(kind));
        segment.insert("segmentType".into(), json!(kind));
        for (key, point) in points {
            segment.insert(key.into(), json!(point));
        }

        // The server validates each segment's position individually
        if let Some(position) = position {
            segment.insert("position".into(), json!(position));
        }
        Value::Object(segment)
    }
}

/// Vector path made of line and bezier segments
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub position: Option<Position>,
    pub segments: Vec<PathSegment>,
    pub even_odd_fill: Option<bool>,
}

impl Path {
    fn payload(&self) -> Value {
        let segments: Vec<Value> = self
            .segments
            .iter()
            .map(|segment| segment.payload(self.position.as_ref()))
            .collect();
        json!({
            "type": "PATH",
            "position": self.position,
            "pathSegments": if segments.is_empty() { Value::Null } else { Value::Array(segments) },
            "evenOddFill": self.even_odd_fill,
        })
    }
}

/// Any object the server can add or use as a replacement
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    Paragraph(Paragraph),
    Image(Image),
    Path(Path),
}

impl PdfObject {
    pub fn object_type(&self) -> ObjectType {
        match self {
            PdfObject::Paragraph(_) => ObjectType::Paragraph,
            PdfObject::Image(_) => ObjectType::Image,
            PdfObject::Path(_) => ObjectType::Path,
        }
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            PdfObject::Paragraph(paragraph) => paragraph.position.as_ref(),
            PdfObject::Image(image) => image.position.as_ref(),
            PdfObject::Path(path) => path.position.as_ref(),
        }
    }

    /// Objects must be anchored to a page before they can be submitted
    pub fn validate(&self) -> PdfDancerResult<()> {
        let label = match self {
            PdfObject::Paragraph(_) => "Paragraph",
            PdfObject::Image(_) => "Image",
            PdfObject::Path(_) => "Path",
        };
        let position = self
            .position()
            .ok_or_else(|| PdfDancerError::validation(format!("{} position is null", label)))?;
        if position.page_index.is_none() {
            return Err(PdfDancerError::validation(format!(
                "{} position page index is null",
                label
            )));
        }
        if let PdfObject::Paragraph(paragraph) = self
            && paragraph.text_lines.is_empty()
        {
            return Err(PdfDancerError::validation("Paragraph has no text lines"));
        }
        Ok(())
    }

    /// JSON form of the object with its `type` discriminator
    pub fn to_payload(&self) -> Value {
        match self {
            PdfObject::Paragraph(paragraph) => paragraph.payload(),
            PdfObject::Image(image) => image.payload(),
            PdfObject::Path(path) => path.payload(),
        }
    }
}

impl From<Paragraph> for PdfObject {
    fn from(paragraph: Paragraph) -> Self {
        PdfObject::Paragraph(paragraph)
    }
}

impl From<Image> for PdfObject {
    fn from(image: Image) -> Self {
        PdfObject::Image(image)
    }
}

impl From<Path> for PdfObject {
    fn from(path: Path) -> Self {
        PdfObject::Path(path)
    }
}
