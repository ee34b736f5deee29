//! References to objects that already exist on the server.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use strum::{Display, EnumString};

use super::geometry::Position;
use crate::error::{PdfDancerError, PdfDancerResult};

/// Server object type discriminator used in refs, requests and snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    Page,
    Paragraph,
    TextLine,
    Image,
    Path,
    #[strum(serialize = "FORM_X_OBJECT")]
    #[serde(rename = "FORM_X_OBJECT")]
    FormXObject,
    FormField,
    TextField,
    CheckBox,
    RadioButton,
    Button,
    Dropdown,
}

impl ObjectType {
    /// Parse a server type string. Servers emit both `CHECKBOX` and `CHECK_BOX`,
    /// and `FORM` for form XObjects.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "CHECKBOX" => Some(ObjectType::CheckBox),
            "FORM" => Some(ObjectType::FormXObject),
            other => other.parse().ok(),
        }
    }

    /// Type string the server expects in request payloads
    pub fn wire_name(&self) -> String {
        match self {
            ObjectType::CheckBox => "CHECKBOX".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ObjectType::Paragraph | ObjectType::TextLine)
    }

    /// Form field and its concrete subtypes
    pub fn is_form_field(&self) -> bool {
        matches!(
            self,
            ObjectType::FormField
                | ObjectType::TextField
                | ObjectType::CheckBox
                | ObjectType::RadioButton
        )
    }

    /// Whether an element of this type satisfies a query for `requested`.
    /// `FORM_FIELD` is a supertype of the concrete field types.
    pub fn satisfies(&self, requested: ObjectType) -> bool {
        if requested == ObjectType::FormField {
            self.is_form_field()
        } else {
            *self == requested
        }
    }
}

/// Identifies a single object known to the server
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRef {
    pub internal_id: String,
    pub position: Position,
    pub object_type: ObjectType,
}

impl ObjectRef {
    pub fn new(internal_id: impl Into<String>, position: Position, object_type: ObjectType) -> Self {
        Self {
            internal_id: internal_id.into(),
            position,
            object_type,
        }
    }

    pub fn page_index(&self) -> Option<usize> {
        self.position.page_index
    }

    pub(crate) fn validate(&self) -> PdfDancerResult<()> {
        if self.internal_id.trim().is_empty() {
            return Err(PdfDancerError::validation(
                "Object reference internal id cannot be empty",
            ));
        }
        Ok(())
    }
}

impl AsRef<ObjectRef> for ObjectRef {
    fn as_ref(&self) -> &ObjectRef {
        self
    }
}

impl Serialize for ObjectRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ObjectRef", 3)?;
        state.serialize_field("internalId", &self.internal_id)?;
        state.serialize_field("position", &self.position)?;
        state.serialize_field("type", &self.object_type.wire_name())?;
        state.end()
    }
}

/// RGBA color, 0-255 per component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    #[serde(rename = "red")]
    pub r: u8,
    #[serde(rename = "green")]
    pub g: u8,
    #[serde(rename = "blue")]
    pub b: u8,
    #[serde(rename = "alpha")]
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Font classification reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FontType {
    System,
    Standard,
    Embedded,
    Unknown,
}

/// Font suggested by the server, with a similarity score
#[derive(Debug, Clone, PartialEq)]
pub struct FontRecommendation {
    pub font_name: String,
    pub font_type: FontType,
    pub similarity_score: f64,
}

/// Status of a text object
#[derive(Debug, Clone, PartialEq)]
pub struct TextStatus {
    pub modified: bool,
    pub encodable: bool,
    pub font_type: FontType,
    pub font_recommendation: Option<FontRecommendation>,
}

/// Paragraph or text line, with its constituent lines as children
#[derive(Debug, Clone, PartialEq)]
pub struct TextObjectRef {
    pub object_ref: ObjectRef,
    pub text: Option<String>,
    pub font_name: Option<String>,
    pub font_size: Option<f64>,
    /// Only present for multi-line paragraphs
    pub line_spacings: Option<Vec<f64>>,
    pub color: Option<Color>,
    pub status: Option<TextStatus>,
    pub children: Vec<TextObjectRef>,
}

impl TextObjectRef {
    pub fn new(object_ref: ObjectRef) -> Self {
        Self {
            object_ref,
            text: None,
            font_name: None,
            font_size: None,
            line_spacings: None,
            color: None,
            status: None,
            children: Vec::new(),
        }
    }

    pub fn internal_id(&self) -> &str {
        &self.object_ref.internal_id
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_ref.object_type
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl AsRef<ObjectRef> for TextObjectRef {
    fn as_ref(&self) -> &ObjectRef {
        &self.object_ref
    }
}

/// Interactive form field with its name and current value
#[derive(Debug, Clone, PartialEq)]
pub struct FormFieldRef {
    pub object_ref: ObjectRef,
    pub name: Option<String>,
    /// None for unset fields
    pub value: Option<String>,
}

impl FormFieldRef {
    pub fn internal_id(&self) -> &str {
        &self.object_ref.internal_id
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_ref.object_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl AsRef<ObjectRef> for FormFieldRef {
    fn as_ref(&self) -> &ObjectRef {
        &self.object_ref
    }
}

/// Page orientation. Unrecognized server values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
    Other(String),
}

impl Orientation {
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_uppercase();
        match normalized.as_str() {
            "PORTRAIT" => Orientation::Portrait,
            "LANDSCAPE" => Orientation::Landscape,
            _ => Orientation::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Orientation::Portrait => "PORTRAIT",
            Orientation::Landscape => "LANDSCAPE",
            Orientation::Other(value) => value,
        }
    }
}

impl Serialize for Orientation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

const STANDARD_PAGE_SIZES: &[(&str, f64, f64)] = &[
    ("A3", 842.0, 1191.0),
    ("A4", 595.0, 842.0),
    ("A5", 420.0, 595.0),
    ("LEGAL", 612.0, 1008.0),
    ("LETTER", 612.0, 792.0),
    ("TABLOID", 792.0, 1224.0),
];

/// Page dimensions in points, optionally carrying a standard name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSize {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// Look up a standard size by name (case-insensitive)
    pub fn standard(name: &str) -> PdfDancerResult<Self> {
        let normalized = name.trim().to_uppercase();
        STANDARD_PAGE_SIZES
            .iter()
            .find(|(known, _, _)| *known == normalized)
            .map(|(known, width, height)| Self {
                name: Some(known.to_string()),
                width: *width,
                height: *height,
            })
            .ok_or_else(|| PdfDancerError::validation(format!("Unknown page size name: {}", name)))
    }

    pub fn custom(width: f64, height: f64) -> PdfDancerResult<Self> {
        Self::named(None, width, height)
    }

    pub(crate) fn named(name: Option<&str>, width: f64, height: f64) -> PdfDancerResult<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(PdfDancerError::validation(
                "Page width and height must be positive values",
            ));
        }
        let name = name
            .map(|n| n.trim().to_uppercase())
            .filter(|n| !n.is_empty());
        Ok(Self {
            name,
            width,
            height,
        })
    }

    pub fn standard_names() -> Vec<&'static str> {
        STANDARD_PAGE_SIZES.iter().map(|(name, _, _)| *name).collect()
    }
}

/// Page reference with size and orientation metadata
#[derive(Debug, Clone, PartialEq)]
pub struct PageRef {
    pub object_ref: ObjectRef,
    pub page_size: Option<PageSize>,
    pub orientation: Option<Orientation>,
}

impl PageRef {
    pub fn page_index(&self) -> Option<usize> {
        self.object_ref.page_index()
    }

    pub fn internal_id(&self) -> &str {
        &self.object_ref.internal_id
    }
}

impl AsRef<ObjectRef> for PageRef {
    fn as_ref(&self) -> &ObjectRef {
        &self.object_ref
    }
}
