//! JSON snapshot payloads to typed snapshot entities.
//!
//! Top-level payloads must be well formed; a malformed page or document is a
//! hard failure. Individual elements are parsed leniently: an element whose
//! type is unknown is logged and dropped so the rest of the page stays usable.
//! Missing ids default to empty.

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::error::{PdfDancerError, PdfDancerResult};
use crate::models::{
    BoundingRect, Color, DocumentSnapshot, FontRecommendation, FontType, FormFieldRef, ObjectRef,
    ObjectType, Orientation, PageRef, PageSize, PageSnapshot, Position, PositionMode, ShapeType,
    SnapshotElement, TextObjectRef, TextStatus,
};

/// Paragraphs nest lines and nothing deeper; anything past this is a bad payload
const MAX_TEXT_DEPTH: usize = 8;

type JsonObject = Map<String, Value>;

/// Why a single element was dropped
#[derive(Error, Debug, PartialEq)]
enum ElementError {
    #[error("element is not a JSON object")]
    NotAnObject,

    #[error("element has no type")]
    MissingType,

    #[error("unknown element type {0:?}")]
    UnknownType(String),
}

type ElementParser = fn(&JsonObject, ObjectType) -> Result<SnapshotElement, ElementError>;

/// Parser per element type. Types not listed use [`parse_generic`].
const ELEMENT_PARSERS: &[(ObjectType, ElementParser)] = &[
    (ObjectType::Paragraph, parse_text_element as ElementParser),
    (ObjectType::TextLine, parse_text_element as ElementParser),
    (ObjectType::FormField, parse_form_field as ElementParser),
    (ObjectType::TextField, parse_form_field as ElementParser),
    (ObjectType::CheckBox, parse_form_field as ElementParser),
    (ObjectType::RadioButton, parse_form_field as ElementParser),
];

fn parser_for(object_type: ObjectType) -> ElementParser {
    ELEMENT_PARSERS
        .iter()
        .find(|(known, _)| *known == object_type)
        .map(|(_, parser)| *parser)
        .unwrap_or(parse_generic)
}

/// Parse a `GET /pdf/document/snapshot` body
pub fn parse_document_snapshot(value: &Value) -> PdfDancerResult<DocumentSnapshot> {
    let object = value
        .as_object()
        .ok_or_else(|| PdfDancerError::malformed("document snapshot is not a JSON object"))?;
    let pages_json = object
        .get("pages")
        .and_then(Value::as_array)
        .ok_or_else(|| PdfDancerError::malformed("document snapshot has no pages array"))?;

    let pages = pages_json
        .iter()
        .map(|page| parse_page_snapshot(page).map(Arc::new))
        .collect::<PdfDancerResult<Vec<_>>>()?;

    let fonts = object
        .get("fonts")
        .and_then(Value::as_array)
        .map(|fonts| {
            fonts
                .iter()
                .filter_map(Value::as_object)
                .map(parse_font_recommendation)
                .collect()
        })
        .unwrap_or_default();

    let page_count = object
        .get("pageCount")
        .and_then(Value::as_u64)
        .map(|count| count as usize)
        .unwrap_or(pages.len());

    Ok(DocumentSnapshot {
        page_count,
        fonts,
        pages,
    })
}

/// Parse a `GET /pdf/page/{index}/snapshot` body
pub fn parse_page_snapshot(value: &Value) -> PdfDancerResult<PageSnapshot> {
    let object = value
        .as_object()
        .ok_or_else(|| PdfDancerError::malformed("page snapshot is not a JSON object"))?;
    let page_ref = object
        .get("pageRef")
        .and_then(Value::as_object)
        .map(parse_page_ref)
        .ok_or_else(|| PdfDancerError::malformed("page snapshot has no pageRef"))?;

    let elements = match object.get("elements") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(elements)) => parse_elements(elements, page_ref.page_index()),
        Some(_) => {
            return Err(PdfDancerError::malformed(
                "page snapshot elements is not an array",
            ));
        }
    };

    Ok(PageSnapshot { page_ref, elements })
}

/// Parse a bare page reference, as returned by `POST /pdf/page/add`
pub fn parse_page_ref_value(value: &Value) -> PdfDancerResult<PageRef> {
    value
        .as_object()
        .map(parse_page_ref)
        .ok_or_else(|| PdfDancerError::malformed("page reference is not a JSON object"))
}

/// Parse a list of elements, dropping the ones that cannot be parsed
pub fn parse_elements(values: &[Value], page_index: Option<usize>) -> Vec<SnapshotElement> {
    values
        .iter()
        .enumerate()
        .filter_map(|(position, value)| match parse_element(value) {
            Ok(element) => Some(element),
            Err(e) => {
                warn!(
                    page = ?page_index,
                    element = position,
                    error = %e,
                    "Dropping unparseable snapshot element"
                );
                None
            }
        })
        .collect()
}

fn parse_element(value: &Value) -> Result<SnapshotElement, ElementError> {
    let object = value.as_object().ok_or(ElementError::NotAnObject)?;
    let object_type = element_type(object)?;
    parser_for(object_type)(object, object_type)
}

fn element_type(object: &JsonObject) -> Result<ObjectType, ElementError> {
    let raw = object
        .get("type")
        .and_then(Value::as_str)
        .filter(|raw| !raw.is_empty())
        .ok_or(ElementError::MissingType)?;
    ObjectType::from_wire(raw).ok_or_else(|| ElementError::UnknownType(raw.to_string()))
}

/// Server id, empty when the element has none
fn internal_id(object: &JsonObject) -> String {
    string_field(object, "internalId").unwrap_or_default()
}

fn parse_generic(object: &JsonObject, object_type: ObjectType) -> Result<SnapshotElement, ElementError> {
    Ok(SnapshotElement::Object(ObjectRef::new(
        internal_id(object),
        position_of(object),
        object_type,
    )))
}

fn parse_form_field(object: &JsonObject, object_type: ObjectType) -> Result<SnapshotElement, ElementError> {
    let object_ref = ObjectRef::new(internal_id(object), position_of(object), object_type);
    let value = match object.get("value") {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value.clone()),
        Some(other) => Some(other.to_string()),
    };

    Ok(SnapshotElement::FormField(FormFieldRef {
        object_ref,
        name: string_field(object, "name"),
        value,
    }))
}

fn parse_text_element(object: &JsonObject, object_type: ObjectType) -> Result<SnapshotElement, ElementError> {
    Ok(SnapshotElement::Text(parse_text_ref(
        object,
        object_type,
        internal_id(object),
        0,
    )))
}

/// Build a text ref and its children. Children without an id get
/// `"{parent-id}-{index}"` (or `"child-{index}"` under an anonymous parent).
fn parse_text_ref(object: &JsonObject, object_type: ObjectType, internal_id: String, depth: usize) -> TextObjectRef {
    let mut text = TextObjectRef::new(ObjectRef::new(
        internal_id,
        position_of(object),
        object_type,
    ));
    text.text = string_field(object, "text");
    text.font_name = string_field(object, "fontName");
    text.font_size = object.get("fontSize").and_then(Value::as_f64);
    text.line_spacings = object
        .get("lineSpacings")
        .and_then(Value::as_array)
        .map(|spacings| spacings.iter().filter_map(Value::as_f64).collect());
    text.color = object.get("color").and_then(Value::as_object).and_then(parse_color);
    text.status = object
        .get("status")
        .and_then(Value::as_object)
        .map(parse_text_status);

    let Some(children) = object.get("children").and_then(Value::as_array) else {
        return text;
    };
    if depth + 1 >= MAX_TEXT_DEPTH {
        warn!(
            internal_id = %text.object_ref.internal_id,
            depth,
            "Text hierarchy nested too deeply, ignoring children"
        );
        return text;
    }

    let parent_id = if text.object_ref.internal_id.is_empty() {
        "child".to_string()
    } else {
        text.object_ref.internal_id.clone()
    };
    text.children = children
        .iter()
        .enumerate()
        .filter_map(|(index, child)| {
            let Some(child) = child.as_object() else {
                warn!(parent = %parent_id, index, "Dropping text child that is not an object");
                return None;
            };
            let child_type = match child.get("type").and_then(Value::as_str) {
                None => ObjectType::TextLine,
                Some(raw) => match ObjectType::from_wire(raw) {
                    Some(child_type) => child_type,
                    None => {
                        warn!(parent = %parent_id, index, child_type = raw, "Dropping text child of unknown type");
                        return None;
                    }
                },
            };
            let child_id = child
                .get("internalId")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}-{}", parent_id, index));
            Some(parse_text_ref(child, child_type, child_id, depth + 1))
        })
        .collect();
    text
}

fn parse_page_ref(object: &JsonObject) -> PageRef {
    let internal_id = object
        .get("internalId")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let page_size = object.get("pageSize").and_then(Value::as_object).and_then(|size| {
        let width = size.get("width").and_then(Value::as_f64)?;
        let height = size.get("height").and_then(Value::as_f64)?;
        let name = size.get("name").and_then(Value::as_str);
        PageSize::named(name, width, height).ok()
    });

    PageRef {
        object_ref: ObjectRef::new(internal_id, position_of(object), ObjectType::Page),
        page_size,
        orientation: object
            .get("orientation")
            .and_then(Value::as_str)
            .map(Orientation::parse),
    }
}

/// Parse a font recommendation. Missing `fontType` means SYSTEM.
fn parse_font_recommendation(object: &JsonObject) -> FontRecommendation {
    FontRecommendation {
        font_name: string_field(object, "fontName").unwrap_or_default(),
        font_type: font_type_field(object, FontType::System),
        similarity_score: object
            .get("similarityScore")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
    }
}

fn parse_text_status(object: &JsonObject) -> TextStatus {
    TextStatus {
        modified: object.get("modified").and_then(Value::as_bool).unwrap_or(false),
        encodable: object.get("encodable").and_then(Value::as_bool).unwrap_or(true),
        font_type: font_type_field(object, FontType::Unknown),
        font_recommendation: object
            .get("fontRecommendation")
            .and_then(Value::as_object)
            .map(parse_font_recommendation),
    }
}

fn font_type_field(object: &JsonObject, default: FontType) -> FontType {
    match object.get("fontType").and_then(Value::as_str) {
        None => default,
        Some(raw) => raw.parse().unwrap_or(FontType::Unknown),
    }
}

/// Color from integral red/green/blue; alpha defaults to opaque
fn parse_color(object: &JsonObject) -> Option<Color> {
    let component = |key: &str| -> Option<u8> {
        object
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|value| u8::try_from(value).ok())
    };
    let alpha = match object.get("alpha") {
        None | Some(Value::Null) => 255,
        Some(_) => component("alpha")?,
    };
    Some(Color::rgba(
        component("red")?,
        component("green")?,
        component("blue")?,
        alpha,
    ))
}

fn position_of(object: &JsonObject) -> Position {
    object
        .get("position")
        .and_then(Value::as_object)
        .map(parse_position)
        .unwrap_or_default()
}

/// Absent keys stay absent. A bounding rect missing any of its four
/// numbers is discarded without affecting the rest of the position.
fn parse_position(object: &JsonObject) -> Position {
    Position {
        page_index: object
            .get("pageIndex")
            .and_then(Value::as_u64)
            .map(|index| index as usize),
        shape: object
            .get("shape")
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse::<ShapeType>().ok()),
        mode: object
            .get("mode")
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse::<PositionMode>().ok()),
        bounding_rect: object
            .get("boundingRect")
            .and_then(Value::as_object)
            .and_then(parse_bounding_rect),
        text_starts_with: string_field(object, "textStartsWith"),
        text_pattern: string_field(object, "textPattern"),
        name: string_field(object, "name"),
    }
}

fn parse_bounding_rect(object: &JsonObject) -> Option<BoundingRect> {
    let number = |key: &str| object.get(key).and_then(Value::as_f64);
    Some(BoundingRect::new(
        number("x")?,
        number("y")?,
        number("width")?,
        number("height")?,
    ))
}

fn string_field(object: &JsonObject, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}
