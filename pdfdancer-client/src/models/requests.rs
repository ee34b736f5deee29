//! Request payloads and command results exchanged with the server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::geometry::Position;
use super::objects::{Paragraph, PdfObject};
use super::refs::{ObjectRef, ObjectType, Orientation, PageSize};
use crate::error::{PdfDancerError, PdfDancerResult};

/// Body of `POST /pdf/find`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindRequest<'a> {
    pub object_type: Option<ObjectType>,
    pub position: Option<&'a Position>,
    pub hint: Option<&'a str>,
}

/// Body of `DELETE /pdf/delete`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest<'a> {
    pub object_ref: &'a ObjectRef,
}

/// Body of `PUT /pdf/move`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest<'a> {
    pub object_ref: &'a ObjectRef,
    pub new_position: &'a Position,
}

/// Body of `PUT /pdf/page/move`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMoveRequest {
    pub from_page_index: usize,
    pub to_page_index: usize,
}

/// Body of `POST /pdf/add`
#[derive(Debug, Serialize)]
pub struct AddRequest {
    pub object: Value,
}

impl AddRequest {
    pub fn new(object: &PdfObject) -> Self {
        Self {
            object: object.to_payload(),
        }
    }
}

/// Body of `PUT /pdf/modify`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyRequest<'a> {
    #[serde(rename = "ref")]
    pub object_ref: &'a ObjectRef,
    pub new_object: Value,
}

/// Body of `PUT /pdf/text/paragraph` and `PUT /pdf/text/line`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyTextRequest<'a> {
    #[serde(rename = "ref")]
    pub object_ref: &'a ObjectRef,
    pub new_text_line: &'a str,
}

/// Body of `PUT /pdf/modify/formField`
#[derive(Debug, Serialize)]
pub struct ChangeFormFieldRequest<'a> {
    #[serde(rename = "ref")]
    pub object_ref: &'a ObjectRef,
    pub value: &'a str,
}

/// How a paragraph is changed: new text only, or a full replacement
#[derive(Debug, Clone, PartialEq)]
pub enum ParagraphEdit {
    Text(String),
    Replace(Paragraph),
}

impl From<&str> for ParagraphEdit {
    fn from(text: &str) -> Self {
        ParagraphEdit::Text(text.to_string())
    }
}

impl From<String> for ParagraphEdit {
    fn from(text: String) -> Self {
        ParagraphEdit::Text(text)
    }
}

impl From<Paragraph> for ParagraphEdit {
    fn from(paragraph: Paragraph) -> Self {
        ParagraphEdit::Replace(paragraph)
    }
}

/// Options for `POST /session/new` and `POST /pdf/page/add`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocumentOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<PageSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    pub initial_page_count: usize,
}

impl Default for NewDocumentOptions {
    fn default() -> Self {
        Self {
            page_size: None,
            orientation: None,
            initial_page_count: 1,
        }
    }
}

impl NewDocumentOptions {
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn with_initial_page_count(mut self, count: usize) -> Self {
        self.initial_page_count = count;
        self
    }

    pub fn validate(&self) -> PdfDancerResult<()> {
        if self.initial_page_count < 1 {
            return Err(PdfDancerError::validation(format!(
                "Initial page count must be at least 1, got {}",
                self.initial_page_count
            )));
        }
        Ok(())
    }
}

/// Body of `POST /pdf/page/add`. All fields are optional; the server
/// appends a page of the document's default size when none are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<PageSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
}

impl AddPageRequest {
    pub fn at_index(mut self, page_index: usize) -> Self {
        self.page_index = Some(page_index);
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.page_index.is_none() && self.page_size.is_none() && self.orientation.is_none()
    }
}

/// Outcome of a modify command
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandResult {
    pub command_name: String,
    pub element_id: Option<String>,
    pub message: Option<String>,
    pub success: bool,
    pub warning: Option<String>,
}
