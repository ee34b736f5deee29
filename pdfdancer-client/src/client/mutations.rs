//! Mutations. Each one validates its input, sends one request, and
//! invalidates the snapshot cache only when the server reports success.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::PdfDancer;
use crate::error::{PdfDancerError, PdfDancerResult};
use crate::models::requests::{
    AddRequest, ChangeFormFieldRequest, DeleteRequest, ModifyRequest, ModifyTextRequest,
    MoveRequest, PageMoveRequest,
};
use crate::models::{
    AddPageRequest, CommandResult, ObjectRef, ObjectType, PageRef, ParagraphEdit, PdfObject,
    Position,
};
use crate::snapshot::parser;
use crate::transport::{ApiRequest, Transport};

impl<T: Transport> PdfDancer<T> {
    /// Send `request`, decode the reply and invalidate if `applied` says the
    /// server changed the document
    async fn mutate<R, F>(&mut self, request: ApiRequest, applied: F) -> PdfDancerResult<R>
    where
        R: DeserializeOwned,
        F: FnOnce(&R) -> bool,
    {
        let label = request.label();
        let result: R = self.transport.send(request).await?.json(&label)?;
        if applied(&result) {
            self.cache.invalidate();
        } else {
            debug!(request = %label, "Mutation declined by server, cache kept");
        }
        Ok(result)
    }

    /// Delete an object. `false` means the server declined.
    pub async fn delete(&mut self, object: impl AsRef<ObjectRef>) -> PdfDancerResult<bool> {
        let object_ref = object.as_ref();
        object_ref.validate()?;
        let request = ApiRequest::delete("/pdf/delete").json(&DeleteRequest { object_ref })?;
        self.mutate(request, |deleted: &bool| *deleted).await
    }

    pub async fn delete_page(&mut self, page: impl AsRef<ObjectRef>) -> PdfDancerResult<bool> {
        let page_ref = page.as_ref();
        page_ref.validate()?;
        if page_ref.object_type != ObjectType::Page {
            return Err(PdfDancerError::validation(format!(
                "Expected a page reference, got {}",
                page_ref.object_type
            )));
        }
        let request = ApiRequest::delete("/pdf/page/delete").json(page_ref)?;
        self.mutate(request, |deleted: &bool| *deleted).await
    }

    /// Move an object to `position`, which must name a page
    pub async fn move_object(
        &mut self,
        object: impl AsRef<ObjectRef>,
        position: &Position,
    ) -> PdfDancerResult<bool> {
        let object_ref = object.as_ref();
        object_ref.validate()?;
        if position.page_index.is_none() {
            return Err(PdfDancerError::validation("Position page index is null"));
        }
        let request = ApiRequest::put("/pdf/move").json(&MoveRequest {
            object_ref,
            new_position: position,
        })?;
        self.mutate(request, |moved: &bool| *moved).await
    }

    pub async fn move_page(&mut self, from_page_index: usize, to_page_index: usize) -> PdfDancerResult<bool> {
        let request = ApiRequest::put("/pdf/page/move").json(&PageMoveRequest {
            from_page_index,
            to_page_index,
        })?;
        self.mutate(request, |moved: &bool| *moved).await
    }

    pub async fn add_object(&mut self, object: impl Into<PdfObject>) -> PdfDancerResult<bool> {
        let object = object.into();
        object.validate()?;
        let request = ApiRequest::post("/pdf/add").json(&AddRequest::new(&object))?;
        self.mutate(request, |added: &bool| *added).await
    }

    /// Change a paragraph. Plain text goes to the text endpoint and keeps the
    /// paragraph's styling; a [`Paragraph`](crate::models::Paragraph) replaces it.
    pub async fn modify_paragraph(
        &mut self,
        paragraph: impl AsRef<ObjectRef>,
        edit: impl Into<ParagraphEdit>,
    ) -> PdfDancerResult<CommandResult> {
        let object_ref = paragraph.as_ref();
        object_ref.validate()?;
        let request = match edit.into() {
            ParagraphEdit::Text(text) => {
                ApiRequest::put("/pdf/text/paragraph").json(&ModifyTextRequest {
                    object_ref,
                    new_text_line: &text,
                })?
            }
            ParagraphEdit::Replace(replacement) => {
                let replacement = PdfObject::Paragraph(replacement);
                ApiRequest::put("/pdf/modify").json(&ModifyRequest {
                    object_ref,
                    new_object: replacement.to_payload(),
                })?
            }
        };
        self.mutate(request, |result: &CommandResult| result.success)
            .await
    }

    pub async fn modify_text_line(
        &mut self,
        text_line: impl AsRef<ObjectRef>,
        text: &str,
    ) -> PdfDancerResult<CommandResult> {
        let object_ref = text_line.as_ref();
        object_ref.validate()?;
        let request = ApiRequest::put("/pdf/text/line").json(&ModifyTextRequest {
            object_ref,
            new_text_line: text,
        })?;
        self.mutate(request, |result: &CommandResult| result.success)
            .await
    }

    /// Set a form field's value
    pub async fn change_form_field(
        &mut self,
        field: impl AsRef<ObjectRef>,
        value: &str,
    ) -> PdfDancerResult<bool> {
        let object_ref = field.as_ref();
        object_ref.validate()?;
        if !object_ref.object_type.is_form_field() {
            return Err(PdfDancerError::validation(format!(
                "Expected a form field reference, got {}",
                object_ref.object_type
            )));
        }
        let request = ApiRequest::put("/pdf/modify/formField")
            .json(&ChangeFormFieldRequest { object_ref, value })?;
        self.mutate(request, |changed: &bool| *changed).await
    }

    /// Append (or insert, with a page index) a page and return its reference
    pub async fn add_page(&mut self, request: Option<AddPageRequest>) -> PdfDancerResult<PageRef> {
        let mut api_request = ApiRequest::post("/pdf/page/add");
        if let Some(request) = request.filter(|request| !request.is_empty()) {
            api_request = api_request.json(&request)?;
        }
        let label = api_request.label();
        let body: serde_json::Value = self.transport.send(api_request).await?.json(&label)?;
        let page_ref = parser::parse_page_ref_value(&body)?;
        self.cache.invalidate();
        Ok(page_ref)
    }
}
