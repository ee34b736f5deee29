//! Queries and page operations scoped to a single page.

use tracing::debug;

use crate::client::PdfDancer;
use crate::error::PdfDancerResult;
use crate::models::{
    FormFieldRef, ObjectRef, ObjectType, PageRef, Position, SnapshotElement, TextObjectRef,
};
use crate::query::DEFAULT_TOLERANCE;
use crate::transport::Transport;

/// One page of a session. Borrows the session mutably, so pages are visited
/// one at a time.
pub struct PageClient<'a, T: Transport> {
    client: &'a mut PdfDancer<T>,
    page_ref: PageRef,
    page_index: usize,
}

impl<'a, T: Transport> PageClient<'a, T> {
    pub(super) fn new(client: &'a mut PdfDancer<T>, mut page_ref: PageRef, page_index: usize) -> Self {
        if page_ref.object_ref.internal_id.is_empty() {
            page_ref.object_ref.internal_id = format!("PAGE-{}", page_index);
        }
        if page_ref.page_index().is_none() {
            page_ref.object_ref.position = Position::at_page(page_index);
        }
        Self {
            client,
            page_ref,
            page_index,
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Page reference with size and orientation, as of the last snapshot
    pub fn info(&self) -> &PageRef {
        &self.page_ref
    }

    fn whole_page(&self) -> Position {
        Position::at_page(self.page_index)
    }

    fn point(&self, x: f64, y: f64) -> Position {
        Position::at_page_coordinates(self.page_index, x, y)
    }

    pub async fn select_paragraphs(&mut self) -> PdfDancerResult<Vec<TextObjectRef>> {
        let position = self.whole_page();
        self.client
            .find_text(ObjectType::Paragraph, Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    /// Paragraphs whose text starts with `prefix`, ignoring case
    pub async fn select_paragraphs_starting_with(&mut self, prefix: &str) -> PdfDancerResult<Vec<TextObjectRef>> {
        let position = self.whole_page().with_text_starts(prefix);
        self.client
            .find_text(ObjectType::Paragraph, Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    /// Paragraphs containing a match for the regular expression `pattern`
    pub async fn select_paragraphs_matching(&mut self, pattern: &str) -> PdfDancerResult<Vec<TextObjectRef>> {
        let position = self.whole_page().with_text_pattern(pattern);
        self.client
            .find_text(ObjectType::Paragraph, Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_paragraphs_at(&mut self, x: f64, y: f64) -> PdfDancerResult<Vec<TextObjectRef>> {
        let position = self.point(x, y);
        self.client
            .find_text(ObjectType::Paragraph, Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_text_lines(&mut self) -> PdfDancerResult<Vec<TextObjectRef>> {
        let position = self.whole_page();
        self.client
            .find_text(ObjectType::TextLine, Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_text_lines_starting_with(&mut self, prefix: &str) -> PdfDancerResult<Vec<TextObjectRef>> {
        let position = self.whole_page().with_text_starts(prefix);
        self.client
            .find_text(ObjectType::TextLine, Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_text_lines_matching(&mut self, pattern: &str) -> PdfDancerResult<Vec<TextObjectRef>> {
        let position = self.whole_page().with_text_pattern(pattern);
        self.client
            .find_text(ObjectType::TextLine, Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_text_lines_at(&mut self, x: f64, y: f64) -> PdfDancerResult<Vec<TextObjectRef>> {
        let position = self.point(x, y);
        self.client
            .find_text(ObjectType::TextLine, Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_images(&mut self) -> PdfDancerResult<Vec<ObjectRef>> {
        let position = self.whole_page();
        self.client
            .find_objects(ObjectType::Image, Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_images_at(&mut self, x: f64, y: f64) -> PdfDancerResult<Vec<ObjectRef>> {
        let position = self.point(x, y);
        self.client
            .find_objects(ObjectType::Image, Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_forms(&mut self) -> PdfDancerResult<Vec<ObjectRef>> {
        let position = self.whole_page();
        self.client
            .find_objects(ObjectType::FormXObject, Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_forms_at(&mut self, x: f64, y: f64) -> PdfDancerResult<Vec<ObjectRef>> {
        let position = self.point(x, y);
        self.client
            .find_objects(ObjectType::FormXObject, Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_form_fields(&mut self) -> PdfDancerResult<Vec<FormFieldRef>> {
        let position = self.whole_page();
        self.client
            .find_form_fields(Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_form_fields_by_name(&mut self, name: &str) -> PdfDancerResult<Vec<FormFieldRef>> {
        let position = self.whole_page().with_name(name);
        self.client
            .find_form_fields(Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_form_fields_at(&mut self, x: f64, y: f64) -> PdfDancerResult<Vec<FormFieldRef>> {
        let position = self.point(x, y);
        self.client
            .find_form_fields(Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_paths(&mut self) -> PdfDancerResult<Vec<ObjectRef>> {
        let position = self.whole_page();
        self.client
            .find_objects(ObjectType::Path, Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    /// Paths under a point. Always asks the server.
    pub async fn select_paths_at(&mut self, x: f64, y: f64) -> PdfDancerResult<Vec<ObjectRef>> {
        let position = self.point(x, y);
        self.client
            .find_objects(ObjectType::Path, Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    /// Any `object_type` under a point, with an explicit tolerance
    pub async fn select_at(
        &mut self,
        object_type: ObjectType,
        x: f64,
        y: f64,
        tolerance: f64,
    ) -> PdfDancerResult<Vec<SnapshotElement>> {
        let position = self.point(x, y);
        self.client
            .find_with_tolerance(object_type, Some(&position), tolerance)
            .await
    }

    pub async fn select_elements(&mut self) -> PdfDancerResult<Vec<SnapshotElement>> {
        let position = self.whole_page();
        self.client.find_elements(Some(&position)).await
    }

    /// Delete this page from the document
    pub async fn delete(self) -> PdfDancerResult<bool> {
        self.client.delete_page(&self.page_ref).await
    }

    /// Move this page to `target_page_index`; on success this client follows it
    pub async fn move_to(&mut self, target_page_index: usize) -> PdfDancerResult<bool> {
        let moved = self
            .client
            .move_page(self.page_index, target_page_index)
            .await?;
        if moved {
            debug!(from = self.page_index, to = target_page_index, "Page moved");
            self.page_index = target_page_index;
            self.page_ref.object_ref.position = Position::at_page(target_page_index);
        }
        Ok(moved)
    }
}
