//! Document-wide selectors, typed views over [`PdfDancer::find`].

use crate::client::{PageClient, PdfDancer};
use crate::error::{PdfDancerError, PdfDancerResult};
use crate::models::{FormFieldRef, ObjectRef, ObjectType, PageRef, Position, SnapshotElement, TextObjectRef};
use crate::query::DEFAULT_TOLERANCE;
use crate::transport::Transport;

/// Types gathered by `select_elements`, in output order
const ELEMENT_TYPES: [ObjectType; 6] = [
    ObjectType::Paragraph,
    ObjectType::TextLine,
    ObjectType::Image,
    ObjectType::Path,
    ObjectType::FormXObject,
    ObjectType::FormField,
];

impl<T: Transport> PdfDancer<T> {
    pub(super) async fn find_text(
        &mut self,
        object_type: ObjectType,
        position: Option<&Position>,
        tolerance: f64,
    ) -> PdfDancerResult<Vec<TextObjectRef>> {
        let found = self.find_with_tolerance(object_type, position, tolerance).await?;
        Ok(found.into_iter().filter_map(SnapshotElement::into_text).collect())
    }

    pub(super) async fn find_objects(
        &mut self,
        object_type: ObjectType,
        position: Option<&Position>,
        tolerance: f64,
    ) -> PdfDancerResult<Vec<ObjectRef>> {
        let found = self.find_with_tolerance(object_type, position, tolerance).await?;
        Ok(found.into_iter().map(SnapshotElement::into_object_ref).collect())
    }

    pub(super) async fn find_form_fields(
        &mut self,
        position: Option<&Position>,
        tolerance: f64,
    ) -> PdfDancerResult<Vec<FormFieldRef>> {
        let found = self
            .find_with_tolerance(ObjectType::FormField, position, tolerance)
            .await?;
        Ok(found
            .into_iter()
            .filter_map(SnapshotElement::into_form_field)
            .collect())
    }

    /// Every selectable element, grouped by type
    pub(super) async fn find_elements(
        &mut self,
        position: Option<&Position>,
    ) -> PdfDancerResult<Vec<SnapshotElement>> {
        let mut elements = Vec::new();
        for object_type in ELEMENT_TYPES {
            elements.extend(
                self.find_with_tolerance(object_type, position, DEFAULT_TOLERANCE)
                    .await?,
            );
        }
        Ok(elements)
    }

    pub async fn select_paragraphs(&mut self) -> PdfDancerResult<Vec<TextObjectRef>> {
        self.find_text(ObjectType::Paragraph, None, DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_text_lines(&mut self) -> PdfDancerResult<Vec<TextObjectRef>> {
        self.find_text(ObjectType::TextLine, None, DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_images(&mut self) -> PdfDancerResult<Vec<ObjectRef>> {
        self.find_objects(ObjectType::Image, None, DEFAULT_TOLERANCE)
            .await
    }

    /// Form XObjects, not form fields
    pub async fn select_forms(&mut self) -> PdfDancerResult<Vec<ObjectRef>> {
        self.find_objects(ObjectType::FormXObject, None, DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_form_fields(&mut self) -> PdfDancerResult<Vec<FormFieldRef>> {
        self.find_form_fields(None, DEFAULT_TOLERANCE).await
    }

    pub async fn select_form_fields_by_name(&mut self, name: &str) -> PdfDancerResult<Vec<FormFieldRef>> {
        let position = Position::by_name(name);
        self.find_form_fields(Some(&position), DEFAULT_TOLERANCE)
            .await
    }

    pub async fn select_paths(&mut self) -> PdfDancerResult<Vec<ObjectRef>> {
        self.find_objects(ObjectType::Path, None, DEFAULT_TOLERANCE)
            .await
    }

    /// Paragraphs, text lines, images, paths, form XObjects and form fields
    pub async fn select_elements(&mut self) -> PdfDancerResult<Vec<SnapshotElement>> {
        self.find_elements(None).await
    }

    /// References to every page, from the cached document snapshot
    pub async fn pages(&mut self) -> PdfDancerResult<Vec<PageRef>> {
        let document = self.get_or_fetch_document().await?;
        Ok(document
            .pages
            .iter()
            .map(|page| page.page_ref.clone())
            .collect())
    }

    /// Scope queries to one page
    pub async fn page(&mut self, page_index: usize) -> PdfDancerResult<PageClient<'_, T>> {
        let snapshot = self.get_or_fetch_page(page_index).await?;
        let page_ref = snapshot.page_ref.clone();
        Ok(PageClient::new(self, page_ref, page_index))
    }

    /// Scope queries to a page already in hand, e.g. one from [`PdfDancer::pages`].
    /// The reference must carry a page index.
    pub fn on_page(&mut self, page_ref: PageRef) -> PdfDancerResult<PageClient<'_, T>> {
        let page_index = page_ref
            .page_index()
            .ok_or_else(|| PdfDancerError::validation("page reference has no page index"))?;
        Ok(PageClient::new(self, page_ref, page_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTransport;
    use reqwest::Method;
    use serde_json::json;

    fn document_json() -> serde_json::Value {
        json!({
            "pageCount": 2,
            "pages": [
                {
                    "pageRef": {"internalId": "PAGE-0", "position": {"pageIndex": 0}, "type": "PAGE"},
                    "elements": [
                        {"type": "PARAGRAPH", "internalId": "P-1", "text": "Invoice"},
                        {"type": "IMAGE", "internalId": "IMG-1"},
                        {"type": "CHECKBOX", "internalId": "F-1", "name": "agree", "value": "Off"}
                    ]
                },
                {
                    "pageRef": {"internalId": "PAGE-1", "position": {"pageIndex": 1}, "type": "PAGE",
                                "orientation": "LANDSCAPE"},
                    "elements": [
                        {"type": "TEXT_LINE", "internalId": "L-1", "text": "Total"},
                        {"type": "FORM_X_OBJECT", "internalId": "X-1"},
                        {"type": "TEXT_FIELD", "internalId": "F-2", "name": "agree"}
                    ]
                }
            ]
        })
    }

    fn session() -> PdfDancer<FakeTransport> {
        let transport = FakeTransport::new();
        transport.respond_json(Method::GET, "/pdf/document/snapshot", document_json());
        PdfDancer::with_transport(transport)
    }

    #[test]
    fn test_typed_selectors_share_one_fetch() {
        let mut client = session();

        let paragraphs = tokio_test::block_on(client.select_paragraphs()).unwrap();
        assert_eq!(paragraphs[0].text(), Some("Invoice"));
        let lines = tokio_test::block_on(client.select_text_lines()).unwrap();
        assert_eq!(lines[0].internal_id(), "L-1");
        let forms = tokio_test::block_on(client.select_forms()).unwrap();
        assert_eq!(forms[0].internal_id, "X-1");

        let fields = tokio_test::block_on(client.select_form_fields_by_name("agree")).unwrap();
        let ids: Vec<&str> = fields.iter().map(|f| f.internal_id()).collect();
        assert_eq!(ids, vec!["F-1", "F-2"]);

        assert_eq!(client.transport().requests().len(), 1);
    }

    #[test]
    fn test_select_elements_groups_by_type() {
        let mut client = session();
        let elements = tokio_test::block_on(client.select_elements()).unwrap();
        let ids: Vec<&str> = elements.iter().map(|e| e.internal_id()).collect();
        assert_eq!(ids, vec!["P-1", "L-1", "IMG-1", "X-1", "F-1", "F-2"]);
    }

    #[test]
    fn test_pages_and_page_scope() {
        let mut client = session();
        let pages = tokio_test::block_on(client.pages()).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].internal_id(), "PAGE-1");

        let page = tokio_test::block_on(client.page(1)).unwrap();
        assert_eq!(page.page_index(), 1);
        assert_eq!(page.info().internal_id(), "PAGE-1");
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[test]
    fn test_on_page_uses_ref_index() {
        let mut client = session();
        let pages = tokio_test::block_on(client.pages()).unwrap();

        let page = client.on_page(pages[1].clone()).unwrap();
        assert_eq!(page.page_index(), 1);
        assert_eq!(page.info().internal_id(), "PAGE-1");
    }

    #[test]
    fn test_on_page_rejects_ref_without_index() {
        let mut client = session();
        let mut page_ref = tokio_test::block_on(client.pages()).unwrap().remove(1);
        page_ref.object_ref.position = Position::default();

        let result = client.on_page(page_ref);
        assert!(matches!(result, Err(PdfDancerError::Validation { .. })));
    }
}
