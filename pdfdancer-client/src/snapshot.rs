//! Snapshot fetching, parsing and caching.

pub mod cache;
pub mod parser;

use std::future::Future;

use serde_json::Value;
use tracing::debug;

use crate::error::PdfDancerResult;
use crate::models::{DocumentSnapshot, ObjectType, PageSnapshot};
use crate::transport::{ApiRequest, Transport};

pub use cache::SnapshotCache;

/// Where the cache gets snapshots from on a miss
pub trait SnapshotSource: Sync {
    fn fetch_document(
        &self,
        types: &[ObjectType],
    ) -> impl Future<Output = PdfDancerResult<DocumentSnapshot>> + Send;

    fn fetch_page(
        &self,
        page_index: usize,
        types: &[ObjectType],
    ) -> impl Future<Output = PdfDancerResult<PageSnapshot>> + Send;
}

/// Fetches snapshots through a [`Transport`] and parses them
pub struct SnapshotFetcher<'a, T> {
    transport: &'a T,
}

impl<'a, T: Transport> SnapshotFetcher<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    async fn fetch_json(&self, path: String, types: &[ObjectType]) -> PdfDancerResult<Value> {
        let mut request = ApiRequest::get(path);
        if let Some(types) = types_param(types) {
            request = request.query("types", types);
        }
        let context = request.label();
        self.transport.send(request).await?.json(&context)
    }
}

impl<T: Transport> SnapshotSource for SnapshotFetcher<'_, T> {
    async fn fetch_document(&self, types: &[ObjectType]) -> PdfDancerResult<DocumentSnapshot> {
        let json = self
            .fetch_json("/pdf/document/snapshot".to_string(), types)
            .await?;
        let snapshot = parser::parse_document_snapshot(&json)?;
        debug!(pages = snapshot.page_count, "Fetched document snapshot");
        Ok(snapshot)
    }

    async fn fetch_page(&self, page_index: usize, types: &[ObjectType]) -> PdfDancerResult<PageSnapshot> {
        let json = self
            .fetch_json(format!("/pdf/page/{}/snapshot", page_index), types)
            .await?;
        let snapshot = parser::parse_page_snapshot(&json)?;
        debug!(
            page = page_index,
            elements = snapshot.elements.len(),
            "Fetched page snapshot"
        );
        Ok(snapshot)
    }
}

/// Comma-joined `types` query value, None when unfiltered
pub(crate) fn types_param(types: &[ObjectType]) -> Option<String> {
    if types.is_empty() {
        return None;
    }
    Some(
        types
            .iter()
            .map(ObjectType::to_string)
            .collect::<Vec<_>>()
            .join(","),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfDancerError;
    use crate::testing::FakeTransport;
    use reqwest::Method;
    use serde_json::json;

    #[test]
    fn test_types_param() {
        assert_eq!(types_param(&[]), None);
        assert_eq!(
            types_param(&[ObjectType::Paragraph, ObjectType::CheckBox]).as_deref(),
            Some("PARAGRAPH,CHECK_BOX")
        );
    }

    #[test]
    fn test_fetch_page_sends_types_filter() {
        let transport = FakeTransport::new();
        transport.respond_json(
            Method::GET,
            "/pdf/page/3/snapshot",
            json!({"pageRef": {"position": {"pageIndex": 3}}, "elements": []}),
        );

        let fetcher = SnapshotFetcher::new(&transport);
        let page = tokio_test::block_on(fetcher.fetch_page(3, &[ObjectType::Image])).unwrap();
        assert_eq!(page.page_index(), Some(3));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].query,
            vec![("types".to_string(), "IMAGE".to_string())]
        );
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        let transport = FakeTransport::new();
        transport.respond_json(Method::GET, "/pdf/document/snapshot", json!({"pageCount": 1}));

        let fetcher = SnapshotFetcher::new(&transport);
        let result = tokio_test::block_on(fetcher.fetch_document(&[]));
        assert!(matches!(result, Err(PdfDancerError::MalformedSnapshot { .. })));
    }
}
