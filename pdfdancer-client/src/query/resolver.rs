//! Decides where a query is answered and runs it.

use serde_json::Value;
use tracing::debug;

use super::filter::ElementFilter;
use crate::error::PdfDancerResult;
use crate::models::requests::FindRequest;
use crate::models::{ObjectType, Position, SnapshotElement};
use crate::snapshot::{SnapshotCache, SnapshotFetcher, parser};
use crate::transport::{ApiRequest, Transport};

/// Where a query is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// `POST /pdf/find`. Snapshots carry no path geometry, so spatial path
    /// queries cannot be answered from cache.
    Network,
    /// Cached snapshot of a single page
    Page(usize),
    /// Cached document snapshot, all pages in order
    Document,
}

pub fn plan(object_type: ObjectType, position: Option<&Position>) -> Resolution {
    match position {
        Some(position) if object_type == ObjectType::Path && position.bounding_rect.is_some() => {
            Resolution::Network
        }
        Some(Position {
            page_index: Some(page_index),
            ..
        }) => Resolution::Page(*page_index),
        _ => Resolution::Document,
    }
}

/// Answer `object_type` + `position` from the cache, or the network when required
pub async fn resolve<T: Transport>(
    transport: &T,
    cache: &mut SnapshotCache,
    object_type: ObjectType,
    position: Option<&Position>,
    tolerance: f64,
) -> PdfDancerResult<Vec<SnapshotElement>> {
    let resolution = plan(object_type, position);
    debug!(object_type = %object_type, ?resolution, "Resolving query");

    // Compile predicates before touching the cache so bad input fails without I/O
    let filter = ElementFilter::new(object_type, position, tolerance)?;
    let fetcher = SnapshotFetcher::new(transport);
    match resolution {
        Resolution::Network => find_remote(transport, object_type, position).await,
        Resolution::Page(page_index) => {
            let page = cache.get_or_fetch_page(&fetcher, page_index).await?;
            Ok(filter.apply(&page.elements))
        }
        Resolution::Document => {
            let document = cache.get_or_fetch_document(&fetcher).await?;
            Ok(filter.apply(document.elements()))
        }
    }
}

async fn find_remote<T: Transport>(
    transport: &T,
    object_type: ObjectType,
    position: Option<&Position>,
) -> PdfDancerResult<Vec<SnapshotElement>> {
    let request = ApiRequest::post("/pdf/find").json(&FindRequest {
        object_type: Some(object_type),
        position,
        hint: None,
    })?;
    let body: Vec<Value> = transport.send(request).await?.json("POST /pdf/find")?;
    Ok(parser::parse_elements(
        &body,
        position.and_then(|p| p.page_index),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfDancerError;
    use crate::models::BoundingRect;
    use crate::query::filter::DEFAULT_TOLERANCE;
    use crate::testing::FakeTransport;
    use reqwest::Method;
    use serde_json::json;

    fn page_json(index: usize, elements: Value) -> Value {
        json!({"pageRef": {"position": {"pageIndex": index}, "type": "PAGE"}, "elements": elements})
    }

    fn document_json() -> Value {
        json!({
            "pageCount": 2,
            "pages": [
                page_json(0, json!([
                    {"type": "PARAGRAPH", "internalId": "p0", "text": "Hello"},
                    {"type": "PATH", "internalId": "path0"}
                ])),
                page_json(1, json!([
                    {"type": "PARAGRAPH", "internalId": "p1", "text": "Hello again"}
                ]))
            ]
        })
    }

    #[test]
    fn test_plan() {
        let point = Position::at_page_coordinates(0, 1.0, 1.0);
        assert_eq!(plan(ObjectType::Path, Some(&point)), Resolution::Network);
        assert_eq!(plan(ObjectType::Image, Some(&point)), Resolution::Page(0));
        assert_eq!(plan(ObjectType::Path, Some(&Position::at_page(3))), Resolution::Page(3));
        assert_eq!(plan(ObjectType::Paragraph, None), Resolution::Document);

        let anywhere = Position::default().with_bounding_rect(BoundingRect::point(1.0, 1.0));
        assert_eq!(plan(ObjectType::Path, Some(&anywhere)), Resolution::Network);
        assert_eq!(plan(ObjectType::Image, Some(&anywhere)), Resolution::Document);
    }

    #[test]
    fn test_repeated_page_query_fetches_once() {
        let transport = FakeTransport::new();
        transport.respond_json(
            Method::GET,
            "/pdf/page/0/snapshot",
            page_json(0, json!([{"type": "PARAGRAPH", "internalId": "p0", "text": "Hi"}])),
        );
        let mut cache = SnapshotCache::new();
        let position = Position::at_page(0);

        for _ in 0..2 {
            let found = tokio_test::block_on(resolve(
                &transport,
                &mut cache,
                ObjectType::Paragraph,
                Some(&position),
                DEFAULT_TOLERANCE,
            ))
            .unwrap();
            assert_eq!(found.len(), 1);
        }
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_document_query_keeps_page_order() {
        let transport = FakeTransport::new();
        transport.respond_json(Method::GET, "/pdf/document/snapshot", document_json());
        let mut cache = SnapshotCache::new();

        let found = tokio_test::block_on(resolve(
            &transport,
            &mut cache,
            ObjectType::Paragraph,
            Some(&Position::default().with_text_starts("hello")),
            DEFAULT_TOLERANCE,
        ))
        .unwrap();
        let ids: Vec<&str> = found.iter().map(|e| e.internal_id()).collect();
        assert_eq!(ids, vec!["p0", "p1"]);

        // Page queries are now served from the cached document
        tokio_test::block_on(resolve(
            &transport,
            &mut cache,
            ObjectType::Path,
            Some(&Position::at_page(0)),
            DEFAULT_TOLERANCE,
        ))
        .unwrap();
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_spatial_path_query_bypasses_cache() {
        let transport = FakeTransport::new();
        transport.respond_json(
            Method::POST,
            "/pdf/find",
            json!([{"type": "PATH", "internalId": "path-9", "position": {"pageIndex": 0}}]),
        );
        let mut cache = SnapshotCache::new();
        let position = Position::at_page_coordinates(0, 80.0, 720.0);

        let found = tokio_test::block_on(resolve(
            &transport,
            &mut cache,
            ObjectType::Path,
            Some(&position),
            DEFAULT_TOLERANCE,
        ))
        .unwrap();

        assert_eq!(found[0].internal_id(), "path-9");
        assert_eq!(transport.count(Method::POST, "/pdf/find"), 1);
        assert_eq!(transport.requests().len(), 1);
        assert!(cache.is_empty());

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["objectType"], "PATH");
        assert_eq!(body["position"]["boundingRect"]["x"], 80.0);
    }

    #[test]
    fn test_invalid_pattern_fails_before_fetch() {
        let transport = FakeTransport::new();
        let mut cache = SnapshotCache::new();
        let position = Position::at_page(0).with_text_pattern("[");

        let result = tokio_test::block_on(resolve(
            &transport,
            &mut cache,
            ObjectType::Paragraph,
            Some(&position),
            DEFAULT_TOLERANCE,
        ));
        assert!(matches!(result, Err(PdfDancerError::Validation { .. })));
        assert!(transport.requests().is_empty());
    }
}
