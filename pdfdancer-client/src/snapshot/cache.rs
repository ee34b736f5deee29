//! Two-level snapshot cache: one document snapshot plus per-page snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::SnapshotSource;
use crate::error::PdfDancerResult;
use crate::models::{DocumentSnapshot, PageSnapshot};

/// State of the document-level slot. `Invalidated` reads like `Vacant`
/// but records that a mutation cleared it.
#[derive(Debug, Clone, Default)]
enum CacheSlot {
    #[default]
    Vacant,
    Cached(Arc<DocumentSnapshot>),
    Invalidated,
}

/// Snapshot cache scoped to one session.
///
/// Only the cache itself (on fetch) and [`SnapshotCache::invalidate`] write
/// the slots. Snapshots are shared behind `Arc`, so a page extracted from the
/// cached document is the very allocation the document holds.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    document: CacheSlot,
    pages: HashMap<usize, Arc<PageSnapshot>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached document snapshot, without fetching
    pub fn document(&self) -> Option<&Arc<DocumentSnapshot>> {
        match &self.document {
            CacheSlot::Cached(document) => Some(document),
            CacheSlot::Vacant | CacheSlot::Invalidated => None,
        }
    }

    /// Cached page snapshot, without fetching
    pub fn page(&self, page_index: usize) -> Option<&Arc<PageSnapshot>> {
        self.pages.get(&page_index)
    }

    pub fn is_empty(&self) -> bool {
        self.document().is_none() && self.pages.is_empty()
    }

    /// Return the cached document, fetching it on a miss.
    ///
    /// A fresh fetch also fills page slots that are still empty; pages that
    /// are already cached are kept.
    pub async fn get_or_fetch_document<S: SnapshotSource>(
        &mut self,
        source: &S,
    ) -> PdfDancerResult<Arc<DocumentSnapshot>> {
        if let CacheSlot::Cached(document) = &self.document {
            debug!("Document snapshot cache hit");
            return Ok(Arc::clone(document));
        }

        debug!(
            invalidated = matches!(self.document, CacheSlot::Invalidated),
            "Document snapshot cache miss"
        );
        let document = Arc::new(source.fetch_document(&[]).await?);
        for (index, page) in document.pages.iter().enumerate() {
            self.pages.entry(index).or_insert_with(|| Arc::clone(page));
        }
        self.document = CacheSlot::Cached(Arc::clone(&document));
        Ok(document)
    }

    /// Return one page, preferring the page slot, then the cached document,
    /// then a dedicated page fetch.
    pub async fn get_or_fetch_page<S: SnapshotSource>(
        &mut self,
        source: &S,
        page_index: usize,
    ) -> PdfDancerResult<Arc<PageSnapshot>> {
        if let Some(page) = self.pages.get(&page_index) {
            debug!(page = page_index, "Page snapshot cache hit");
            return Ok(Arc::clone(page));
        }

        if let Some(page) = self
            .document()
            .and_then(|document| document.page(page_index))
            .cloned()
        {
            debug!(page = page_index, "Page snapshot taken from cached document");
            self.pages.insert(page_index, Arc::clone(&page));
            return Ok(page);
        }

        debug!(page = page_index, "Page snapshot cache miss");
        let page = Arc::new(source.fetch_page(page_index, &[]).await?);
        self.pages.insert(page_index, Arc::clone(&page));
        Ok(page)
    }

    /// Drop every cached snapshot
    pub fn invalidate(&mut self) {
        debug!(
            had_document = self.document().is_some(),
            pages = self.pages.len(),
            "Invalidating snapshot cache"
        );
        self.document = CacheSlot::Invalidated;
        self.pages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfDancerError;
    use crate::models::{ObjectRef, ObjectType, PageRef, Position, SnapshotElement};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn page(index: usize, element_id: &str) -> PageSnapshot {
        PageSnapshot {
            page_ref: PageRef {
                object_ref: ObjectRef::new(
                    format!("PAGE-{}", index),
                    Position::at_page(index),
                    ObjectType::Page,
                ),
                page_size: None,
                orientation: None,
            },
            elements: vec![SnapshotElement::Object(ObjectRef::new(
                element_id,
                Position::at_page(index),
                ObjectType::Image,
            ))],
        }
    }

    #[derive(Default)]
    struct CountingSource {
        page_count: usize,
        document_fetches: AtomicUsize,
        page_fetches: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn with_pages(page_count: usize) -> Self {
            Self {
                page_count,
                ..Default::default()
            }
        }
    }

    impl SnapshotSource for CountingSource {
        async fn fetch_document(&self, _types: &[ObjectType]) -> PdfDancerResult<DocumentSnapshot> {
            let generation = self.document_fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PdfDancerError::Http {
                    status: 500,
                    message: "down".to_string(),
                });
            }
            Ok(DocumentSnapshot {
                page_count: self.page_count,
                fonts: Vec::new(),
                pages: (0..self.page_count)
                    .map(|i| Arc::new(page(i, &format!("doc-{}-{}", generation, i))))
                    .collect(),
            })
        }

        async fn fetch_page(&self, page_index: usize, _types: &[ObjectType]) -> PdfDancerResult<PageSnapshot> {
            let generation = self.page_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(page(page_index, &format!("page-{}-{}", generation, page_index)))
        }
    }

    #[test]
    fn test_document_fetched_once() {
        let source = CountingSource::with_pages(2);
        let mut cache = SnapshotCache::new();

        let first = tokio_test::block_on(cache.get_or_fetch_document(&source)).unwrap();
        let second = tokio_test::block_on(cache.get_or_fetch_document(&source)).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.document_fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_page_served_from_cached_document() {
        let source = CountingSource::with_pages(3);
        let mut cache = SnapshotCache::new();

        let document = tokio_test::block_on(cache.get_or_fetch_document(&source)).unwrap();
        let page = tokio_test::block_on(cache.get_or_fetch_page(&source, 2)).unwrap();

        assert!(Arc::ptr_eq(&page, &document.pages[2]));
        assert_eq!(source.page_fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_out_of_range_page_is_fetched() {
        let source = CountingSource::with_pages(1);
        let mut cache = SnapshotCache::new();

        tokio_test::block_on(cache.get_or_fetch_document(&source)).unwrap();
        let page = tokio_test::block_on(cache.get_or_fetch_page(&source, 5)).unwrap();

        assert_eq!(page.page_index(), Some(5));
        assert_eq!(source.page_fetches.load(Ordering::SeqCst), 1);
        tokio_test::block_on(cache.get_or_fetch_page(&source, 5)).unwrap();
        assert_eq!(source.page_fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_document_fetch_keeps_existing_pages() {
        let source = CountingSource::with_pages(2);
        let mut cache = SnapshotCache::new();

        let early = tokio_test::block_on(cache.get_or_fetch_page(&source, 1)).unwrap();
        let document = tokio_test::block_on(cache.get_or_fetch_document(&source)).unwrap();

        let cached = cache.page(1).unwrap();
        assert!(Arc::ptr_eq(cached, &early));
        assert!(!Arc::ptr_eq(cached, &document.pages[1]));
        assert!(Arc::ptr_eq(cache.page(0).unwrap(), &document.pages[0]));
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let source = CountingSource::with_pages(1);
        let mut cache = SnapshotCache::new();

        let before = tokio_test::block_on(cache.get_or_fetch_page(&source, 0)).unwrap();
        tokio_test::block_on(cache.get_or_fetch_document(&source)).unwrap();
        cache.invalidate();
        assert!(cache.is_empty());

        let after = tokio_test::block_on(cache.get_or_fetch_page(&source, 0)).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(source.page_fetches.load(Ordering::SeqCst), 2);

        tokio_test::block_on(cache.get_or_fetch_document(&source)).unwrap();
        assert_eq!(source.document_fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_fetch_leaves_cache_empty() {
        let source = CountingSource {
            fail: true,
            ..CountingSource::with_pages(1)
        };
        let mut cache = SnapshotCache::new();

        assert!(tokio_test::block_on(cache.get_or_fetch_document(&source)).is_err());
        assert!(cache.is_empty());
    }
}
