//! Session facade over one server-side document.
//!
//! This module contains:
//! - Session bootstrap, raw snapshot access, fonts and download
//! - Mutations that invalidate the snapshot cache on success
//! - Document-wide selectors
//! - Page-scoped selectors via [`PageClient`]

mod mutations;
mod page;
mod selectors;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{PdfDancerError, PdfDancerResult};
use crate::models::{
    DocumentSnapshot, Font, NewDocumentOptions, ObjectType, PageSnapshot, Position,
    SnapshotElement,
};
use crate::query::{self, DEFAULT_TOLERANCE};
use crate::snapshot::{SnapshotCache, SnapshotFetcher, SnapshotSource};
use crate::transport::{ApiRequest, HttpTransport, Transport, Upload};

pub use page::PageClient;

/// File content held in memory or read from disk on use
#[derive(Debug, Clone, PartialEq)]
pub enum FileSource {
    Bytes(Bytes),
    Path(PathBuf),
}

impl FileSource {
    /// Load the content and the file name, if there is one.
    /// Missing, non-regular and empty files are validation errors.
    async fn load(self, kind: &str) -> PdfDancerResult<(Bytes, Option<String>)> {
        match self {
            FileSource::Bytes(data) => {
                if data.is_empty() {
                    return Err(PdfDancerError::validation(format!(
                        "{} data cannot be empty",
                        kind
                    )));
                }
                Ok((data, None))
            }
            FileSource::Path(path) => {
                let metadata = match tokio::fs::metadata(&path).await {
                    Ok(metadata) => metadata,
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        return Err(PdfDancerError::validation(format!(
                            "{} file does not exist: {}",
                            kind,
                            path.display()
                        )));
                    }
                    Err(source) => return Err(PdfDancerError::Io { path, source }),
                };
                if !metadata.is_file() {
                    return Err(PdfDancerError::validation(format!(
                        "{} file is not a file: {}",
                        kind,
                        path.display()
                    )));
                }
                if metadata.len() == 0 {
                    return Err(PdfDancerError::validation(format!(
                        "{} file is empty: {}",
                        kind,
                        path.display()
                    )));
                }

                let data = tokio::fs::read(&path)
                    .await
                    .map_err(|source| PdfDancerError::Io {
                        path: path.clone(),
                        source,
                    })?;
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned());
                Ok((Bytes::from(data), file_name))
            }
        }
    }
}

impl From<Bytes> for FileSource {
    fn from(data: Bytes) -> Self {
        FileSource::Bytes(data)
    }
}

impl From<Vec<u8>> for FileSource {
    fn from(data: Vec<u8>) -> Self {
        FileSource::Bytes(Bytes::from(data))
    }
}

impl From<&[u8]> for FileSource {
    fn from(data: &[u8]) -> Self {
        FileSource::Bytes(Bytes::copy_from_slice(data))
    }
}

impl From<PathBuf> for FileSource {
    fn from(path: PathBuf) -> Self {
        FileSource::Path(path)
    }
}

impl From<&Path> for FileSource {
    fn from(path: &Path) -> Self {
        FileSource::Path(path.to_path_buf())
    }
}

/// A session on one document, with its snapshot cache.
///
/// Every query and mutation takes `&mut self`; share a session between tasks
/// by wrapping it in a mutex.
pub struct PdfDancer<T = HttpTransport> {
    transport: T,
    cache: SnapshotCache,
}

impl PdfDancer<HttpTransport> {
    /// Upload a PDF and open a session on it
    pub async fn open(
        source: impl Into<FileSource>,
        config: &ClientConfig,
    ) -> PdfDancerResult<Self> {
        let (pdf, _) = source.into().load("PDF").await?;
        let transport = HttpTransport::open(config, pdf).await?;
        Ok(Self::with_transport(transport))
    }

    /// Open a session on a new blank document
    pub async fn new_document(
        options: &NewDocumentOptions,
        config: &ClientConfig,
    ) -> PdfDancerResult<Self> {
        let transport = HttpTransport::new_document(config, options).await?;
        Ok(Self::with_transport(transport))
    }
}

impl<T: Transport> PdfDancer<T> {
    /// Wrap an established session; the cache starts empty
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            cache: SnapshotCache::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        self.transport.session_id()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Objects of `object_type` matching `position`, in document order
    pub async fn find(
        &mut self,
        object_type: ObjectType,
        position: Option<&Position>,
    ) -> PdfDancerResult<Vec<SnapshotElement>> {
        self.find_with_tolerance(object_type, position, DEFAULT_TOLERANCE)
            .await
    }

    pub async fn find_with_tolerance(
        &mut self,
        object_type: ObjectType,
        position: Option<&Position>,
        tolerance: f64,
    ) -> PdfDancerResult<Vec<SnapshotElement>> {
        query::resolve(
            &self.transport,
            &mut self.cache,
            object_type,
            position,
            tolerance,
        )
        .await
    }

    pub async fn get_or_fetch_document(&mut self) -> PdfDancerResult<Arc<DocumentSnapshot>> {
        let fetcher = SnapshotFetcher::new(&self.transport);
        self.cache.get_or_fetch_document(&fetcher).await
    }

    pub async fn get_or_fetch_page(&mut self, page_index: usize) -> PdfDancerResult<Arc<PageSnapshot>> {
        let fetcher = SnapshotFetcher::new(&self.transport);
        self.cache.get_or_fetch_page(&fetcher, page_index).await
    }

    /// Drop all cached snapshots so the next query refetches
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Fresh document snapshot, bypassing the cache.
    /// A non-empty `types` limits the elements to those types.
    pub async fn get_document_snapshot(
        &self,
        types: &[ObjectType],
    ) -> PdfDancerResult<DocumentSnapshot> {
        SnapshotFetcher::new(&self.transport)
            .fetch_document(types)
            .await
    }

    /// Fresh page snapshot, bypassing the cache
    pub async fn get_page_snapshot(
        &self,
        page_index: usize,
        types: &[ObjectType],
    ) -> PdfDancerResult<PageSnapshot> {
        SnapshotFetcher::new(&self.transport)
            .fetch_page(page_index, types)
            .await
    }

    /// Fonts known to the server whose name matches `name`
    pub async fn find_fonts(&self, name: &str, size: f64) -> PdfDancerResult<Vec<Font>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PdfDancerError::validation("Font name cannot be empty"));
        }
        if size <= 0.0 || size.is_nan() {
            return Err(PdfDancerError::validation(format!(
                "Font size must be positive, got {}",
                size
            )));
        }

        let request = ApiRequest::get("/font/find").query("fontName", name);
        let names: Vec<String> = self
            .transport
            .send(request)
            .await?
            .json("GET /font/find")?;
        debug!(query = %name, matches = names.len(), "Font lookup");
        names.into_iter().map(|name| Font::new(name, size)).collect()
    }

    /// Upload a TrueType font; returns the name to use it under
    pub async fn register_font(&self, source: impl Into<FileSource>) -> PdfDancerResult<String> {
        let (data, file_name) = source.into().load("TTF").await?;
        let upload = Upload {
            path: "/font/register".to_string(),
            field: "ttfFile".to_string(),
            file_name: file_name.unwrap_or_else(|| "font.ttf".to_string()),
            content_type: "font/ttf".to_string(),
            data,
        };
        let name = self.transport.upload(upload).await?.text().trim().to_string();
        info!(font = %name, "Registered font");
        Ok(name)
    }

    /// Current PDF with every change made in this session
    pub async fn get_bytes(&self) -> PdfDancerResult<Bytes> {
        let path = format!(
            "/session/{}/pdf",
            urlencoding::encode(self.transport.session_id())
        );
        Ok(self.transport.send(ApiRequest::get(path)).await?.body)
    }

    /// Download the PDF to `path`, creating parent directories
    pub async fn save(&self, path: impl AsRef<Path>) -> PdfDancerResult<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(PdfDancerError::validation("File path cannot be empty"));
        }

        let data = self.get_bytes().await?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| PdfDancerError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(path, &data)
            .await
            .map_err(|source| PdfDancerError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), bytes = data.len(), "Saved PDF");
        Ok(())
    }
}
