//! Client for the PDFDancer PDF manipulation service.
//!
//! A [`PdfDancer`] session uploads (or creates) a document on the server,
//! answers queries from cached page and document snapshots, and sends
//! mutations that clear the cache when the server applies them.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod snapshot;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::{FileSource, PageClient, PdfDancer};
pub use config::{ClientConfig, RetryConfig};
pub use error::{PdfDancerError, PdfDancerResult};
pub use transport::{HttpTransport, Transport};
