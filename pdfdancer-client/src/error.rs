use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main client error type
#[derive(Error, Debug)]
pub enum PdfDancerError {
    #[error("Invalid argument: {message}")]
    Validation { message: String },

    #[error(
        "Authentication with the PDFDancer API failed. Confirm that your API token is valid, \
         has not expired, and is supplied via the config or the PDFDANCER_TOKEN environment \
         variable. Server response: {message}"
    )]
    Authentication { message: String },

    #[error("API request failed (status {status}): {message}")]
    Http { status: u16, message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimited {
        retry_after: Option<Duration>,
        message: String,
    },

    #[error("Font not found: {message}")]
    FontNotFound { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("HTTP request failed: {context}")]
    Request {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid response for {context}")]
    InvalidResponse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed snapshot: {message}")]
    MalformedSnapshot { message: String },

    #[error("IO error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PdfDancerError {
    pub fn validation(message: impl Into<String>) -> Self {
        PdfDancerError::Validation {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        PdfDancerError::MalformedSnapshot {
            message: message.into(),
        }
    }

    /// True for failures that came from the network exchange rather than
    /// from caller input or local parsing.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            PdfDancerError::Authentication { .. }
                | PdfDancerError::Http { .. }
                | PdfDancerError::RateLimited { .. }
                | PdfDancerError::FontNotFound { .. }
                | PdfDancerError::Request { .. }
        )
    }

    /// Server-provided retry hint, only present on rate-limit failures
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            PdfDancerError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type PdfDancerResult<T> = Result<T, PdfDancerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kinds() {
        let validation = PdfDancerError::validation("Page index must be >= 0");
        assert!(!validation.is_transport_failure());
        assert_eq!(
            validation.to_string(),
            "Invalid argument: Page index must be >= 0"
        );

        let limited = PdfDancerError::RateLimited {
            retry_after: Some(Duration::from_secs(5)),
            message: "slow down".to_string(),
        };
        assert!(limited.is_transport_failure());
        assert_eq!(limited.retry_after(), Some(Duration::from_secs(5)));

        let font = PdfDancerError::FontNotFound {
            message: "Font not found: Comic".to_string(),
        };
        assert!(font.is_transport_failure());
        assert_eq!(font.retry_after(), None);
    }
}
