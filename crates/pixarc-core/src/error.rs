//! Page fetch error type for outcome classification.

use std::path::PathBuf;
use thiserror::Error;

/// Error from a single page fetch (transport failure, HTTP error, or disk
/// write). The page loop terminates on any of these; the variant only drives
/// logging, so "past the last page" (HTTP 404) can be told apart from a
/// transport blip that truncated the work.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Curl reported an error (timeout, connection, TLS, etc.).
    #[error("transfer failed: {0}")]
    Transport(#[from] curl::Error),
    /// Creating the target directory or writing the body failed.
    #[error("write {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// True for HTTP 404, the status the asset host returns past the last
    /// page of a work.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Http(404))
    }
}
