//! Single-page asset download.
//!
//! One blocking GET per page with a fixed time budget, whole-body write to
//! the target path. A page is attempted exactly once; any failure ends the
//! caller's page loop for that work.

use std::fs;
use std::time::Duration;

use crate::error::FetchError;
use crate::naming::DownloadTarget;
use crate::notify::Notifier;

const REFERER: &str = "https://www.pixiv.net/";

/// Downloads page assets and fires the optional completion notification.
#[derive(Debug)]
pub struct PageFetcher {
    timeout: Duration,
    notifier: Option<Notifier>,
}

impl PageFetcher {
    pub fn new(timeout: Duration, notifier: Option<Notifier>) -> Self {
        Self { timeout, notifier }
    }

    /// Fetches `url` into `target`, overwriting any existing file.
    ///
    /// On success the stored file is logged and the webhook (if configured)
    /// is notified; notification failure never affects the result. Errors
    /// are returned for the caller to classify and log — they end the page
    /// loop but are never fatal to the pipeline.
    pub fn fetch_page(
        &self,
        url: &str,
        target: &DownloadTarget,
        artwork_url: &str,
    ) -> Result<(), FetchError> {
        fs::create_dir_all(&target.directory).map_err(|source| FetchError::Storage {
            path: target.directory.clone(),
            source,
        })?;

        let body = self.http_get(url)?;

        let path = target.path();
        fs::write(&path, &body).map_err(|source| FetchError::Storage {
            path: path.clone(),
            source,
        })?;
        tracing::info!("stored {} to {}", artwork_url, path.display());

        if let Some(notifier) = &self.notifier {
            notifier.notify_downloaded(url, artwork_url);
        }
        Ok(())
    }

    /// One GET within the fixed time budget. Returns the body only for 2xx
    /// responses; the asset host wants the page referer, nothing more.
    fn http_get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.timeout(self.timeout)?;

        let mut list = curl::easy::List::new();
        list.append(&format!("Referer: {REFERER}"))?;
        easy.http_headers(list)?;

        let mut body: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        Ok(body)
    }
}
