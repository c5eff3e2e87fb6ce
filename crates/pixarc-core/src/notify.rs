//! Completion notifications to an optional webhook.
//!
//! One bearer-authenticated POST per stored page, fire-and-forget: failures
//! are logged and never surfaced to the download pipeline.

use std::time::Duration;

use crate::config::WebhookConfig;

/// Sends `{url, message}` JSON notifications to a configured webhook.
#[derive(Debug, Clone)]
pub struct Notifier {
    url: String,
    token: String,
    timeout: Duration,
}

impl Notifier {
    pub fn new(cfg: &WebhookConfig) -> Self {
        Self {
            url: cfg.url.clone(),
            token: cfg.token.clone(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Notifies that `asset_url` (a page of the work at `artwork_url`) was
    /// stored. Never returns an error; the notification is best-effort.
    pub fn notify_downloaded(&self, asset_url: &str, artwork_url: &str) {
        let body = serde_json::json!({
            "url": asset_url,
            "message": format!("[pixarc] downloaded: {artwork_url}"),
        })
        .to_string();

        match self.post_json(&body) {
            Ok(code) if (200..300).contains(&code) => {
                tracing::debug!("notified webhook for {}", asset_url);
            }
            Ok(code) => {
                tracing::warn!("webhook {} returned HTTP {}", self.url, code);
            }
            Err(e) => {
                tracing::warn!("webhook {} unreachable: {}", self.url, e);
            }
        }
    }

    fn post_json(&self, body: &str) -> Result<u32, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(&self.url)?;
        easy.post(true)?;
        easy.post_fields_copy(body.as_bytes())?;
        easy.timeout(self.timeout)?;

        let mut list = curl::easy::List::new();
        list.append("Content-Type: application/json")?;
        list.append(&format!("Authorization: Bearer {}", self.token))?;
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            // Drain the response body so libcurl can reuse the connection.
            transfer.write_function(|data| Ok(data.len()))?;
            transfer.perform()?;
        }
        easy.response_code()
    }
}
