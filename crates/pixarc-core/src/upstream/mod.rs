//! Authenticated access to the upstream platform.
//!
//! Issues blocking curl requests carrying the fixed session cookie and
//! browser-impersonating headers, and parses the two upstream response
//! shapes: the profile work listing JSON and the artwork page's embedded
//! metadata JSON. Header set and endpoints are a fixed external protocol
//! contract, not negotiable here.

mod parse;

pub use parse::{extract_preload_json, split_page_token};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

use crate::config::Account;
use crate::naming::sanitize_for_linux;
use crate::resolver::WorkMetadata;

/// Production base URL; overridable for tests via config.
pub const DEFAULT_BASE_URL: &str = "https://www.pixiv.net";

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:87.0) Gecko/20100101 Firefox/87.0";
const REFERER: &str = "https://www.pixiv.net/";

/// Client for the upstream web API. One request in flight at a time.
#[derive(Debug)]
pub struct UpstreamClient {
    base: Url,
    session: String,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl UpstreamClient {
    pub fn new(
        base_url: &str,
        session: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid base URL: {base_url}"))?;
        Ok(Self {
            base,
            session: session.to_string(),
            connect_timeout,
            request_timeout,
        })
    }

    /// Public page URL of a work, used for logging and webhook messages.
    pub fn artwork_url(&self, work_id: &str) -> String {
        self.base
            .join(&format!("artworks/{work_id}"))
            .map(String::from)
            .unwrap_or_else(|_| format!("{}/artworks/{}", self.base, work_id))
    }

    /// Lists an account's published works: work id → untyped listing entry.
    ///
    /// Errors when the listing response lacks `body.illusts` — an
    /// authentication failure or rate limit. The caller logs this and treats
    /// the account as yielding no new work this run.
    pub fn list_works(&self, account: &Account) -> Result<Map<String, Value>> {
        let url = self
            .base
            .join(&format!("ajax/user/{}/profile/all?lang=ja", account.id))
            .context("build listing URL")?;
        let (code, body) = self.http_get(url.as_str())?;
        if !(200..300).contains(&code) {
            anyhow::bail!("GET {} returned HTTP {}", url, code);
        }
        let resp: parse::ProfileAllResponse = serde_json::from_slice(&body)
            .with_context(|| format!("parse listing for account {}", account.id))?;
        parse::listing_entries(&resp).ok_or_else(|| {
            anyhow::anyhow!(
                "listing for account {} has no body.illusts (bad session, rate limit, or upstream error)",
                account.id
            )
        })
    }

    /// Fetches and parses one work's metadata from its artwork page.
    ///
    /// `Ok(None)` when the page content is unusable (marker absent, embedded
    /// JSON malformed, expected fields missing); `Err` for transport/HTTP
    /// failures. Either way the caller skips the work and continues.
    pub fn work_meta(&self, work_id: &str) -> Result<Option<WorkMetadata>> {
        let url = self
            .base
            .join(&format!("artworks/{work_id}"))
            .context("build artwork URL")?;
        let (code, body) = self.http_get(url.as_str())?;
        if !(200..300).contains(&code) {
            anyhow::bail!("GET {} returned HTTP {}", url, code);
        }
        let html = String::from_utf8_lossy(&body);

        let Some(raw) = extract_preload_json(&html) else {
            tracing::warn!("work {}: no meta-preload-data marker in artwork page", work_id);
            return Ok(None);
        };
        let json: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("work {}: embedded metadata is not valid JSON: {}", work_id, e);
                return Ok(None);
            }
        };
        let Some((title, original)) = parse::work_fields(&json, work_id) else {
            tracing::warn!("work {}: metadata lacks title or urls.original", work_id);
            return Ok(None);
        };
        let Some((url_prefix, url_suffix)) = split_page_token(original) else {
            tracing::warn!("work {}: no page token in asset URL {}", work_id, original);
            return Ok(None);
        };

        Ok(Some(WorkMetadata {
            title: sanitize_for_linux(title),
            url_prefix,
            url_suffix,
        }))
    }

    /// One GET with the fixed credential and impersonation headers.
    /// Returns the status code and raw body; status is not checked here.
    fn http_get(&self, url: &str) -> Result<(u32, Vec<u8>)> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url).context("invalid URL")?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.request_timeout)?;

        let mut list = curl::easy::List::new();
        list.append(&format!("User-Agent: {USER_AGENT}"))?;
        list.append("Accept: application/json")?;
        list.append(&format!("Referer: {REFERER}"))?;
        list.append("Pragma: no-cache")?;
        list.append(&format!("Cookie: PHPSESSID={}", self.session))?;
        easy.http_headers(list)?;

        let mut body: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform().with_context(|| format!("GET {url} failed"))?;
        }
        let code = easy.response_code().context("no response code")?;
        Ok((code, body))
    }
}
