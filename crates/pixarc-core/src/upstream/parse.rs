//! Upstream response parsing: profile listing and artwork-page metadata.

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Envelope of `/ajax/user/{id}/profile/all`. Only `body` matters; the
/// upstream's `error`/`message` fields are ignored, as absence of
/// `body.illusts` already signals the failure.
#[derive(Debug, Deserialize)]
pub(super) struct ProfileAllResponse {
    #[serde(default)]
    pub body: Option<Value>,
}

/// Work listing from a profile response.
///
/// `None` when `body.illusts` is absent (the per-account failure shape).
/// The upstream sends `illusts` as an empty array when the account has no
/// works; that is an empty mapping, not a failure.
pub(super) fn listing_entries(resp: &ProfileAllResponse) -> Option<Map<String, Value>> {
    let illusts = resp.body.as_ref()?.get("illusts")?;
    match illusts {
        Value::Object(map) => Some(map.clone()),
        Value::Array(_) => Some(Map::new()),
        _ => None,
    }
}

fn preload_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"id="meta-preload-data" content='(.*)'>"#).unwrap())
}

fn page_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+_(?:p|ugoira)").unwrap())
}

/// Extracts the JSON payload embedded in an artwork page via the fixed
/// `meta-preload-data` marker. `None` when the marker is absent (login
/// redirect, deleted work).
pub fn extract_preload_json(html: &str) -> Option<&str> {
    preload_marker()
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Title and original-asset URL for `work_id` from the preload payload.
pub(super) fn work_fields<'a>(json: &'a Value, work_id: &str) -> Option<(&'a str, &'a str)> {
    let illust = json.get("illust")?.get(work_id)?;
    let title = illust.get("title")?.as_str()?;
    let original = illust.get("urls")?.get("original")?.as_str()?;
    Some((title, original))
}

/// Splits an original-asset URL around its page-number token:
/// `…/555_p0.png` → (`…/555_p`, `.png`). The character after the token must
/// be the first page's digit; everything past it is the suffix.
pub fn split_page_token(url: &str) -> Option<(String, String)> {
    let m = page_token().find(url)?;
    let rest = &url[m.end()..];
    let mut chars = rest.chars();
    if !chars.next()?.is_ascii_digit() {
        return None;
    }
    Some((url[..m.end()].to_string(), chars.as_str().to_string()))
}
