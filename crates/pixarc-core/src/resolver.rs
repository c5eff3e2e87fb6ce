//! Per-work asset URL resolution.
//!
//! A work's metadata is a URL template around a page index. The upstream
//! never reports a page count, so the sequence of page URLs is unbounded by
//! contract; the download loop decides termination at the first page that
//! fails to fetch.

/// URL template and display title for one work's ordered page assets.
///
/// Ephemeral: recomputed from the artwork page on every run, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkMetadata {
    /// Work title, already sanitized for filesystem use.
    pub title: String,
    /// URL up to and including the page-number token (e.g. `…/123_p`).
    pub url_prefix: String,
    /// URL after the page number (e.g. `.png`).
    pub url_suffix: String,
}

impl WorkMetadata {
    /// URL of page `page` (0-based).
    pub fn page_url(&self, page: u32) -> String {
        format!("{}{}{}", self.url_prefix, page, self.url_suffix)
    }

    /// Lazy, unbounded iterator over `(page_index, url)` starting at page 0.
    pub fn page_urls(&self) -> PageUrls<'_> {
        PageUrls { meta: self, next: 0 }
    }
}

/// Iterator produced by [`WorkMetadata::page_urls`].
#[derive(Debug)]
pub struct PageUrls<'a> {
    meta: &'a WorkMetadata,
    next: u32,
}

impl Iterator for PageUrls<'_> {
    type Item = (u32, String);

    fn next(&mut self) -> Option<Self::Item> {
        let page = self.next;
        self.next += 1;
        Some((page, self.meta.page_url(page)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> WorkMetadata {
        WorkMetadata {
            title: "Foo".to_string(),
            url_prefix: "https://i.example.net/img/555_p".to_string(),
            url_suffix: ".png".to_string(),
        }
    }

    #[test]
    fn page_url_inserts_index_between_prefix_and_suffix() {
        assert_eq!(meta().page_url(0), "https://i.example.net/img/555_p0.png");
        assert_eq!(meta().page_url(12), "https://i.example.net/img/555_p12.png");
    }

    #[test]
    fn page_urls_yields_ascending_pages() {
        let m = meta();
        let first: Vec<(u32, String)> = m.page_urls().take(3).collect();
        assert_eq!(
            first,
            vec![
                (0, "https://i.example.net/img/555_p0.png".to_string()),
                (1, "https://i.example.net/img/555_p1.png".to_string()),
                (2, "https://i.example.net/img/555_p2.png".to_string()),
            ]
        );
    }

    #[test]
    fn page_urls_is_unbounded() {
        let m = meta();
        // No upper bound short of u32 overflow; spot-check a deep index.
        let (page, url) = m.page_urls().nth(100).unwrap();
        assert_eq!(page, 100);
        assert_eq!(url, m.page_url(100));
    }
}
