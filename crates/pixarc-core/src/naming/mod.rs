//! Local path derivation for archived works.
//!
//! Produces the fixed on-disk layout
//! `{storage}/{accountId}-{name}/{workId}-{title}/{workId}-{page}{suffix}`,
//! with names sanitized for Linux filesystems.

mod sanitize;

pub use sanitize::sanitize_for_linux;

use std::path::{Path, PathBuf};

use crate::config::Account;
use crate::resolver::WorkMetadata;

/// Where one page's bytes land: directory plus final filename.
///
/// Derived deterministically from account, work metadata, and page index;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub directory: PathBuf,
    pub filename: String,
}

impl DownloadTarget {
    /// Full path of the file this target describes.
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Directory holding every work of one account: `{id}-{sanitized name}`.
pub fn account_dir(storage_root: &Path, account: &Account) -> PathBuf {
    storage_root.join(format!(
        "{}-{}",
        account.id,
        sanitize_for_linux(&account.name)
    ))
}

/// Target for page `page` of work `work_id`.
///
/// The title inside `meta` is sanitized when the metadata is parsed and is
/// joined here verbatim; the suffix carries its leading dot.
pub fn page_target(
    storage_root: &Path,
    account: &Account,
    work_id: &str,
    meta: &WorkMetadata,
    page: u32,
) -> DownloadTarget {
    let directory =
        account_dir(storage_root, account).join(format!("{}-{}", work_id, meta.title));
    DownloadTarget {
        directory,
        filename: format!("{}-{}{}", work_id, page, meta.url_suffix),
    }
}
