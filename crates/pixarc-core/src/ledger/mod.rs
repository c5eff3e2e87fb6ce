//! Dedupe ledger: completed and corrupted work identifiers.
//!
//! The only persisted state in the system, held as two JSON arrays on disk.
//! `completed` records works confirmed fully downloaded; `corrupted` holds
//! externally maintained re-fetch flags of the form `"<workId>-<note>"`
//! (only the portion before the first `-` is significant). Invariant at
//! rest: no identifier is in both sets — `reconcile` removes flagged ids
//! from `completed` so they are re-downloaded, and `save` drops a flag once
//! its work has been completed again.
//!
//! Saves are atomic per file (temp file + rename) and cheap, so the pipeline
//! persists after every completed work; a crash loses at most the in-flight
//! work.


use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Ledger {
    cache_path: PathBuf,
    corrupted_path: PathBuf,
    /// Work ids confirmed fully downloaded, in completion order.
    completed: Vec<String>,
    /// Bare work ids flagged corrupt and not yet resolved.
    corrupted: Vec<String>,
}

impl Ledger {
    /// Loads both ledger files.
    ///
    /// A missing cache file means an empty `completed` set. A missing
    /// corrupted file is a hard failure: the corrupt list is maintained
    /// explicitly and is expected to exist even as an empty array.
    pub fn load(cache_path: &Path, corrupted_path: &Path) -> Result<Self> {
        let completed = match fs::read(cache_path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("parse cache ledger: {}", cache_path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read cache ledger: {}", cache_path.display()))
            }
        };

        let corrupted_raw: Vec<String> = {
            let bytes = fs::read(corrupted_path).with_context(|| {
                format!(
                    "read corrupted ledger: {} (must exist, even as [])",
                    corrupted_path.display()
                )
            })?;
            serde_json::from_slice(&bytes)
                .with_context(|| format!("parse corrupted ledger: {}", corrupted_path.display()))?
        };
        let corrupted = corrupted_raw.iter().map(|e| flagged_id(e)).collect();

        Ok(Self {
            cache_path: cache_path.to_path_buf(),
            corrupted_path: corrupted_path.to_path_buf(),
            completed,
            corrupted,
        })
    }

    /// Forces re-download of flagged works: every corrupted id is removed
    /// from `completed`, and flags whose work was never completed are kept
    /// for re-persisting. Postcondition: `completed ∩ corrupted = ∅`.
    pub fn reconcile(&mut self) {
        let completed_before = std::mem::take(&mut self.completed);
        self.completed = completed_before
            .iter()
            .filter(|id| !self.corrupted.contains(*id))
            .cloned()
            .collect();
        // Flags for works that were completed before this run are consumed:
        // the forced re-download is queued now. Flags for works never
        // completed stay until the work actually finishes.
        self.corrupted.retain(|id| !completed_before.contains(id));
        tracing::debug!(
            "ledger reconciled: {} completed, {} unresolved corrupt flag(s)",
            self.completed.len(),
            self.corrupted.len()
        );
    }

    pub fn is_complete(&self, work_id: &str) -> bool {
        self.completed.iter().any(|id| id == work_id)
    }

    /// Idempotent append to `completed`.
    pub fn mark_complete(&mut self, work_id: &str) {
        if !self.is_complete(work_id) {
            self.completed.push(work_id.to_string());
        }
    }

    /// Writes both files as JSON arrays, atomically overwriting each via a
    /// temp file and rename. Corrupt flags whose work is now completed are
    /// dropped from the persisted set.
    pub fn save(&self) -> Result<()> {
        let still_corrupted: Vec<&String> = self
            .corrupted
            .iter()
            .filter(|id| !self.is_complete(id))
            .collect();

        write_atomic(&self.cache_path, &serde_json::to_string_pretty(&self.completed)?)?;
        write_atomic(
            &self.corrupted_path,
            &serde_json::to_string_pretty(&still_corrupted)?,
        )?;
        Ok(())
    }

    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    pub fn corrupted(&self) -> &[String] {
        &self.corrupted
    }
}

/// The significant portion of a corrupted entry: everything before the first
/// `-`. An entry with no `-` is taken whole.
fn flagged_id(entry: &str) -> String {
    match entry.split_once('-') {
        Some((id, _)) => id.to_string(),
        None => entry.to_string(),
    }
}

/// Writes `contents` to `path` via `<path>.part` + rename, creating the
/// parent directory if needed.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create dir: {}", parent.display()))?;
    }
    let tmp = temp_path(path);
    fs::write(&tmp, contents).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} to {}", tmp.display(), path.display()))?;
    Ok(())
}

/// Temp-file path for atomic overwrite: appends `.part` to the final path.
fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(".part");
    PathBuf::from(o)
}
