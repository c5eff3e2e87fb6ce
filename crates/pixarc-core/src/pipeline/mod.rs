//! Sequential archival pipeline.
//!
//! Drives the per-account, per-work, per-page iteration: listing → skip
//! check → metadata resolve → page loop → ledger mark/save. One network
//! request is in flight at a time; the next is issued only after the
//! previous outcome is known. Recoverable failures are logged and the run
//! continues; only ledger persistence at end of run can fail the pipeline.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Account;
use crate::fetcher::PageFetcher;
use crate::ledger::Ledger;
use crate::naming;
use crate::upstream::UpstreamClient;

/// Terminal state of one work within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkOutcome {
    /// Already in the completed set; no upstream request was made.
    Skipped,
    /// Metadata fetch or parse failed; not marked complete, retried next run.
    MetadataFailed,
    /// Page loop ran to its first failure; marked complete with this many
    /// pages stored (possibly zero).
    Archived { pages: u32 },
}

/// Totals across one run, for the caller's summary output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub accounts: usize,
    pub archived: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// The pipeline orchestrator. Owns no state beyond its collaborators; all
/// dedupe state lives in the [`Ledger`] passed through each call.
pub struct Archiver<'a> {
    client: &'a UpstreamClient,
    fetcher: &'a PageFetcher,
    storage_root: PathBuf,
}

impl<'a> Archiver<'a> {
    pub fn new(client: &'a UpstreamClient, fetcher: &'a PageFetcher, storage_root: PathBuf) -> Self {
        Self {
            client,
            fetcher,
            storage_root,
        }
    }

    /// Archives every account in order, persisting the ledger after each
    /// completed work and once more at the end.
    pub fn run(&self, accounts: &[Account], ledger: &mut Ledger) -> Result<RunSummary> {
        let mut summary = RunSummary {
            accounts: accounts.len(),
            ..RunSummary::default()
        };
        for account in accounts {
            self.archive_account(account, ledger, &mut summary);
        }
        ledger.save().context("persist ledger at end of run")?;
        Ok(summary)
    }

    /// Archives one account. A malformed listing (or unreachable upstream)
    /// yields zero new works for this run and is never fatal.
    fn archive_account(&self, account: &Account, ledger: &mut Ledger, summary: &mut RunSummary) {
        let listing = match self.client.list_works(account) {
            Ok(listing) => listing,
            Err(e) => {
                tracing::warn!("account {} [{}]: listing failed: {:#}", account.id, account.name, e);
                return;
            }
        };

        if let Err(e) = std::fs::create_dir_all(naming::account_dir(&self.storage_root, account)) {
            tracing::warn!("account {} [{}]: cannot create storage dir: {}", account.id, account.name, e);
            return;
        }

        let total = listing.len();
        for (index, work_id) in listing.keys().enumerate() {
            tracing::debug!(
                "checking [{}-{}] {}/{}: {}",
                account.id,
                account.name,
                index + 1,
                total,
                work_id
            );
            match self.archive_work(account, work_id, index + 1, total, ledger) {
                WorkOutcome::Skipped => summary.skipped += 1,
                WorkOutcome::MetadataFailed => summary.failed += 1,
                WorkOutcome::Archived { .. } => {
                    summary.archived += 1;
                    // Persist now so a crash later loses only in-flight work.
                    if let Err(e) = ledger.save() {
                        tracing::warn!("could not persist ledger after work {}: {:#}", work_id, e);
                    }
                }
            }
        }
    }

    /// Runs one work through its states: skip if completed, resolve
    /// metadata, then fetch pages 0,1,2,… until the first failure, and mark
    /// complete. The first failed page ends the loop no matter its cause;
    /// the work is marked complete even when zero pages were stored.
    fn archive_work(
        &self,
        account: &Account,
        work_id: &str,
        index: usize,
        total: usize,
        ledger: &mut Ledger,
    ) -> WorkOutcome {
        if ledger.is_complete(work_id) {
            tracing::debug!("skip {}", work_id);
            return WorkOutcome::Skipped;
        }

        let meta = match self.client.work_meta(work_id) {
            Ok(Some(meta)) => meta,
            Ok(None) => return WorkOutcome::MetadataFailed,
            Err(e) => {
                tracing::warn!("work {}: metadata fetch failed: {:#}", work_id, e);
                return WorkOutcome::MetadataFailed;
            }
        };

        tracing::info!(
            "downloading [{}-{}] {}/{}: {}",
            account.id,
            account.name,
            index,
            total,
            work_id
        );

        let artwork_url = self.client.artwork_url(work_id);
        let mut pages = 0u32;
        for (page, url) in meta.page_urls() {
            let target = naming::page_target(&self.storage_root, account, work_id, &meta, page);
            match self.fetcher.fetch_page(&url, &target, &artwork_url) {
                Ok(()) => pages += 1,
                Err(e) if e.is_not_found() => {
                    tracing::debug!("work {}: no page {} ({})", work_id, page, e);
                    break;
                }
                Err(e) => {
                    // Ends the work exactly like "no more pages" does; the
                    // log line is the only place the difference shows.
                    tracing::warn!("work {}: page {} failed: {}", work_id, page, e);
                    break;
                }
            }
        }

        ledger.mark_complete(work_id);
        WorkOutcome::Archived { pages }
    }
}
