//! `pixarc run` – archive every configured account.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use pixarc_core::config::{self, PixarcConfig, WebhookConfig};
use pixarc_core::fetcher::PageFetcher;
use pixarc_core::ledger::Ledger;
use pixarc_core::notify::Notifier;
use pixarc_core::pipeline::Archiver;
use pixarc_core::upstream::{UpstreamClient, DEFAULT_BASE_URL};

pub struct RunArgs {
    pub session: String,
    pub accounts: PathBuf,
    pub cache: Option<PathBuf>,
    pub corrupted: Option<PathBuf>,
    pub storage: Option<PathBuf>,
    pub webhook_url: Option<String>,
    pub webhook_token: Option<String>,
}

pub fn run_archive(cfg: &PixarcConfig, args: RunArgs) -> Result<()> {
    let accounts = config::load_accounts(&args.accounts)?;
    if accounts.is_empty() {
        println!("No accounts configured.");
        return Ok(());
    }

    let cache_path = match args.cache {
        Some(p) => p,
        None => config::default_cache_path()?,
    };
    let corrupted_path = match args.corrupted {
        Some(p) => p,
        None => config::default_corrupted_path()?,
    };
    let storage_root = match args.storage.or_else(|| cfg.storage_root.clone()) {
        Some(p) => p,
        None => config::default_storage_root()?,
    };

    let mut ledger = Ledger::load(&cache_path, &corrupted_path)?;
    ledger.reconcile();

    let base_url = cfg.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let client = UpstreamClient::new(
        base_url,
        &args.session,
        Duration::from_secs(cfg.connect_timeout_secs),
        Duration::from_secs(cfg.api_timeout_secs),
    )?;

    // CLI-supplied webhook wins over the config file's.
    let webhook = match (args.webhook_url, args.webhook_token) {
        (Some(url), Some(token)) => Some(WebhookConfig { url, token }),
        _ => cfg.webhook.clone(),
    };
    let notifier = webhook.as_ref().map(Notifier::new);

    let fetcher = PageFetcher::new(Duration::from_secs(cfg.page_timeout_secs), notifier);
    std::fs::create_dir_all(&storage_root)
        .with_context(|| format!("create storage root: {}", storage_root.display()))?;

    let archiver = Archiver::new(&client, &fetcher, storage_root);
    let summary = archiver.run(&accounts, &mut ledger)?;

    println!(
        "Archived {} work(s) across {} account(s) ({} skipped, {} failed).",
        summary.archived, summary.accounts, summary.skipped, summary.failed
    );
    Ok(())
}
