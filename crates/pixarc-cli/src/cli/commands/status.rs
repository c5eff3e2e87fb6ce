//! `pixarc status` – show ledger contents.

use anyhow::Result;
use std::path::PathBuf;

use pixarc_core::config;
use pixarc_core::ledger::Ledger;

pub fn run_status(cache: Option<PathBuf>, corrupted: Option<PathBuf>) -> Result<()> {
    let cache_path = match cache {
        Some(p) => p,
        None => config::default_cache_path()?,
    };
    let corrupted_path = match corrupted {
        Some(p) => p,
        None => config::default_corrupted_path()?,
    };

    let ledger = Ledger::load(&cache_path, &corrupted_path)?;
    println!(
        "{} completed work(s), {} corrupt flag(s).",
        ledger.completed().len(),
        ledger.corrupted().len()
    );
    if !ledger.corrupted().is_empty() {
        println!("Flagged for re-download on next run:");
        for id in ledger.corrupted() {
            println!("  {id}");
        }
    }
    Ok(())
}
