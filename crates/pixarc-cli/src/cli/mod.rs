//! CLI for the pixarc archiver.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pixarc_core::{config, logging};
use std::path::PathBuf;

use commands::{run_archive, run_status, RunArgs};

/// Top-level CLI for the pixarc archiver.
#[derive(Debug, Parser)]
#[command(name = "pixarc")]
#[command(about = "pixarc: incremental pixiv account archiver", long_about = None)]
pub struct Cli {
    /// Log at debug level (per-work checking and skip traces).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log to stderr instead of the state-dir log file.
    #[arg(long, global = true)]
    pub log_stderr: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Archive every account listed in the accounts file.
    Run {
        /// Session cookie value (PHPSESSID) for the upstream platform.
        #[arg(short, long)]
        session: String,

        /// Path to the accounts JSON file (ordered `{id, name}` records).
        #[arg(short, long)]
        accounts: PathBuf,

        /// Completed-works ledger file (default: XDG state dir).
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Corrupted-works ledger file (default: XDG state dir). Must exist,
        /// even as an empty array.
        #[arg(long)]
        corrupted: Option<PathBuf>,

        /// Storage root for downloaded works (default: ./Storage).
        #[arg(long)]
        storage: Option<PathBuf>,

        /// Webhook URL to notify after each stored page.
        #[arg(long, requires = "webhook_token")]
        webhook_url: Option<String>,

        /// Bearer token for the webhook.
        #[arg(long, requires = "webhook_url")]
        webhook_token: Option<String>,
    },

    /// Show ledger contents (completed and still-corrupted works).
    Status {
        /// Completed-works ledger file (default: XDG state dir).
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Corrupted-works ledger file (default: XDG state dir).
        #[arg(long)]
        corrupted: Option<PathBuf>,
    },
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        if cli.log_stderr {
            logging::init_logging_stderr(cli.verbose);
        } else if logging::init_logging(cli.verbose).is_err() {
            logging::init_logging_stderr(cli.verbose);
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                session,
                accounts,
                cache,
                corrupted,
                storage,
                webhook_url,
                webhook_token,
            } => run_archive(
                &cfg,
                RunArgs {
                    session,
                    accounts,
                    cache,
                    corrupted,
                    storage,
                    webhook_url,
                    webhook_token,
                },
            ),
            CliCommand::Status { cache, corrupted } => run_status(cache, corrupted),
        }
    }
}

#[cfg(test)]
mod tests;
