//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_run_minimal() {
    let cli = parse(&["pixarc", "run", "-s", "abc123", "-a", "accounts.json"]);
    assert!(!cli.verbose);
    match cli.command {
        CliCommand::Run {
            session,
            accounts,
            cache,
            corrupted,
            storage,
            webhook_url,
            webhook_token,
        } => {
            assert_eq!(session, "abc123");
            assert_eq!(accounts, Path::new("accounts.json"));
            assert!(cache.is_none());
            assert!(corrupted.is_none());
            assert!(storage.is_none());
            assert!(webhook_url.is_none());
            assert!(webhook_token.is_none());
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_all_flags() {
    let cli = parse(&[
        "pixarc",
        "--verbose",
        "run",
        "--session",
        "abc",
        "--accounts",
        "/data/accounts.json",
        "--cache",
        "/data/cache.json",
        "--corrupted",
        "/data/corrupted.json",
        "--storage",
        "/archive",
        "--webhook-url",
        "https://hooks.example.com/n",
        "--webhook-token",
        "tok",
    ]);
    assert!(cli.verbose);
    match cli.command {
        CliCommand::Run {
            cache,
            corrupted,
            storage,
            webhook_url,
            webhook_token,
            ..
        } => {
            assert_eq!(cache.as_deref(), Some(Path::new("/data/cache.json")));
            assert_eq!(corrupted.as_deref(), Some(Path::new("/data/corrupted.json")));
            assert_eq!(storage.as_deref(), Some(Path::new("/archive")));
            assert_eq!(webhook_url.as_deref(), Some("https://hooks.example.com/n"));
            assert_eq!(webhook_token.as_deref(), Some("tok"));
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_run_requires_session() {
    assert!(Cli::try_parse_from(["pixarc", "run", "-a", "accounts.json"]).is_err());
}

#[test]
fn cli_webhook_url_requires_token() {
    assert!(Cli::try_parse_from([
        "pixarc",
        "run",
        "-s",
        "x",
        "-a",
        "a.json",
        "--webhook-url",
        "https://hooks.example.com/n",
    ])
    .is_err());
}

#[test]
fn cli_parse_status() {
    let cli = parse(&["pixarc", "status", "--cache", "c.json"]);
    match cli.command {
        CliCommand::Status { cache, corrupted } => {
            assert_eq!(cache.as_deref(), Some(Path::new("c.json")));
            assert!(corrupted.is_none());
        }
        _ => panic!("expected Status"),
    }
}
