//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - Argument parsing helpers for dates and amounts

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use subtrack_core::db::Database;
use tracing::debug;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    debug!("Opening database at {} (encrypted: {})", path_str, !no_encrypt);
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;
    let count = db.count_subscriptions()?;
    println!("   {} subscription(s) on record", count);

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add a bill: subtrack subscriptions add --name Netflix --amount 199 --due 2025-05-01 --category OTT");
    println!("  2. Start web UI: subtrack serve");

    Ok(())
}

/// Today's date on the local clock
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` argument
pub fn parse_date_arg(raw: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid {} '{}' (use YYYY-MM-DD)", flag, raw))
}

/// `--as-of` if given, otherwise today
pub fn resolve_date(as_of: Option<&str>) -> Result<NaiveDate> {
    as_of
        .map(|raw| parse_date_arg(raw, "--as-of"))
        .transpose()
        .map(|date| date.unwrap_or_else(today))
}

/// Parse an amount argument as an exact decimal
pub fn parse_amount_arg(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim())
        .with_context(|| format!("Invalid --amount '{}' (expected a number like 199.00)", raw))
}
