//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db, argument parsing)
//! - `export` - CSV export, JSON backup export and restore
//! - `reports` - Due lists, category summary, insights, dashboard
//! - `serve` - Web server command
//! - `subscriptions` - Subscription management commands

pub mod core;
pub mod export;
pub mod reports;
pub mod serve;
pub mod subscriptions;

// Re-export command functions for main.rs
pub use core::*;
pub use export::*;
pub use reports::*;
pub use serve::*;
pub use subscriptions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Turn a command failure into the message shown to the user
///
/// Missing records, rejected input and store failures read differently so
/// the user knows whether to fix the arguments or the database.
pub fn describe_error(err: &anyhow::Error) -> String {
    let core = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<subtrack_core::Error>());

    match core {
        Some(subtrack_core::Error::NotFound(msg)) => format!("❌ Not found: {}", msg),
        Some(subtrack_core::Error::Validation(msg)) => format!("❌ Invalid input: {}", msg),
        Some(_) => format!("❌ Storage failure: {:#}", err),
        None => format!("❌ {:#}", err),
    }
}
