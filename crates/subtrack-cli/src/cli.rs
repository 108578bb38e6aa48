//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Subtrack - Keep track of bills and subscriptions
#[derive(Parser)]
#[command(name = "subtrack")]
#[command(about = "Self-hosted bill and subscription tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "subtrack.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set SUBTRACK_DB_KEY environment variable with your passphrase.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage subscriptions (list, add, show, update, delete, paid, search)
    Subscriptions {
        #[command(subcommand)]
        action: Option<SubscriptionsAction>,
    },

    /// Show what is due today and in the coming days
    Due {
        /// Length of the upcoming window in days
        #[arg(short, long, default_value = "7")]
        days: u32,

        /// Evaluate as of this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Monthly spend by category
    Summary,

    /// Category spend sentence for one subscription
    Insight {
        /// Subscription ID
        id: i64,
    },

    /// Spend summary, upcoming renewals and insights
    Dashboard {
        /// Length of the upcoming window in days
        #[arg(short, long, default_value = "7")]
        days: u32,

        /// Evaluate as of this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Export subscriptions (CSV table or JSON backup)
    Export {
        #[command(subcommand)]
        export_type: ExportType,
    },

    /// Restore subscriptions from a JSON backup
    Import {
        /// JSON backup file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Delete all existing subscriptions before import
        #[arg(long)]
        clear: bool,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory with the dashboard build to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum SubscriptionsAction {
    /// List all subscriptions, soonest due first
    List,

    /// Add a subscription
    Add {
        /// Display name (e.g. "Netflix")
        #[arg(short, long)]
        name: String,

        /// Amount per billing cycle
        #[arg(short, long)]
        amount: String,

        /// Billing cycle: monthly, annual, one-time
        #[arg(short, long, default_value = "monthly")]
        cycle: String,

        /// Next due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: String,

        /// Category label (e.g. OTT, Utility, SaaS)
        #[arg(short = 'g', long)]
        category: String,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show one subscription
    Show {
        /// Subscription ID
        id: i64,
    },

    /// Change fields of a subscription (only the given flags change)
    Update {
        /// Subscription ID
        id: i64,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        amount: Option<String>,

        #[arg(short, long)]
        cycle: Option<String>,

        /// Next due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<String>,

        #[arg(short = 'g', long)]
        category: Option<String>,

        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,

        /// Remove the notes
        #[arg(long)]
        clear_notes: bool,
    },

    /// Delete a subscription
    Delete {
        /// Subscription ID
        id: i64,
    },

    /// Record a payment and move the due date forward one cycle
    Paid {
        /// Subscription ID
        id: i64,
    },

    /// Find subscriptions by name or category
    Search {
        /// Text to look for (case-insensitive)
        term: String,
    },
}

#[derive(Subcommand)]
pub enum ExportType {
    /// Export subscriptions to CSV
    Csv {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export a JSON backup
    Json {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
