//! Subtrack Core Library
//!
//! Shared functionality for the Subtrack bill and subscription tracker:
//! - Subscription store (SQLite with optional SQLCipher encryption)
//! - Accounting over subscription records (monthly equivalents, due windows,
//!   category breakdowns)
//! - Deterministic insight sentences built from those aggregates
//! - CSV export and JSON backup/restore

pub mod accounting;
pub mod db;
pub mod error;
pub mod export;
pub mod insights;
pub mod models;

pub use db::Database;
pub use error::{Error, Result};
pub use export::{BackupMetadata, ExportFormat, ImportStats, SubscriptionBackup};
pub use insights::{Insight, InsightKind};
pub use models::{
    CategoryDetail, Cycle, NewSubscription, SpendSummary, Subscription, SubscriptionUpdate,
    SUGGESTED_CATEGORIES,
};
