//! Export and restore of the subscription collection
//!
//! Supports:
//! - CSV export (one row per subscription, with the monthly-equivalent cost)
//! - JSON backup export/import that round-trips every field exactly

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::accounting::monthly_equivalent;
use crate::db::{insert_subscription_record, Database};
use crate::error::{Error, Result};
use crate::insights::format_money;
use crate::models::{NewSubscription, Subscription};

/// Version string written into backup metadata
pub const BACKUP_VERSION: &str = env!("CARGO_PKG_VERSION");

const CSV_HEADER: [&str; 10] = [
    "id",
    "name",
    "amount",
    "cycle",
    "next_due",
    "category",
    "notes",
    "monthly_cost",
    "created_at",
    "updated_at",
];

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown export format '{}' (expected csv or json)", s)),
        }
    }
}

/// Backup metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    /// Application version that created the backup
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub total_records: usize,
}

/// Complete subscription backup in the JSON exchange format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionBackup {
    pub metadata: BackupMetadata,
    pub subscriptions: Vec<Subscription>,
}

impl SubscriptionBackup {
    /// Parse a backup document; malformed input is a validation failure
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Validation(format!("Invalid backup file: {}", e)))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Import statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportStats {
    pub imported: usize,
    pub cleared: usize,
}

impl Database {
    /// Export all subscriptions to CSV, in list order
    pub fn export_subscriptions_csv(&self) -> Result<String> {
        let subscriptions = self.list_subscriptions()?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;

        for sub in &subscriptions {
            writer.write_record([
                sub.id.to_string(),
                sub.name.clone(),
                sub.amount.to_string(),
                sub.cycle.as_str().to_string(),
                sub.next_due.to_string(),
                sub.category.clone(),
                sub.notes.clone().unwrap_or_default(),
                format_money(monthly_equivalent(sub)),
                sub.created_at.to_rfc3339(),
                sub.updated_at.to_rfc3339(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    /// Snapshot every subscription with metadata
    pub fn export_backup(&self) -> Result<SubscriptionBackup> {
        let subscriptions = self.list_subscriptions()?;
        Ok(SubscriptionBackup {
            metadata: BackupMetadata {
                version: BACKUP_VERSION.to_string(),
                created_at: Utc::now(),
                total_records: subscriptions.len(),
            },
            subscriptions,
        })
    }

    /// Restore a backup, keeping original ids and timestamps
    ///
    /// Every record is validated before anything is written, and the whole
    /// restore runs in one transaction. An id repeated within the backup, or
    /// one already stored when `clear_existing` is false, is a validation
    /// failure and nothing is written.
    pub fn import_backup(
        &self,
        backup: &SubscriptionBackup,
        clear_existing: bool,
    ) -> Result<ImportStats> {
        let records = backup
            .subscriptions
            .iter()
            .map(validate_record)
            .collect::<Result<Vec<_>>>()?;

        let mut seen = HashSet::with_capacity(records.len());
        if let Some(dup) = records.iter().find(|r| !seen.insert(r.id)) {
            return Err(Error::Validation(format!(
                "Subscription id {} appears more than once in the backup",
                dup.id
            )));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut stats = ImportStats::default();
        if clear_existing {
            stats.cleared = tx.execute("DELETE FROM subscriptions", [])?;
        } else {
            let mut exists = tx.prepare("SELECT 1 FROM subscriptions WHERE id = ?")?;
            for record in &records {
                if exists.exists([record.id])? {
                    return Err(Error::Validation(format!(
                        "Subscription id {} already exists (import with clear to replace)",
                        record.id
                    )));
                }
            }
        }

        for record in &records {
            insert_subscription_record(&tx, record)?;
            stats.imported += 1;
        }
        tx.commit()?;

        info!(
            "Imported {} subscriptions ({} cleared)",
            stats.imported, stats.cleared
        );
        Ok(stats)
    }
}

/// Apply the creation rules to a backup record
fn validate_record(sub: &Subscription) -> Result<Subscription> {
    let fields = NewSubscription {
        name: sub.name.clone(),
        amount: sub.amount,
        cycle: sub.cycle.as_str().to_string(),
        next_due: sub.next_due,
        category: sub.category.clone(),
        notes: sub.notes.clone(),
    }
    .validate()
    .map_err(|e| match e {
        Error::Validation(msg) => {
            Error::Validation(format!("Subscription {}: {}", sub.id, msg))
        }
        other => other,
    })?;

    Ok(Subscription {
        id: sub.id,
        name: fields.name,
        amount: fields.amount,
        cycle: fields.cycle,
        next_due: fields.next_due,
        category: fields.category,
        notes: fields.notes,
        created_at: sub.created_at,
        updated_at: sub.updated_at,
    })
}
