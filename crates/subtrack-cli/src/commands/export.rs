//! Export and restore command implementations

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use subtrack_core::db::Database;
use subtrack_core::export::{ImportStats, SubscriptionBackup};

use super::open_db;

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            file.write_all(content.as_bytes())
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            io::stdout().write_all(content.as_bytes())?;
        }
    }
    Ok(())
}

pub fn cmd_export_csv(db: &Database, output: Option<&Path>) -> Result<()> {
    let csv = db.export_subscriptions_csv()?;
    write_output(&csv, output)?;

    if let Some(path) = output {
        let rows = csv.lines().count().saturating_sub(1);
        eprintln!("✅ Exported {} subscription(s) to {}", rows, path.display());
    }
    Ok(())
}

pub fn cmd_export_json(db: &Database, output: Option<&Path>) -> Result<()> {
    let backup = db.export_backup()?;
    let json = backup.to_json_pretty()?;
    write_output(&json, output)?;

    if let Some(path) = output {
        eprintln!(
            "✅ Exported {} subscription(s) to {}",
            backup.metadata.total_records,
            path.display()
        );
    }
    Ok(())
}

pub fn cmd_import(
    db_path: &Path,
    input: &Path,
    clear: bool,
    yes: bool,
    no_encrypt: bool,
) -> Result<()> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let backup = SubscriptionBackup::from_json(&json)?;

    println!("📦 Backup from {}", input.display());
    println!("   Version:  {}", backup.metadata.version);
    println!("   Created:  {}", backup.metadata.created_at);
    println!("   Records:  {}", backup.subscriptions.len());

    let db = open_db(db_path, no_encrypt)?;

    if clear && !yes {
        let existing = db.count_subscriptions()?;
        print!(
            "⚠️  This will delete {} existing subscription(s). Continue? [y/N] ",
            existing
        );
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let ImportStats { imported, cleared } = db.import_backup(&backup, clear)?;

    if clear {
        println!("   Cleared {} existing subscription(s)", cleared);
    }
    println!("✅ Imported {} subscription(s)", imported);

    Ok(())
}
