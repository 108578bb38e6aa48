//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use subtrack_server::{ServerConfig, ALLOWED_ORIGINS_ENV};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_encrypt: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting Subtrack web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let config = ServerConfig::from_env();
    if config.allowed_origins.is_empty() {
        println!("   🔒 CORS: same-origin only (set {})", ALLOWED_ORIGINS_ENV);
    } else {
        println!("   🌐 CORS: {}", config.allowed_origins.join(", "));
    }
    println!("   📅 Due-soon window: {} day(s)", config.due_soon_days);

    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("Static directory path must be valid UTF-8"))
        .transpose()?;
    subtrack_server::serve_with_config(db, host, port, static_dir_str, config).await?;

    Ok(())
}
