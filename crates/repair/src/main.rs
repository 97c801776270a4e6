//! One-shot data repair tool for Chatwire.
//!
//! Backfills missing message identities and directions left behind by
//! imports that predate identity enforcement, then collapses exact
//! duplicates. Safe to re-run; a clean store is a no-op. Meant to run
//! offline, not alongside live traffic.

use std::env;

use clap::Parser;
use tracing::info;

use database::{repair, Database};

#[derive(Debug, Parser)]
#[command(name = "repair")]
#[command(about = "Backfill message identities and collapse duplicates")]
struct Args {
    /// SQLite database URL. Falls back to DATABASE_URL env.
    #[arg(long)]
    database_url: Option<String>,

    /// Platform number assumed as recipient for direction backfill.
    /// Falls back to PLATFORM_WA_ID env.
    #[arg(long)]
    platform_wa_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let database_url = args
        .database_url
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:chatwire.db?mode=rwc".to_string());
    let platform_wa_id = args
        .platform_wa_id
        .or_else(|| env::var("PLATFORM_WA_ID").ok())
        .unwrap_or_else(|| "919999999999".to_string());

    let db = Database::connect(&database_url).await?;
    db.migrate().await?;

    let report = repair::run(db.pool(), &platform_wa_id).await?;
    info!(
        ids_backfilled = report.ids_backfilled,
        directions_backfilled = report.directions_backfilled,
        duplicates_removed = report.duplicates_removed,
        "Repair finished"
    );

    db.close().await;
    Ok(())
}
