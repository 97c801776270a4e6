//! Batch payload importer for Chatwire.
//!
//! Replays a directory of captured webhook payload bundles through the
//! sync engine. Each file and each extracted event is independent: a
//! malformed file or a failed call is logged and skipped, and the rest
//! of the batch continues.

use std::env;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use database::Database;
use sync_core::{extract_events, PayloadEvent, SyncEngine, WebhookPayload};

#[derive(Debug, Parser)]
#[command(name = "importer")]
#[command(about = "Replay webhook payload bundles through the sync engine")]
struct Args {
    /// Directory of payload JSON files
    #[arg(long, default_value = "./sample_payloads")]
    dir: PathBuf,

    /// SQLite database URL. Falls back to DATABASE_URL env.
    #[arg(long)]
    database_url: Option<String>,

    /// Platform number set as recipient of inbound messages.
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
    let engine = SyncEngine::new(db);

    let mut paths: Vec<PathBuf> = fs::read_dir(&args.dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut messages = 0usize;
    let mut statuses = 0usize;
    let mut failed = 0usize;

    for path in paths {
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "Skipping unreadable payload file");
                failed += 1;
                continue;
            }
        };

        let payload: WebhookPayload = match serde_json::from_str(&raw) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "Skipping unparseable payload file");
                failed += 1;
                continue;
            }
        };

        for event in extract_events(&payload, &platform_wa_id) {
            let is_message = matches!(event, PayloadEvent::Message(_));
            match engine.apply(event).await {
                Ok(()) if is_message => messages += 1,
                Ok(()) => statuses += 1,
                Err(err) => {
                    // One bad event must not abort the rest of the batch.
                    warn!(file = %path.display(), error = %err, "Event failed");
                    failed += 1;
                }
            }
        }
    }

    info!(messages, statuses, failed, "Payload import complete");
    Ok(())
}
