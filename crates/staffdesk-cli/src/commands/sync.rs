use staffdesk_core::db::SqliteLocalStore;
use staffdesk_core::remote::PostgrestRemoteStore;
use staffdesk_core::sync::scheduler::run_scheduler;
use staffdesk_core::{CycleOutcome, SyncEngine};

use crate::auth::auth_client;
use crate::commands::common::{format_report_lines, load_settings, open_database, require_supabase};
use crate::error::CliError;

/// Run the periodic sync service until Ctrl-C.
pub async fn run_service() -> Result<(), CliError> {
    let settings = load_settings()?;
    let supabase = require_supabase(&settings)?;
    let db = open_database(&settings)?;
    let engine = SyncEngine::new(
        SqliteLocalStore::new(db.connection()),
        PostgrestRemoteStore::new(&supabase.url, supabase.anon_key.clone())?,
        auth_client(supabase)?,
    );

    println!(
        "Syncing {} every {}s (Ctrl-C to stop)",
        settings.db_path.display(),
        settings.sync_interval.as_secs()
    );
    run_scheduler(&engine, settings.sync_interval, shutdown_signal()).await;
    Ok(())
}

/// Run exactly one cycle and print the per-collection summary.
pub async fn run_sync() -> Result<(), CliError> {
    let settings = load_settings()?;
    let supabase = require_supabase(&settings)?;
    let db = open_database(&settings)?;
    let engine = SyncEngine::new(
        SqliteLocalStore::new(db.connection()),
        PostgrestRemoteStore::new(&supabase.url, supabase.anon_key.clone())?,
        auth_client(supabase)?,
    );

    match engine.run_sync_cycle().await {
        CycleOutcome::Completed(report) => {
            for line in format_report_lines(&report) {
                println!("{line}");
            }
            println!("Sync completed");
        }
        CycleOutcome::SkippedNoSession => return Err(CliError::NotSignedIn),
        CycleOutcome::AlreadyRunning => println!("Sync already in progress"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for Ctrl-C: {error}");
        std::future::pending::<()>().await;
    }
}
