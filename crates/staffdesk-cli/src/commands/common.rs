use staffdesk_core::config::{SupabaseSettings, SyncSettings};
use staffdesk_core::db::Database;
use staffdesk_core::sync::{CollectionOutcome, CycleReport};

use crate::error::CliError;

pub fn load_settings() -> Result<SyncSettings, CliError> {
    Ok(SyncSettings::from_env()?)
}

pub fn require_supabase(settings: &SyncSettings) -> Result<&SupabaseSettings, CliError> {
    settings.supabase.as_ref().ok_or(CliError::SyncNotConfigured)
}

pub fn open_database(settings: &SyncSettings) -> Result<Database, CliError> {
    Ok(Database::open(&settings.db_path)?)
}

/// One line per collection, in sync order.
pub fn format_report_lines(report: &CycleReport) -> Vec<String> {
    report
        .collections
        .iter()
        .map(|(collection, outcome)| match outcome {
            CollectionOutcome::Synced(stats) => format!("{:<12}{stats}", collection.as_str()),
            CollectionOutcome::Failed(error) => {
                format!("{:<12}failed: {error}", collection.as_str())
            }
        })
        .collect()
}
