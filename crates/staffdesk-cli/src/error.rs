use std::io;

use staffdesk_core::auth::AuthError;
use staffdesk_core::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] staffdesk_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
    #[error("Remote store error: {0}")]
    Remote(#[from] staffdesk_core::remote::RemoteError),
    #[error("Sync is not configured. Set SUPABASE_URL and SUPABASE_ANON_KEY to enable sync.")]
    SyncNotConfigured,
    #[error("Not signed in. Run `staffdesk auth login --email <EMAIL> --password <PASSWORD>` first.")]
    NotSignedIn,
}
