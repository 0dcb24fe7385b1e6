//! Runtime configuration for the sync service, read from the environment.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::util::{is_http_url, normalize_text_option};

/// Default period between sync cycles (30 minutes)
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 1_800;

const DATABASE_FILE_NAME: &str = "staffdesk.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Public Supabase project coordinates. The anon key is safe to ship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// `None` when neither `SUPABASE_URL` nor `SUPABASE_ANON_KEY` is set
    pub supabase: Option<SupabaseSettings>,
    pub db_path: PathBuf,
    pub sync_interval: Duration,
}

impl SyncSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let supabase = parse_supabase(&lookup)?;

        let db_path = match optional_trimmed(&lookup, "STAFFDESK_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let interval_secs = match optional_trimmed(&lookup, "STAFFDESK_SYNC_INTERVAL_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                ConfigError::Invalid(
                    "STAFFDESK_SYNC_INTERVAL_SECS must be a positive integer".to_string(),
                )
            })?,
            None => DEFAULT_SYNC_INTERVAL_SECS,
        };
        if interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "STAFFDESK_SYNC_INTERVAL_SECS must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            supabase,
            db_path,
            sync_interval: Duration::from_secs(interval_secs),
        })
    }

    /// Supabase settings, or an error naming what is missing.
    pub fn require_supabase(&self) -> Result<&SupabaseSettings, ConfigError> {
        self.supabase
            .as_ref()
            .ok_or(ConfigError::MissingVar("SUPABASE_URL"))
    }
}

fn parse_supabase(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<SupabaseSettings>, ConfigError> {
    let url = optional_trimmed(&lookup, "SUPABASE_URL");
    let anon_key = optional_trimmed(&lookup, "SUPABASE_ANON_KEY");

    match (url, anon_key) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::MissingVar("SUPABASE_ANON_KEY")),
        (None, Some(_)) => Err(ConfigError::MissingVar("SUPABASE_URL")),
        (Some(url), Some(anon_key)) => {
            if !is_http_url(&url) {
                return Err(ConfigError::Invalid(
                    "SUPABASE_URL must start with http:// or https://".to_string(),
                ));
            }
            Ok(Some(SupabaseSettings {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
            }))
        }
    }
}

fn default_db_path() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join("staffdesk").join(DATABASE_FILE_NAME))
        .ok_or_else(|| {
            ConfigError::Invalid(
                "could not determine a data directory; set STAFFDESK_DB_PATH".to_string(),
            )
        })
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    normalize_text_option(lookup(name))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> Result<SyncSettings, ConfigError> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        SyncSettings::from_lookup(|key| map.get(key).map(|value| (*value).to_string()))
    }

    #[test]
    fn unset_supabase_means_sync_not_configured() {
        let settings = settings(&[("STAFFDESK_DB_PATH", "/tmp/staffdesk.db")]).unwrap();
        assert_eq!(settings.supabase, None);
        assert_eq!(settings.db_path, PathBuf::from("/tmp/staffdesk.db"));
        assert_eq!(
            settings.sync_interval,
            Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS)
        );
        assert!(settings.require_supabase().is_err());
    }

    #[test]
    fn half_configured_supabase_is_an_error() {
        let err = settings(&[("SUPABASE_URL", "https://demo.supabase.co")]).unwrap_err();
        assert!(err.to_string().contains("SUPABASE_ANON_KEY"));

        let err = settings(&[("SUPABASE_ANON_KEY", "anon")]).unwrap_err();
        assert!(err.to_string().contains("SUPABASE_URL"));
    }

    #[test]
    fn supabase_url_is_normalized() {
        let settings = settings(&[
            ("SUPABASE_URL", " https://demo.supabase.co/ "),
            ("SUPABASE_ANON_KEY", "anon"),
            ("STAFFDESK_DB_PATH", "staffdesk.db"),
        ])
        .unwrap();
        assert_eq!(
            settings.supabase,
            Some(SupabaseSettings {
                url: "https://demo.supabase.co".to_string(),
                anon_key: "anon".to_string(),
            })
        );
    }

    #[test]
    fn supabase_url_requires_scheme() {
        let err = settings(&[
            ("SUPABASE_URL", "demo.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn sync_interval_must_be_positive_integer() {
        let settings_ok = settings(&[
            ("STAFFDESK_DB_PATH", "staffdesk.db"),
            ("STAFFDESK_SYNC_INTERVAL_SECS", "60"),
        ])
        .unwrap();
        assert_eq!(settings_ok.sync_interval, Duration::from_secs(60));

        assert!(settings(&[
            ("STAFFDESK_DB_PATH", "staffdesk.db"),
            ("STAFFDESK_SYNC_INTERVAL_SECS", "0"),
        ])
        .is_err());
        assert!(settings(&[
            ("STAFFDESK_DB_PATH", "staffdesk.db"),
            ("STAFFDESK_SYNC_INTERVAL_SECS", "soon"),
        ])
        .is_err());
    }
}
