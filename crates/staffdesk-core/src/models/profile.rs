//! Administrative profile / registration record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile attributes identical in both stores.
///
/// Password hashes and license data stay in the local store only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
    pub company_name: String,
    pub company_email: String,
    pub admin_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub theme_preference: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, with = "crate::util::optional_timestamp")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// The registered administrator profile, keyed by admin email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub admin_email: String,
    #[serde(flatten)]
    pub fields: ProfileFields,
}
