//! Organizational unit (department) records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CanonicalId;

/// A department as stored locally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalDepartment {
    /// Local integer id, never sent to the remote store
    pub id: i64,
    /// Unique department name, the cross-store join key
    pub name: String,
    /// Annual budget
    pub budget: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Remote canonical id, unset until the first sync links it
    pub remote_id: Option<CanonicalId>,
}

/// A department as stored remotely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDepartment {
    pub id: CanonicalId,
    pub name: String,
    pub budget: f64,
    #[serde(default, with = "crate::util::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::util::optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert payload for a remote department; the remote store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRemoteDepartment {
    pub name: String,
    pub budget: f64,
    #[serde(serialize_with = "crate::util::optional_timestamp::serialize")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "crate::util::optional_timestamp::serialize")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&LocalDepartment> for NewRemoteDepartment {
    fn from(value: &LocalDepartment) -> Self {
        Self {
            name: value.name.clone(),
            budget: value.budget,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Mutable department fields written on update, in either direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentChanges {
    pub budget: f64,
    #[serde(serialize_with = "crate::util::optional_timestamp::serialize")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&LocalDepartment> for DepartmentChanges {
    fn from(value: &LocalDepartment) -> Self {
        Self {
            budget: value.budget,
            updated_at: value.updated_at,
        }
    }
}

impl From<&RemoteDepartment> for DepartmentChanges {
    fn from(value: &RemoteDepartment) -> Self {
        Self {
            budget: value.budget,
            updated_at: value.updated_at,
        }
    }
}
