//! Remote authoritative store (Supabase / PostgREST).

#[cfg(test)]
pub(crate) mod memory;
mod postgrest;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{
    CanonicalId, DepartmentChanges, NewRemoteDepartment, Profile, RemoteAttendance,
    RemoteDepartment, RemoteEmployee, RemotePayroll,
};
use crate::util::compact_text;

pub use postgrest::{normalize_rest_url, PostgrestRemoteStore};

/// Postgres `undefined_table`, and PostgREST's schema-cache miss for an unknown table.
const MISSING_TABLE_CODES: [&str; 2] = ["42P01", "PGRST205"];

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Invalid remote configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Remote API error: {message} ({status})")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("No remote row matched {0}")]
    NotFound(String),
    #[error("Invalid remote payload: {0}")]
    InvalidPayload(String),
}

impl RemoteError {
    /// Whether the error reports that the addressed table does not exist.
    #[must_use]
    pub fn is_missing_table(&self) -> bool {
        matches!(
            self,
            Self::Api { code: Some(code), .. } if MISSING_TABLE_CODES.contains(&code.as_str())
        )
    }

    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        if let Ok(payload) = serde_json::from_str::<PostgrestErrorBody>(body) {
            if let Some(message) = payload.message.or(payload.details).or(payload.hint) {
                return Self::Api {
                    status: status.as_u16(),
                    code: payload.code,
                    message: message.trim().to_string(),
                };
            }
        }

        let trimmed = compact_text(body);
        Self::Api {
            status: status.as_u16(),
            code: None,
            message: if trimmed.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                trimmed
            },
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Row-level operations the replication engine needs from the remote store.
///
/// Every call is a network round trip; updates address rows by canonical id
/// (departments, employees) or by natural key (attendance, payroll, profile).
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Attach the signed-in user's access token to subsequent requests.
    async fn authorize(&self, access_token: &str);

    /// Run the idempotent `setup_schema` procedure.
    async fn provision_schema(&self) -> RemoteResult<()>;

    async fn list_departments(&self) -> RemoteResult<Vec<RemoteDepartment>>;

    /// Insert a department, returning the stored row with its canonical id.
    async fn insert_department(
        &self,
        department: &NewRemoteDepartment,
    ) -> RemoteResult<RemoteDepartment>;

    async fn update_department(
        &self,
        id: &CanonicalId,
        changes: &DepartmentChanges,
    ) -> RemoteResult<()>;

    async fn list_employees(&self) -> RemoteResult<Vec<RemoteEmployee>>;

    async fn insert_employee(&self, employee: &RemoteEmployee) -> RemoteResult<()>;

    async fn update_employee(&self, employee: &RemoteEmployee) -> RemoteResult<()>;

    async fn list_attendance(&self) -> RemoteResult<Vec<RemoteAttendance>>;

    async fn insert_attendance(&self, entry: &RemoteAttendance) -> RemoteResult<()>;

    async fn update_attendance(&self, entry: &RemoteAttendance) -> RemoteResult<()>;

    async fn list_payroll(&self) -> RemoteResult<Vec<RemotePayroll>>;

    async fn insert_payroll(&self, record: &RemotePayroll) -> RemoteResult<()>;

    async fn update_payroll(&self, record: &RemotePayroll) -> RemoteResult<()>;

    /// Find the profile registered under the given admin email.
    async fn find_profile(&self, admin_email: &str) -> RemoteResult<Option<Profile>>;

    async fn insert_profile(&self, profile: &Profile) -> RemoteResult<()>;

    async fn update_profile(&self, profile: &Profile) -> RemoteResult<()>;
}
