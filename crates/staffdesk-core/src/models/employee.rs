//! Personnel (employee) records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::CanonicalId;

/// Employee attributes identical in both stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeFields {
    /// Human-facing company code (e.g. `EMP-0042`)
    #[serde(default)]
    pub company_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub position: String,
    /// Monthly compensation rate
    pub salary: f64,
    pub hire_date: NaiveDate,
    pub status: String,
    /// Attendance kiosk PIN
    #[serde(default)]
    pub pin_code: Option<String>,
    #[serde(default, with = "crate::util::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::util::optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An employee as stored locally
#[derive(Debug, Clone, PartialEq)]
pub struct LocalEmployee {
    /// Local integer id, referenced by local attendance and payroll rows
    pub id: i64,
    /// Canonical id, assigned before the row is ever pushed
    pub canonical_id: Option<CanonicalId>,
    /// Local department id
    pub department_id: Option<i64>,
    pub fields: EmployeeFields,
}

/// An employee as stored remotely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEmployee {
    pub id: CanonicalId,
    /// Canonical id of the employee's department
    #[serde(default)]
    pub department_id: Option<CanonicalId>,
    #[serde(flatten)]
    pub fields: EmployeeFields,
}

impl EmployeeFields {
    /// Display label used in logs
    pub fn label(&self) -> String {
        format!("{} {} <{}>", self.first_name, self.last_name, self.email)
    }
}
