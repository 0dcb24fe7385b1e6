//! Daily time-tracking (attendance) entries

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::CanonicalId;

/// Attendance attributes identical in both stores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceFields {
    pub date: NaiveDate,
    /// Check-in time of day (`HH:MM:SS`)
    #[serde(default)]
    pub check_in: Option<String>,
    /// Check-out time of day (`HH:MM:SS`)
    #[serde(default)]
    pub check_out: Option<String>,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, with = "crate::util::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// Absent on rows written before the column existed
    #[serde(default, with = "crate::util::optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An attendance entry as stored locally, joined to its employee's canonical id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAttendance {
    pub id: i64,
    pub employee_id: i64,
    pub employee_canonical_id: CanonicalId,
    pub fields: AttendanceFields,
}

/// An attendance entry as stored remotely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAttendance {
    /// Canonical id of the employee
    pub employee_id: CanonicalId,
    #[serde(flatten)]
    pub fields: AttendanceFields,
}

/// Natural key of an attendance entry: one entry per employee per day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttendanceKey {
    pub employee: CanonicalId,
    pub date: NaiveDate,
}

impl fmt::Display for AttendanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.employee, self.date)
    }
}

impl LocalAttendance {
    pub const fn key(&self) -> AttendanceKey {
        AttendanceKey {
            employee: self.employee_canonical_id,
            date: self.fields.date,
        }
    }
}

impl RemoteAttendance {
    pub const fn key(&self) -> AttendanceKey {
        AttendanceKey {
            employee: self.employee_id,
            date: self.fields.date,
        }
    }
}
