//! Compensation (payroll) records

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use super::CanonicalId;

/// Payment status of a payroll record
///
/// Statuses outside the known set are carried through verbatim so rows
/// written by other clients still replicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum PayrollStatus {
    #[default]
    Pending,
    Processing,
    Paid,
    Other(String),
}

impl PayrollStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Paid => "Paid",
            Self::Other(status) => status,
        }
    }
}

impl fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayrollStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "Pending" | "" => Self::Pending,
            "Processing" => Self::Processing,
            "Paid" => Self::Paid,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<String> for PayrollStatus {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl From<PayrollStatus> for String {
    fn from(status: PayrollStatus) -> Self {
        match status {
            PayrollStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

impl ToSql for PayrollStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PayrollStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(Self::from(value.as_str()?.to_string()))
    }
}

/// Payroll attributes identical in both stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollFields {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Gross pay (`basic_salary` locally)
    pub gross_pay: f64,
    /// Total deductions
    pub deductions: f64,
    /// Net pay (`net_salary` locally)
    pub net_pay: f64,
    pub status: PayrollStatus,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    /// Itemized deductions as produced by the payroll calculator
    #[serde(default)]
    pub breakdown: Option<serde_json::Value>,
    #[serde(default, with = "crate::util::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::util::optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A payroll record as stored locally, joined to its employee's canonical id
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPayroll {
    pub id: i64,
    pub employee_id: i64,
    pub employee_canonical_id: CanonicalId,
    pub fields: PayrollFields,
}

/// A payroll record as stored remotely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePayroll {
    /// Canonical id of the employee
    pub employee_id: CanonicalId,
    #[serde(flatten)]
    pub fields: PayrollFields,
}

/// Natural key of a payroll record: one record per employee per pay period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayrollKey {
    pub employee: CanonicalId,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

impl fmt::Display for PayrollKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.employee, self.period_start, self.period_end
        )
    }
}

impl LocalPayroll {
    pub const fn key(&self) -> PayrollKey {
        PayrollKey {
            employee: self.employee_canonical_id,
            period_start: self.fields.period_start,
            period_end: self.fields.period_end,
        }
    }
}

impl RemotePayroll {
    pub const fn key(&self) -> PayrollKey {
        PayrollKey {
            employee: self.employee_id,
            period_start: self.fields.period_start,
            period_end: self.fields.period_end,
        }
    }
}
