//! Per-collection conflict rules deciding which side's copy of a row wins.
//!
//! Both predicates are evaluated against rows that already share a natural
//! key. Equal timestamps never move data in either direction.

use chrono::{DateTime, Utc};

use crate::models::{
    LocalAttendance, LocalDepartment, LocalEmployee, LocalPayroll, Profile, RemoteAttendance,
    RemoteDepartment, RemoteEmployee, RemotePayroll,
};
use crate::util::modified_or_epoch;

/// Conflict rule for one collection.
pub trait Dominance {
    type Local;
    type Remote;

    /// Whether the remote copy should overwrite the local one.
    fn pull_worthy(local: &Self::Local, remote: &Self::Remote) -> bool;

    /// Whether the local copy should overwrite the remote one.
    fn push_worthy(local: &Self::Local, remote: &Self::Remote) -> bool;
}

/// `true` when `left` was modified strictly after `right`; absent times are epoch.
pub fn strictly_newer(left: Option<DateTime<Utc>>, right: Option<DateTime<Utc>>) -> bool {
    modified_or_epoch(left) > modified_or_epoch(right)
}

/// Last writer wins on `updated_at`.
pub struct DepartmentRule;

impl Dominance for DepartmentRule {
    type Local = LocalDepartment;
    type Remote = RemoteDepartment;

    fn pull_worthy(local: &LocalDepartment, remote: &RemoteDepartment) -> bool {
        strictly_newer(remote.updated_at, local.updated_at)
    }

    fn push_worthy(local: &LocalDepartment, remote: &RemoteDepartment) -> bool {
        strictly_newer(local.updated_at, remote.updated_at)
    }
}

/// Last writer wins on `updated_at`.
pub struct EmployeeRule;

impl Dominance for EmployeeRule {
    type Local = LocalEmployee;
    type Remote = RemoteEmployee;

    fn pull_worthy(local: &LocalEmployee, remote: &RemoteEmployee) -> bool {
        strictly_newer(remote.fields.updated_at, local.fields.updated_at)
    }

    fn push_worthy(local: &LocalEmployee, remote: &RemoteEmployee) -> bool {
        strictly_newer(local.fields.updated_at, remote.fields.updated_at)
    }
}

/// Pull on newer remote edits; push only a check-out the remote copy lacks.
///
/// Kiosk check-outs happen locally, and legacy local rows carry no
/// `updated_at`, so a timestamp comparison alone would never push them.
pub struct AttendanceRule;

impl Dominance for AttendanceRule {
    type Local = LocalAttendance;
    type Remote = RemoteAttendance;

    fn pull_worthy(local: &LocalAttendance, remote: &RemoteAttendance) -> bool {
        strictly_newer(remote.fields.updated_at, local.fields.updated_at)
    }

    fn push_worthy(local: &LocalAttendance, remote: &RemoteAttendance) -> bool {
        local.fields.check_out.is_some() && remote.fields.check_out.is_none()
    }
}

/// Pull on newer remote edits; push on a status change or a newer local edit.
pub struct PayrollRule;

impl Dominance for PayrollRule {
    type Local = LocalPayroll;
    type Remote = RemotePayroll;

    fn pull_worthy(local: &LocalPayroll, remote: &RemotePayroll) -> bool {
        strictly_newer(remote.fields.updated_at, local.fields.updated_at)
    }

    fn push_worthy(local: &LocalPayroll, remote: &RemotePayroll) -> bool {
        local.fields.status != remote.fields.status
            || strictly_newer(local.fields.updated_at, remote.fields.updated_at)
    }
}

/// Last writer wins on `last_updated`.
pub struct ProfileRule;

impl Dominance for ProfileRule {
    type Local = Profile;
    type Remote = Profile;

    fn pull_worthy(local: &Profile, remote: &Profile) -> bool {
        strictly_newer(remote.fields.last_updated, local.fields.last_updated)
    }

    fn push_worthy(local: &Profile, remote: &Profile) -> bool {
        strictly_newer(local.fields.last_updated, remote.fields.last_updated)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;
    use crate::models::{AttendanceFields, CanonicalId, PayrollFields, PayrollStatus};

    fn at(hour: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2024, 1, 10, hour, 0, 0).unwrap())
    }

    fn departments(
        local: Option<DateTime<Utc>>,
        remote: Option<DateTime<Utc>>,
    ) -> (LocalDepartment, RemoteDepartment) {
        let id = CanonicalId::generate();
        (
            LocalDepartment {
                id: 1,
                name: "Engineering".to_string(),
                budget: 500_000.0,
                created_at: None,
                updated_at: local,
                remote_id: Some(id),
            },
            RemoteDepartment {
                id,
                name: "Engineering".to_string(),
                budget: 450_000.0,
                created_at: None,
                updated_at: remote,
            },
        )
    }

    fn attendance(
        local_check_out: Option<&str>,
        remote_check_out: Option<&str>,
    ) -> (LocalAttendance, RemoteAttendance) {
        let employee = CanonicalId::generate();
        let fields = AttendanceFields {
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            check_in: Some("08:00:00".to_string()),
            check_out: None,
            status: "Present".to_string(),
            notes: None,
            created_at: at(8),
            updated_at: at(8),
        };
        (
            LocalAttendance {
                id: 1,
                employee_id: 1,
                employee_canonical_id: employee,
                fields: AttendanceFields {
                    check_out: local_check_out.map(str::to_string),
                    ..fields.clone()
                },
            },
            RemoteAttendance {
                employee_id: employee,
                fields: AttendanceFields {
                    check_out: remote_check_out.map(str::to_string),
                    ..fields
                },
            },
        )
    }

    fn payroll(
        local: (PayrollStatus, Option<DateTime<Utc>>),
        remote: (PayrollStatus, Option<DateTime<Utc>>),
    ) -> (LocalPayroll, RemotePayroll) {
        let employee = CanonicalId::generate();
        let fields = PayrollFields {
            period_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            gross_pay: 21_000.0,
            deductions: 1_500.0,
            net_pay: 19_500.0,
            status: local.0,
            payment_date: None,
            breakdown: None,
            created_at: at(8),
            updated_at: local.1,
        };
        (
            LocalPayroll {
                id: 1,
                employee_id: 1,
                employee_canonical_id: employee,
                fields: fields.clone(),
            },
            RemotePayroll {
                employee_id: employee,
                fields: PayrollFields {
                    status: remote.0,
                    updated_at: remote.1,
                    ..fields
                },
            },
        )
    }

    #[test]
    fn last_writer_wins_in_both_directions() {
        let (local, remote) = departments(at(9), at(10));
        assert!(DepartmentRule::pull_worthy(&local, &remote));
        assert!(!DepartmentRule::push_worthy(&local, &remote));

        let (local, remote) = departments(at(11), at(10));
        assert!(!DepartmentRule::pull_worthy(&local, &remote));
        assert!(DepartmentRule::push_worthy(&local, &remote));
    }

    #[test]
    fn equal_timestamps_are_a_no_op() {
        let (local, remote) = departments(at(10), at(10));
        assert!(!DepartmentRule::pull_worthy(&local, &remote));
        assert!(!DepartmentRule::push_worthy(&local, &remote));

        let (local, remote) = departments(None, None);
        assert!(!DepartmentRule::pull_worthy(&local, &remote));
        assert!(!DepartmentRule::push_worthy(&local, &remote));
    }

    #[test]
    fn missing_local_timestamp_loses_to_any_remote_value() {
        let (local, remote) = departments(None, at(0));
        assert!(DepartmentRule::pull_worthy(&local, &remote));
        assert!(!DepartmentRule::push_worthy(&local, &remote));
    }

    #[test]
    fn attendance_pushes_only_a_missing_check_out() {
        let (local, remote) = attendance(None, None);
        assert!(!AttendanceRule::push_worthy(&local, &remote));

        let (local, remote) = attendance(Some("17:00:00"), None);
        assert!(AttendanceRule::push_worthy(&local, &remote));

        let (local, remote) = attendance(Some("17:00:00"), Some("16:30:00"));
        assert!(!AttendanceRule::push_worthy(&local, &remote));
        assert!(!AttendanceRule::pull_worthy(&local, &remote));
    }

    #[test]
    fn payroll_pushes_status_changes_and_newer_edits() {
        let (local, remote) = payroll(
            (PayrollStatus::Paid, at(9)),
            (PayrollStatus::Pending, at(9)),
        );
        assert!(PayrollRule::push_worthy(&local, &remote));

        let (local, remote) = payroll(
            (PayrollStatus::Pending, at(11)),
            (PayrollStatus::Pending, at(9)),
        );
        assert!(PayrollRule::push_worthy(&local, &remote));

        let (local, remote) = payroll(
            (PayrollStatus::Pending, at(9)),
            (PayrollStatus::Pending, at(9)),
        );
        assert!(!PayrollRule::push_worthy(&local, &remote));
        assert!(!PayrollRule::pull_worthy(&local, &remote));
    }

    #[test]
    fn employee_rule_compares_modified_times() {
        let employee = RemoteEmployee {
            id: CanonicalId::generate(),
            department_id: None,
            fields: crate::models::EmployeeFields {
                company_id: None,
                first_name: "Ana".to_string(),
                last_name: "Reyes".to_string(),
                email: "ana@example.com".to_string(),
                phone: None,
                position: "Engineer".to_string(),
                salary: 42_000.0,
                hire_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
                status: "Active".to_string(),
                pin_code: None,
                created_at: at(8),
                updated_at: at(12),
            },
        };
        let mut local = LocalEmployee {
            id: 1,
            canonical_id: Some(employee.id),
            department_id: None,
            fields: employee.fields.clone(),
        };
        local.fields.updated_at = at(9);

        assert!(EmployeeRule::pull_worthy(&local, &employee));
        assert!(!EmployeeRule::push_worthy(&local, &employee));
    }
}
