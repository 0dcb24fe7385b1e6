//! Local store access for the replicated collections

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{Error, Result};
use crate::models::{
    AttendanceFields, AttendanceKey, CanonicalId, DepartmentChanges, EmployeeFields,
    LocalAttendance, LocalDepartment, LocalEmployee, LocalPayroll, PayrollFields, PayrollKey,
    Profile, ProfileFields, RemoteDepartment, RemoteEmployee,
};
use crate::util::{format_timestamp, parse_timestamp};

/// Row-level operations the replication engine needs from the local store.
///
/// Calls are synchronous; every write commits on its own.
pub trait LocalStore {
    /// List all departments
    fn list_departments(&self) -> Result<Vec<LocalDepartment>>;

    /// Insert a department mirrored from the remote store, returning its local id
    fn insert_department(&self, department: &RemoteDepartment) -> Result<i64>;

    /// Update a department's mutable fields by name
    fn update_department(&self, name: &str, changes: &DepartmentChanges) -> Result<()>;

    /// Record the remote canonical id of a local department
    fn set_department_remote_id(&self, local_id: i64, remote_id: &CanonicalId) -> Result<()>;

    /// Get a department by local id
    fn find_department(&self, local_id: i64) -> Result<Option<LocalDepartment>>;

    /// Resolve a department's local id from its remote canonical id
    fn find_department_id_by_remote_id(&self, remote_id: &CanonicalId) -> Result<Option<i64>>;

    /// List all employees
    fn list_employees(&self) -> Result<Vec<LocalEmployee>>;

    /// Insert an employee mirrored from the remote store, returning its local id
    fn insert_employee(&self, employee: &RemoteEmployee, department_id: Option<i64>)
        -> Result<i64>;

    /// Update an employee's mutable fields by canonical id
    fn update_employee(
        &self,
        canonical_id: &CanonicalId,
        fields: &EmployeeFields,
        department_id: Option<i64>,
    ) -> Result<()>;

    /// Persist a newly generated canonical id for an employee that has none
    fn assign_employee_canonical_id(&self, local_id: i64, canonical_id: &CanonicalId)
        -> Result<()>;

    /// Resolve an employee's local id from its canonical id
    fn find_employee_id(&self, canonical_id: &CanonicalId) -> Result<Option<i64>>;

    /// List attendance entries whose employee has a canonical id
    fn list_attendance(&self) -> Result<Vec<LocalAttendance>>;

    /// Insert an attendance entry for a local employee
    fn insert_attendance(&self, employee_id: i64, fields: &AttendanceFields) -> Result<i64>;

    /// Update an attendance entry's mutable fields by natural key
    fn update_attendance(&self, key: &AttendanceKey, fields: &AttendanceFields) -> Result<()>;

    /// List payroll records whose employee has a canonical id
    fn list_payroll(&self) -> Result<Vec<LocalPayroll>>;

    /// Insert a payroll record for a local employee
    fn insert_payroll(&self, employee_id: i64, fields: &PayrollFields) -> Result<i64>;

    /// Update a payroll record's mutable fields by natural key
    fn update_payroll(&self, key: &PayrollKey, fields: &PayrollFields) -> Result<()>;

    /// Load the registered administrator profile, if registration has completed
    fn load_profile(&self) -> Result<Option<Profile>>;

    /// Update the profile's shared fields by admin email
    fn update_profile(&self, profile: &Profile) -> Result<()>;
}

/// `SQLite` implementation of `LocalStore`
pub struct SqliteLocalStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteLocalStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_department(row: &Row<'_>) -> rusqlite::Result<LocalDepartment> {
        Ok(LocalDepartment {
            id: row.get(0)?,
            name: row.get(1)?,
            budget: row.get(2)?,
            created_at: timestamp(row, 3)?,
            updated_at: timestamp(row, 4)?,
            remote_id: row.get(5)?,
        })
    }

    fn parse_employee(row: &Row<'_>) -> rusqlite::Result<LocalEmployee> {
        Ok(LocalEmployee {
            id: row.get(0)?,
            canonical_id: row.get(1)?,
            department_id: row.get(2)?,
            fields: EmployeeFields {
                company_id: row.get(3)?,
                first_name: row.get(4)?,
                last_name: row.get(5)?,
                email: row.get(6)?,
                phone: row.get(7)?,
                position: row.get(8)?,
                salary: row.get(9)?,
                hire_date: row.get(10)?,
                status: row.get(11)?,
                pin_code: row.get(12)?,
                created_at: timestamp(row, 13)?,
                updated_at: timestamp(row, 14)?,
            },
        })
    }

    fn parse_attendance(row: &Row<'_>) -> rusqlite::Result<LocalAttendance> {
        Ok(LocalAttendance {
            id: row.get(0)?,
            employee_id: row.get(1)?,
            employee_canonical_id: row.get(2)?,
            fields: AttendanceFields {
                date: row.get(3)?,
                check_in: row.get(4)?,
                check_out: row.get(5)?,
                status: row.get(6)?,
                notes: row.get(7)?,
                created_at: timestamp(row, 8)?,
                updated_at: timestamp(row, 9)?,
            },
        })
    }

    fn parse_payroll(row: &Row<'_>) -> rusqlite::Result<LocalPayroll> {
        Ok(LocalPayroll {
            id: row.get(0)?,
            employee_id: row.get(1)?,
            employee_canonical_id: row.get(2)?,
            fields: PayrollFields {
                period_start: row.get(3)?,
                period_end: row.get(4)?,
                gross_pay: row.get(5)?,
                deductions: row.get::<_, Option<f64>>(6)?.unwrap_or_default(),
                net_pay: row.get(7)?,
                status: row.get(8)?,
                payment_date: row.get(9)?,
                breakdown: row.get(10)?,
                created_at: timestamp(row, 11)?,
                updated_at: timestamp(row, 12)?,
            },
        })
    }

    fn parse_profile(row: &Row<'_>) -> rusqlite::Result<Profile> {
        Ok(Profile {
            admin_email: row.get(0)?,
            fields: ProfileFields {
                company_name: row.get(1)?,
                company_email: row.get(2)?,
                admin_name: row.get(3)?,
                avatar: row.get(4)?,
                bio: row.get(5)?,
                theme_preference: row.get(6)?,
                language: row.get(7)?,
                last_updated: timestamp(row, 8)?,
            },
        })
    }
}

impl LocalStore for SqliteLocalStore<'_> {
    fn list_departments(&self) -> Result<Vec<LocalDepartment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, budget, created_at, updated_at, remote_id
             FROM departments
             ORDER BY id",
        )?;

        let departments = stmt
            .query_map([], Self::parse_department)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(departments)
    }

    fn insert_department(&self, department: &RemoteDepartment) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO departments (name, budget, created_at, updated_at, remote_id)
             VALUES (?, ?, ?, ?, ?)",
            params![
                department.name,
                department.budget,
                stored(department.created_at.as_ref()),
                stored(department.updated_at.as_ref()),
                department.id
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_department(&self, name: &str, changes: &DepartmentChanges) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE departments SET budget = ?, updated_at = ? WHERE name = ?",
            params![changes.budget, stored(changes.updated_at.as_ref()), name],
        )?;

        expect_row(rows, || format!("department '{name}'"))
    }

    fn set_department_remote_id(&self, local_id: i64, remote_id: &CanonicalId) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE departments SET remote_id = ? WHERE id = ?",
            params![remote_id, local_id],
        )?;

        expect_row(rows, || format!("department #{local_id}"))
    }

    fn find_department(&self, local_id: i64) -> Result<Option<LocalDepartment>> {
        let department = self
            .conn
            .query_row(
                "SELECT id, name, budget, created_at, updated_at, remote_id
                 FROM departments
                 WHERE id = ?",
                params![local_id],
                Self::parse_department,
            )
            .optional()?;

        Ok(department)
    }

    fn find_department_id_by_remote_id(&self, remote_id: &CanonicalId) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM departments WHERE remote_id = ?",
                params![remote_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(id)
    }

    fn list_employees(&self) -> Result<Vec<LocalEmployee>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, remote_id, department_id, company_id, first_name, last_name, email,
                    phone, position, salary, hire_date, status, pin_code, created_at, updated_at
             FROM employees
             ORDER BY id",
        )?;

        let employees = stmt
            .query_map([], Self::parse_employee)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(employees)
    }

    fn insert_employee(
        &self,
        employee: &RemoteEmployee,
        department_id: Option<i64>,
    ) -> Result<i64> {
        let fields = &employee.fields;
        self.conn.execute(
            "INSERT INTO employees (
                company_id, first_name, last_name, email, phone, position, department_id,
                salary, hire_date, status, pin_code, remote_id, created_at, updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                fields.company_id,
                fields.first_name,
                fields.last_name,
                fields.email,
                fields.phone,
                fields.position,
                department_id,
                fields.salary,
                fields.hire_date,
                fields.status,
                fields.pin_code,
                employee.id,
                stored(fields.created_at.as_ref()),
                stored(fields.updated_at.as_ref())
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_employee(
        &self,
        canonical_id: &CanonicalId,
        fields: &EmployeeFields,
        department_id: Option<i64>,
    ) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE employees SET
                company_id = ?, first_name = ?, last_name = ?, email = ?, phone = ?,
                position = ?, department_id = ?, salary = ?, hire_date = ?, status = ?,
                pin_code = ?, updated_at = ?
             WHERE remote_id = ?",
            params![
                fields.company_id,
                fields.first_name,
                fields.last_name,
                fields.email,
                fields.phone,
                fields.position,
                department_id,
                fields.salary,
                fields.hire_date,
                fields.status,
                fields.pin_code,
                stored(fields.updated_at.as_ref()),
                canonical_id
            ],
        )?;

        expect_row(rows, || format!("employee {canonical_id}"))
    }

    fn assign_employee_canonical_id(
        &self,
        local_id: i64,
        canonical_id: &CanonicalId,
    ) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE employees SET remote_id = ? WHERE id = ? AND remote_id IS NULL",
            params![canonical_id, local_id],
        )?;

        expect_row(rows, || format!("unmapped employee #{local_id}"))
    }

    fn find_employee_id(&self, canonical_id: &CanonicalId) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM employees WHERE remote_id = ?",
                params![canonical_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(id)
    }

    fn list_attendance(&self) -> Result<Vec<LocalAttendance>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.employee_id, e.remote_id, a.date, a.check_in, a.check_out,
                    a.status, a.notes, a.created_at, a.updated_at
             FROM attendance a
             JOIN employees e ON a.employee_id = e.id
             WHERE e.remote_id IS NOT NULL
             ORDER BY a.id",
        )?;

        let entries = stmt
            .query_map([], Self::parse_attendance)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(entries)
    }

    fn insert_attendance(&self, employee_id: i64, fields: &AttendanceFields) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO attendance (
                employee_id, date, check_in, check_out, status, notes, created_at, updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                employee_id,
                fields.date,
                fields.check_in,
                fields.check_out,
                fields.status,
                fields.notes,
                stored(fields.created_at.as_ref()),
                stored(fields.updated_at.as_ref())
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_attendance(&self, key: &AttendanceKey, fields: &AttendanceFields) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE attendance SET check_in = ?, check_out = ?, status = ?, notes = ?, updated_at = ?
             WHERE employee_id = (SELECT id FROM employees WHERE remote_id = ?) AND date = ?",
            params![
                fields.check_in,
                fields.check_out,
                fields.status,
                fields.notes,
                stored(fields.updated_at.as_ref()),
                key.employee,
                key.date
            ],
        )?;

        expect_row(rows, || format!("attendance {key}"))
    }

    fn list_payroll(&self) -> Result<Vec<LocalPayroll>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.employee_id, e.remote_id, p.period_start, p.period_end,
                    p.basic_salary, p.deductions, p.net_salary, p.status, p.payment_date,
                    p.breakdown, p.created_at, p.updated_at
             FROM payroll p
             JOIN employees e ON p.employee_id = e.id
             WHERE e.remote_id IS NOT NULL
             ORDER BY p.id",
        )?;

        let records = stmt
            .query_map([], Self::parse_payroll)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    fn insert_payroll(&self, employee_id: i64, fields: &PayrollFields) -> Result<i64> {
        // Local-only columns (allowances, cutoff_type, working_days, ...) keep their defaults
        self.conn.execute(
            "INSERT INTO payroll (
                employee_id, period_start, period_end, basic_salary, deductions, net_salary,
                status, payment_date, breakdown, created_at, updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                employee_id,
                fields.period_start,
                fields.period_end,
                fields.gross_pay,
                fields.deductions,
                fields.net_pay,
                fields.status,
                fields.payment_date,
                fields.breakdown,
                stored(fields.created_at.as_ref()),
                stored(fields.updated_at.as_ref())
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_payroll(&self, key: &PayrollKey, fields: &PayrollFields) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE payroll SET
                basic_salary = ?, deductions = ?, net_salary = ?, status = ?, payment_date = ?,
                breakdown = ?, updated_at = ?
             WHERE employee_id = (SELECT id FROM employees WHERE remote_id = ?)
               AND period_start = ? AND period_end = ?",
            params![
                fields.gross_pay,
                fields.deductions,
                fields.net_pay,
                fields.status,
                fields.payment_date,
                fields.breakdown,
                stored(fields.updated_at.as_ref()),
                key.employee,
                key.period_start,
                key.period_end
            ],
        )?;

        expect_row(rows, || format!("payroll {key}"))
    }

    fn load_profile(&self) -> Result<Option<Profile>> {
        let profile = self
            .conn
            .query_row(
                "SELECT admin_email, company_name, company_email, admin_name, avatar, bio,
                        theme_preference, language, last_updated
                 FROM registration_credentials
                 WHERE is_registered = 1
                 ORDER BY id
                 LIMIT 1",
                [],
                Self::parse_profile,
            )
            .optional()?;

        Ok(profile)
    }

    fn update_profile(&self, profile: &Profile) -> Result<()> {
        let fields = &profile.fields;
        let rows = self.conn.execute(
            "UPDATE registration_credentials SET
                company_name = ?, company_email = ?, admin_name = ?, avatar = ?, bio = ?,
                theme_preference = ?, language = ?, last_updated = ?
             WHERE admin_email = ?",
            params![
                fields.company_name,
                fields.company_email,
                fields.admin_name,
                fields.avatar,
                fields.bio,
                fields.theme_preference,
                fields.language,
                stored(fields.last_updated.as_ref()),
                profile.admin_email
            ],
        )?;

        expect_row(rows, || format!("profile {}", profile.admin_email))
    }
}

/// Read a timestamp column; unparseable legacy values read as absent.
fn timestamp(row: &Row<'_>, index: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    Ok(row
        .get::<_, Option<String>>(index)?
        .as_deref()
        .and_then(parse_timestamp))
}

fn stored(value: Option<&DateTime<Utc>>) -> Option<String> {
    value.map(format_timestamp)
}

fn expect_row(rows: usize, describe: impl FnOnce() -> String) -> Result<()> {
    if rows == 0 {
        Err(Error::NotFound(describe()))
    } else {
        Ok(())
    }
}
