//! Database migrations

use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension};

/// Current schema version
const CURRENT_VERSION: i32 = 3;

/// Columns the replication engine relies on that older installs lack.
///
/// `ALTER TABLE ... ADD COLUMN` cannot carry `UNIQUE` or a non-constant
/// default, so uniqueness is enforced by indexes and legacy rows keep `NULL`
/// timestamps (treated as epoch during conflict resolution).
const SYNC_COLUMNS: [(&str, &str); 5] = [
    ("departments", "remote_id"),
    ("departments", "updated_at"),
    ("employees", "remote_id"),
    ("attendance", "updated_at"),
    ("payroll", "updated_at"),
];

/// Tables whose canonical ids older installs kept in `supabase_id`
const LEGACY_ID_TABLES: [&str; 2] = ["departments", "employees"];

/// Run all pending migrations
pub fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn)?;

    if version < 1 {
        migrate_v1(conn)?;
    }
    if version < 2 {
        migrate_v2(conn)?;
    }
    if version < 3 {
        migrate_v3(conn)?;
    }

    Ok(())
}

/// Get the current schema version
fn get_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    Ok(version)
}

fn run_statements(conn: &Connection, statements: &[&str], version: i32) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for stmt in statements {
        tx.execute(stmt, [])?;
    }
    tx.execute(
        "INSERT INTO schema_version (version) VALUES (?)",
        params![version],
    )?;
    tx.commit()?;

    tracing::info!("Migrated database to version {version}");
    Ok(())
}

/// Migration to version 1: Initial schema
///
/// Tables use `IF NOT EXISTS` so installs that predate version tracking keep
/// their data; version 2 then brings them up to date.
fn migrate_v1(conn: &Connection) -> Result<()> {
    let statements = [
        // Schema version tracking
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        "CREATE TABLE IF NOT EXISTS departments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            budget REAL NOT NULL,
            remote_id TEXT,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT DEFAULT CURRENT_TIMESTAMP
        )",
        "CREATE TABLE IF NOT EXISTS employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_id TEXT UNIQUE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT,
            position TEXT NOT NULL,
            department_id INTEGER REFERENCES departments(id) ON DELETE SET NULL,
            salary REAL NOT NULL,
            hire_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'Active',
            pin_code TEXT DEFAULT '1234',
            remote_id TEXT,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT DEFAULT CURRENT_TIMESTAMP
        )",
        "CREATE TABLE IF NOT EXISTS attendance (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            check_in TEXT,
            check_out TEXT,
            status TEXT NOT NULL DEFAULT 'Present',
            notes TEXT,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(employee_id, date)
        )",
        "CREATE TABLE IF NOT EXISTS payroll (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
            period_start TEXT NOT NULL,
            period_end TEXT NOT NULL,
            basic_salary REAL NOT NULL,
            allowances REAL DEFAULT 0,
            deductions REAL DEFAULT 0,
            net_salary REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'Pending',
            payment_date TEXT,
            cutoff_type TEXT DEFAULT 'Full Month',
            working_days INTEGER DEFAULT 24,
            days_present INTEGER DEFAULT 24,
            daily_rate REAL DEFAULT 0,
            breakdown TEXT,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(employee_id, period_start, period_end)
        )",
        "CREATE TABLE IF NOT EXISTS registration_credentials (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_name TEXT NOT NULL,
            company_email TEXT NOT NULL,
            company_address TEXT,
            company_contact TEXT,
            admin_name TEXT NOT NULL,
            admin_email TEXT NOT NULL UNIQUE,
            admin_password_hash TEXT NOT NULL,
            super_admin_password_hash TEXT NOT NULL,
            avatar TEXT,
            bio TEXT,
            theme_preference TEXT DEFAULT 'light',
            language TEXT DEFAULT 'en',
            is_registered INTEGER DEFAULT 0,
            license_key TEXT UNIQUE,
            registration_date TEXT DEFAULT CURRENT_TIMESTAMP,
            last_reset_date TEXT,
            last_updated TEXT DEFAULT CURRENT_TIMESTAMP
        )",
    ];

    run_statements(conn, &statements, 1)
}

/// Migration to version 2: sync columns and indexes
fn migrate_v2(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for (table, column) in SYNC_COLUMNS {
        if !has_column(&tx, table, column)? {
            tx.execute(&format!("ALTER TABLE {table} ADD COLUMN {column} TEXT"), [])?;
            tracing::info!("Added sync column {table}.{column}");
        }
    }
    tx.commit()?;

    let statements = [
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_departments_remote_id ON departments(remote_id)",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_employees_remote_id ON employees(remote_id)",
        "CREATE INDEX IF NOT EXISTS idx_employees_department_id ON employees(department_id)",
        "CREATE INDEX IF NOT EXISTS idx_attendance_employee_date ON attendance(employee_id, date)",
        "CREATE INDEX IF NOT EXISTS idx_payroll_employee_period ON payroll(employee_id, period_start, period_end)",
    ];

    run_statements(conn, &statements, 2)
}

/// Migration to version 3: adopt canonical ids stored under `supabase_id`
fn migrate_v3(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for table in LEGACY_ID_TABLES {
        if has_column(&tx, table, "supabase_id")? {
            let adopted = tx.execute(
                &format!(
                    "UPDATE {table} SET remote_id = trim(supabase_id)
                     WHERE remote_id IS NULL AND trim(COALESCE(supabase_id, '')) <> ''"
                ),
                [],
            )?;
            tracing::info!("Adopted {adopted} legacy canonical ids in {table}");
        }
    }
    tx.commit()?;

    run_statements(conn, &[], CURRENT_VERSION)
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let found = conn
        .query_row(
            &format!("SELECT 1 FROM pragma_table_info('{table}') WHERE name = ?"),
            params![column],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}
