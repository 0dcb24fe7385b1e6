//! In-memory remote store for engine tests.
//!
//! Enforces the same uniqueness and foreign-key constraints as the hosted
//! schema, counts writes, and can be told to fail listings or writes per
//! collection.

use std::collections::HashSet;
use std::sync::Mutex;

use super::{RemoteError, RemoteResult, RemoteStore};
use crate::models::{
    CanonicalId, DepartmentChanges, NewRemoteDepartment, Profile, RemoteAttendance,
    RemoteDepartment, RemoteEmployee, RemotePayroll,
};
use crate::sync::Collection;

#[derive(Debug)]
struct MemoryState {
    departments: Vec<RemoteDepartment>,
    employees: Vec<RemoteEmployee>,
    attendance: Vec<RemoteAttendance>,
    payroll: Vec<RemotePayroll>,
    /// `None` when the profile table does not exist
    profiles: Option<Vec<Profile>>,
    failing_lists: HashSet<Collection>,
    failing_writes: HashSet<Collection>,
    failing_rows: HashSet<(Collection, String)>,
    writes: usize,
    schema_calls: usize,
    access_token: Option<String>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            departments: Vec::new(),
            employees: Vec::new(),
            attendance: Vec::new(),
            payroll: Vec::new(),
            profiles: Some(Vec::new()),
            failing_lists: HashSet::new(),
            failing_writes: HashSet::new(),
            failing_rows: HashSet::new(),
            writes: 0,
            schema_calls: 0,
            access_token: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    state: Mutex<MemoryState>,
}

fn api_error(status: u16, code: &str, message: impl Into<String>) -> RemoteError {
    RemoteError::Api {
        status,
        code: Some(code.to_string()),
        message: message.into(),
    }
}

fn unique_violation(what: impl std::fmt::Display) -> RemoteError {
    api_error(409, "23505", format!("duplicate key value violates unique constraint: {what}"))
}

fn foreign_key_violation(what: impl std::fmt::Display) -> RemoteError {
    api_error(409, "23503", format!("insert or update violates foreign key constraint: {what}"))
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> T {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut state)
    }

    fn list<T: Clone>(
        &self,
        collection: Collection,
        rows: impl FnOnce(&MemoryState) -> Vec<T>,
    ) -> RemoteResult<Vec<T>> {
        self.with_state(|state| {
            if state.failing_lists.contains(&collection) {
                return Err(api_error(503, "PGRST000", format!("{collection} unavailable")));
            }
            Ok(rows(state))
        })
    }

    fn write<T>(
        &self,
        collection: Collection,
        key: impl std::fmt::Display,
        apply: impl FnOnce(&mut MemoryState) -> RemoteResult<T>,
    ) -> RemoteResult<T> {
        let key = key.to_string();
        self.with_state(|state| {
            if state.failing_writes.contains(&collection)
                || state.failing_rows.contains(&(collection, key.clone()))
            {
                return Err(api_error(500, "XX000", format!("{collection} {key} write rejected")));
            }
            let result = apply(state)?;
            state.writes += 1;
            Ok(result)
        })
    }

    pub fn fail_listing(&self, collection: Collection) {
        self.with_state(|state| state.failing_lists.insert(collection));
    }

    pub fn fail_writes(&self, collection: Collection) {
        self.with_state(|state| state.failing_writes.insert(collection));
    }

    /// Reject writes naming `key`: department name or id, employee id,
    /// natural key for attendance and payroll, admin email for profiles.
    pub fn fail_row_writes(&self, collection: Collection, key: impl std::fmt::Display) {
        self.with_state(|state| state.failing_rows.insert((collection, key.to_string())));
    }

    pub fn drop_profile_table(&self) {
        self.with_state(|state| state.profiles = None);
    }

    pub fn write_count(&self) -> usize {
        self.with_state(|state| state.writes)
    }

    pub fn schema_calls(&self) -> usize {
        self.with_state(|state| state.schema_calls)
    }

    pub fn access_token(&self) -> Option<String> {
        self.with_state(|state| state.access_token.clone())
    }

    pub fn departments(&self) -> Vec<RemoteDepartment> {
        self.with_state(|state| state.departments.clone())
    }

    pub fn employees(&self) -> Vec<RemoteEmployee> {
        self.with_state(|state| state.employees.clone())
    }

    pub fn attendance(&self) -> Vec<RemoteAttendance> {
        self.with_state(|state| state.attendance.clone())
    }

    pub fn payroll(&self) -> Vec<RemotePayroll> {
        self.with_state(|state| state.payroll.clone())
    }

    pub fn profiles(&self) -> Vec<Profile> {
        self.with_state(|state| state.profiles.clone().unwrap_or_default())
    }

    /// Seed rows directly, bypassing the write counter.
    pub fn seed_department(&self, department: RemoteDepartment) {
        self.with_state(|state| state.departments.push(department));
    }

    pub fn seed_employee(&self, employee: RemoteEmployee) {
        self.with_state(|state| state.employees.push(employee));
    }

    pub fn seed_attendance(&self, entry: RemoteAttendance) {
        self.with_state(|state| state.attendance.push(entry));
    }

    pub fn seed_payroll(&self, record: RemotePayroll) {
        self.with_state(|state| state.payroll.push(record));
    }

    pub fn seed_profile(&self, profile: Profile) {
        self.with_state(|state| state.profiles.get_or_insert_with(Vec::new).push(profile));
    }
}

fn check_employee_exists(state: &MemoryState, id: &CanonicalId) -> RemoteResult<()> {
    if state.employees.iter().any(|employee| employee.id == *id) {
        Ok(())
    } else {
        Err(foreign_key_violation(format!("employee {id}")))
    }
}

fn check_department_reference(state: &MemoryState, id: Option<&CanonicalId>) -> RemoteResult<()> {
    match id {
        Some(id) if !state.departments.iter().any(|department| department.id == *id) => {
            Err(foreign_key_violation(format!("department {id}")))
        }
        _ => Ok(()),
    }
}

fn profiles_mut(state: &mut MemoryState) -> RemoteResult<&mut Vec<Profile>> {
    state.profiles.as_mut().ok_or_else(|| {
        api_error(
            404,
            "PGRST205",
            "Could not find the table 'public.registration_credentials' in the schema cache",
        )
    })
}

impl RemoteStore for MemoryRemoteStore {
    async fn authorize(&self, access_token: &str) {
        self.with_state(|state| state.access_token = Some(access_token.to_string()));
    }

    async fn provision_schema(&self) -> RemoteResult<()> {
        self.with_state(|state| state.schema_calls += 1);
        Ok(())
    }

    async fn list_departments(&self) -> RemoteResult<Vec<RemoteDepartment>> {
        self.list(Collection::Departments, |state| state.departments.clone())
    }

    async fn insert_department(
        &self,
        department: &NewRemoteDepartment,
    ) -> RemoteResult<RemoteDepartment> {
        self.write(Collection::Departments, &department.name, |state| {
            if state
                .departments
                .iter()
                .any(|existing| existing.name == department.name)
            {
                return Err(unique_violation(format!("departments.name {}", department.name)));
            }
            let stored = RemoteDepartment {
                id: CanonicalId::generate(),
                name: department.name.clone(),
                budget: department.budget,
                created_at: department.created_at,
                updated_at: department.updated_at,
            };
            state.departments.push(stored.clone());
            Ok(stored)
        })
    }

    async fn update_department(
        &self,
        id: &CanonicalId,
        changes: &DepartmentChanges,
    ) -> RemoteResult<()> {
        self.write(Collection::Departments, id, |state| {
            let department = state
                .departments
                .iter_mut()
                .find(|department| department.id == *id)
                .ok_or_else(|| RemoteError::NotFound(format!("departments (id={id})")))?;
            department.budget = changes.budget;
            department.updated_at = changes.updated_at;
            Ok(())
        })
    }

    async fn list_employees(&self) -> RemoteResult<Vec<RemoteEmployee>> {
        self.list(Collection::Employees, |state| state.employees.clone())
    }

    async fn insert_employee(&self, employee: &RemoteEmployee) -> RemoteResult<()> {
        self.write(Collection::Employees, employee.id, |state| {
            if state.employees.iter().any(|existing| {
                existing.id == employee.id || existing.fields.email == employee.fields.email
            }) {
                return Err(unique_violation(format!("employees {}", employee.id)));
            }
            check_department_reference(state, employee.department_id.as_ref())?;
            state.employees.push(employee.clone());
            Ok(())
        })
    }

    async fn update_employee(&self, employee: &RemoteEmployee) -> RemoteResult<()> {
        self.write(Collection::Employees, employee.id, |state| {
            check_department_reference(state, employee.department_id.as_ref())?;
            let existing = state
                .employees
                .iter_mut()
                .find(|existing| existing.id == employee.id)
                .ok_or_else(|| RemoteError::NotFound(format!("employees (id={})", employee.id)))?;
            *existing = employee.clone();
            Ok(())
        })
    }

    async fn list_attendance(&self) -> RemoteResult<Vec<RemoteAttendance>> {
        self.list(Collection::Attendance, |state| state.attendance.clone())
    }

    async fn insert_attendance(&self, entry: &RemoteAttendance) -> RemoteResult<()> {
        self.write(Collection::Attendance, entry.key(), |state| {
            if state.attendance.iter().any(|existing| existing.key() == entry.key()) {
                return Err(unique_violation(format!("attendance {}", entry.key())));
            }
            check_employee_exists(state, &entry.employee_id)?;
            state.attendance.push(entry.clone());
            Ok(())
        })
    }

    async fn update_attendance(&self, entry: &RemoteAttendance) -> RemoteResult<()> {
        self.write(Collection::Attendance, entry.key(), |state| {
            let existing = state
                .attendance
                .iter_mut()
                .find(|existing| existing.key() == entry.key())
                .ok_or_else(|| RemoteError::NotFound(format!("attendance {}", entry.key())))?;
            *existing = entry.clone();
            Ok(())
        })
    }

    async fn list_payroll(&self) -> RemoteResult<Vec<RemotePayroll>> {
        self.list(Collection::Payroll, |state| state.payroll.clone())
    }

    async fn insert_payroll(&self, record: &RemotePayroll) -> RemoteResult<()> {
        self.write(Collection::Payroll, record.key(), |state| {
            if state.payroll.iter().any(|existing| existing.key() == record.key()) {
                return Err(unique_violation(format!("payroll {}", record.key())));
            }
            check_employee_exists(state, &record.employee_id)?;
            state.payroll.push(record.clone());
            Ok(())
        })
    }

    async fn update_payroll(&self, record: &RemotePayroll) -> RemoteResult<()> {
        self.write(Collection::Payroll, record.key(), |state| {
            let existing = state
                .payroll
                .iter_mut()
                .find(|existing| existing.key() == record.key())
                .ok_or_else(|| RemoteError::NotFound(format!("payroll {}", record.key())))?;
            *existing = record.clone();
            Ok(())
        })
    }

    async fn find_profile(&self, admin_email: &str) -> RemoteResult<Option<Profile>> {
        self.with_state(|state| {
            if state.failing_lists.contains(&Collection::Profile) {
                return Err(api_error(503, "PGRST000", "profile unavailable"));
            }
            Ok(profiles_mut(state)?
                .iter()
                .find(|profile| profile.admin_email == admin_email)
                .cloned())
        })
    }

    async fn insert_profile(&self, profile: &Profile) -> RemoteResult<()> {
        self.write(Collection::Profile, &profile.admin_email, |state| {
            let profiles = profiles_mut(state)?;
            if profiles
                .iter()
                .any(|existing| existing.admin_email == profile.admin_email)
            {
                return Err(unique_violation(format!("profile {}", profile.admin_email)));
            }
            profiles.push(profile.clone());
            Ok(())
        })
    }

    async fn update_profile(&self, profile: &Profile) -> RemoteResult<()> {
        self.write(Collection::Profile, &profile.admin_email, |state| {
            let existing = profiles_mut(state)?
                .iter_mut()
                .find(|existing| existing.admin_email == profile.admin_email)
                .ok_or_else(|| RemoteError::NotFound(format!("profile {}", profile.admin_email)))?;
            *existing = profile.clone();
            Ok(())
        })
    }
}
