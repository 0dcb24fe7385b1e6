//! Data models for Staffdesk
//!
//! Every collection has a local shape (keyed by local integer ids) and a
//! remote shape (keyed by canonical ids). Attributes that are identical in
//! both stores live in a shared `*Fields` struct.

mod attendance;
mod department;
mod employee;
mod ids;
mod payroll;
mod profile;

pub use attendance::{AttendanceFields, AttendanceKey, LocalAttendance, RemoteAttendance};
pub use department::{DepartmentChanges, LocalDepartment, NewRemoteDepartment, RemoteDepartment};
pub use employee::{EmployeeFields, LocalEmployee, RemoteEmployee};
pub use ids::CanonicalId;
pub use payroll::{LocalPayroll, PayrollFields, PayrollKey, PayrollStatus, RemotePayroll};
pub use profile::{Profile, ProfileFields};
