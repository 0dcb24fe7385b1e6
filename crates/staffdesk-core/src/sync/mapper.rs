//! Bridges local integer ids and remote canonical ids.

use std::collections::HashSet;

use crate::db::LocalStore;
use crate::error::Result;
use crate::models::{CanonicalId, LocalEmployee};
use crate::remote::RemoteStore;

/// Identifier correspondence for one sync cycle.
///
/// Holds what the cycle has learned about the remote store so dependent
/// collections can check references without refetching.
#[derive(Debug, Default)]
pub struct IdentifierMapper {
    remote_units: Option<HashSet<CanonicalId>>,
    remote_people: Option<HashSet<CanonicalId>>,
}

impl IdentifierMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical id of a local employee, generating and persisting one first
    /// when the row has none.
    pub fn ensure_employee_id<L: LocalStore>(
        &self,
        local: &L,
        employee: &LocalEmployee,
    ) -> Result<CanonicalId> {
        if let Some(id) = employee.canonical_id {
            return Ok(id);
        }

        let id = CanonicalId::generate();
        local.assign_employee_canonical_id(employee.id, &id)?;
        tracing::info!(
            "Assigned canonical id {id} to employee {}",
            employee.fields.label()
        );
        Ok(id)
    }

    /// Local row id of the employee with this canonical id.
    pub fn local_employee<L: LocalStore>(
        &self,
        local: &L,
        canonical_id: &CanonicalId,
    ) -> Result<Option<i64>> {
        local.find_employee_id(canonical_id)
    }

    /// Translate a local department reference for an outbound payload.
    ///
    /// Returns `None` (and warns) when the department is missing locally, not
    /// yet linked, or not present in the remote store.
    pub fn unit_to_remote<L: LocalStore>(
        &self,
        local: &L,
        department_id: Option<i64>,
        subject: &str,
    ) -> Result<Option<CanonicalId>> {
        let Some(department_id) = department_id else {
            return Ok(None);
        };

        let Some(department) = local.find_department(department_id)? else {
            tracing::warn!(
                "{subject} references missing local department #{department_id}; sending no department"
            );
            return Ok(None);
        };

        let Some(remote_id) = department.remote_id else {
            tracing::warn!(
                "{subject} references department '{}' which is not linked to the remote store; sending no department",
                department.name
            );
            return Ok(None);
        };

        if let Some(units) = &self.remote_units {
            if !units.contains(&remote_id) {
                tracing::warn!(
                    "{subject} references department '{}' ({remote_id}) which does not exist remotely; sending no department",
                    department.name
                );
                return Ok(None);
            }
        }

        Ok(Some(remote_id))
    }

    /// Translate a remote department reference for an inbound row.
    pub fn unit_to_local<L: LocalStore>(
        &self,
        local: &L,
        department_id: Option<&CanonicalId>,
        subject: &str,
    ) -> Result<Option<i64>> {
        let Some(remote_id) = department_id else {
            return Ok(None);
        };

        let local_id = local.find_department_id_by_remote_id(remote_id)?;
        if local_id.is_none() {
            tracing::warn!(
                "{subject} references remote department {remote_id} which is not present locally; storing no department"
            );
        }
        Ok(local_id)
    }

    /// Record the remote canonical id of a local department.
    pub fn link_department<L: LocalStore>(
        &mut self,
        local: &L,
        local_id: i64,
        remote_id: &CanonicalId,
    ) -> Result<()> {
        local.set_department_remote_id(local_id, remote_id)?;
        self.remote_units
            .get_or_insert_with(HashSet::new)
            .insert(*remote_id);
        tracing::debug!("Linked local department #{local_id} to {remote_id}");
        Ok(())
    }

    pub fn set_remote_units(&mut self, ids: impl IntoIterator<Item = CanonicalId>) {
        self.remote_units = Some(ids.into_iter().collect());
    }

    pub fn set_remote_people(&mut self, ids: impl IntoIterator<Item = CanonicalId>) {
        self.remote_people = Some(ids.into_iter().collect());
    }

    /// Note an employee that now exists remotely.
    pub fn add_remote_person(&mut self, id: CanonicalId) {
        self.remote_people
            .get_or_insert_with(HashSet::new)
            .insert(id);
    }

    /// Employees known to exist remotely, fetched if no earlier phase
    /// recorded them this cycle.
    pub async fn remote_people<R: RemoteStore>(
        &mut self,
        remote: &R,
    ) -> Result<&HashSet<CanonicalId>> {
        if self.remote_people.is_none() {
            let employees = remote.list_employees().await?;
            self.set_remote_people(employees.into_iter().map(|employee| employee.id));
        }
        Ok(self.remote_people.get_or_insert_with(HashSet::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, SqliteLocalStore};
    use crate::remote::memory::MemoryRemoteStore;

    fn insert_department(db: &Database, name: &str, remote_id: Option<CanonicalId>) -> i64 {
        db.connection()
            .execute(
                "INSERT INTO departments (name, budget, remote_id) VALUES (?, 1000, ?)",
                rusqlite::params![name, remote_id],
            )
            .unwrap();
        db.connection().last_insert_rowid()
    }

    #[test]
    fn ensure_employee_id_persists_before_returning() {
        let db = Database::open_in_memory().unwrap();
        db.connection()
            .execute(
                "INSERT INTO employees (first_name, last_name, email, position, salary, hire_date)
                 VALUES ('Ana', 'Reyes', 'ana@example.com', 'Engineer', 42000, '2023-06-01')",
                [],
            )
            .unwrap();
        let store = SqliteLocalStore::new(db.connection());
        let mapper = IdentifierMapper::new();

        let employee = store.list_employees().unwrap().remove(0);
        let id = mapper.ensure_employee_id(&store, &employee).unwrap();
        assert_eq!(store.find_employee_id(&id).unwrap(), Some(employee.id));

        let employee = store.list_employees().unwrap().remove(0);
        assert_eq!(mapper.ensure_employee_id(&store, &employee).unwrap(), id);
    }

    #[test]
    fn unresolvable_units_translate_to_none() {
        let db = Database::open_in_memory().unwrap();
        let store = SqliteLocalStore::new(db.connection());
        let linked_id = CanonicalId::generate();
        let stale_id = CanonicalId::generate();
        let linked = insert_department(&db, "Engineering", Some(linked_id));
        let unlinked = insert_department(&db, "Finance", None);
        let stale = insert_department(&db, "Legal", Some(stale_id));

        let mut mapper = IdentifierMapper::new();
        mapper.set_remote_units([linked_id]);

        assert_eq!(
            mapper.unit_to_remote(&store, Some(linked), "test").unwrap(),
            Some(linked_id)
        );
        assert_eq!(mapper.unit_to_remote(&store, Some(unlinked), "test").unwrap(), None);
        assert_eq!(mapper.unit_to_remote(&store, Some(stale), "test").unwrap(), None);
        assert_eq!(mapper.unit_to_remote(&store, Some(999), "test").unwrap(), None);
        assert_eq!(mapper.unit_to_remote(&store, None, "test").unwrap(), None);

        assert_eq!(
            mapper.unit_to_local(&store, Some(&linked_id), "test").unwrap(),
            Some(linked)
        );
        assert_eq!(
            mapper
                .unit_to_local(&store, Some(&CanonicalId::generate()), "test")
                .unwrap(),
            None
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn remote_people_are_fetched_once() {
        let remote = MemoryRemoteStore::new();
        let mut mapper = IdentifierMapper::new();
        assert!(mapper.remote_people(&remote).await.unwrap().is_empty());

        let id = CanonicalId::generate();
        mapper.add_remote_person(id);
        assert!(mapper.remote_people(&remote).await.unwrap().contains(&id));
    }
}
