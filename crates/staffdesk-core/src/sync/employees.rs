//! Employee replication, keyed by canonical id.

use std::collections::HashMap;

use super::dominance::{Dominance, EmployeeRule};
use super::{Collection, CollectionStats, IdentifierMapper};
use crate::db::LocalStore;
use crate::error::Result;
use crate::models::{CanonicalId, LocalEmployee, RemoteEmployee};
use crate::remote::RemoteStore;

const COLLECTION: Collection = Collection::Employees;

enum Write {
    Insert,
    Update,
}

pub(super) async fn sync<L: LocalStore, R: RemoteStore>(
    local: &L,
    remote: &R,
    mapper: &mut IdentifierMapper,
) -> Result<CollectionStats> {
    let mut stats = CollectionStats::default();

    let remote_rows = remote.list_employees().await?;
    let remote_units = remote.list_departments().await?;
    mapper.set_remote_units(remote_units.into_iter().map(|department| department.id));
    mapper.set_remote_people(remote_rows.iter().map(|employee| employee.id));

    // Every local employee gets its canonical id before anything is written remotely
    for employee in local.list_employees()? {
        if employee.canonical_id.is_none() {
            match mapper.ensure_employee_id(local, &employee) {
                Ok(_) => stats.linked += 1,
                Err(error) => stats.row_failed(COLLECTION, employee.fields.label(), &error),
            }
        }
    }

    let local_rows = local.list_employees()?;
    let local_by_id: HashMap<CanonicalId, &LocalEmployee> = local_rows
        .iter()
        .filter_map(|employee| employee.canonical_id.map(|id| (id, employee)))
        .collect();

    for remote_row in &remote_rows {
        let write = match local_by_id.get(&remote_row.id) {
            None => Write::Insert,
            Some(local_row) if EmployeeRule::pull_worthy(local_row, remote_row) => Write::Update,
            Some(_) => continue,
        };

        let subject = format!("Employee {}", remote_row.fields.label());
        let department_id =
            match mapper.unit_to_local(local, remote_row.department_id.as_ref(), &subject) {
                Ok(department_id) => department_id,
                Err(error) => {
                    stats.row_failed(COLLECTION, remote_row.id, &error);
                    continue;
                }
            };

        let result = match write {
            Write::Insert => local
                .insert_employee(remote_row, department_id)
                .map(|_| stats.pulled_inserts += 1),
            Write::Update => local
                .update_employee(&remote_row.id, &remote_row.fields, department_id)
                .map(|()| stats.pulled_updates += 1),
        };
        if let Err(error) = result {
            stats.row_failed(COLLECTION, remote_row.id, &error);
        }
    }

    let remote_by_id: HashMap<CanonicalId, &RemoteEmployee> = remote_rows
        .iter()
        .map(|employee| (employee.id, employee))
        .collect();

    for local_row in local.list_employees()? {
        let Some(id) = local_row.canonical_id else {
            stats.skipped += 1;
            continue;
        };

        let write = match remote_by_id.get(&id) {
            None => Write::Insert,
            Some(remote_row) if EmployeeRule::push_worthy(&local_row, remote_row) => Write::Update,
            Some(_) => continue,
        };

        let subject = format!("Employee {}", local_row.fields.label());
        let department_id = match mapper.unit_to_remote(local, local_row.department_id, &subject) {
            Ok(department_id) => department_id,
            Err(error) => {
                stats.row_failed(COLLECTION, id, &error);
                continue;
            }
        };
        let payload = RemoteEmployee {
            id,
            department_id,
            fields: local_row.fields,
        };

        match write {
            Write::Insert => match remote.insert_employee(&payload).await {
                Ok(()) => {
                    stats.pushed_inserts += 1;
                    mapper.add_remote_person(id);
                }
                Err(error) => stats.row_failed(COLLECTION, id, &error),
            },
            Write::Update => match remote.update_employee(&payload).await {
                Ok(()) => stats.pushed_updates += 1,
                Err(error) => stats.row_failed(COLLECTION, id, &error),
            },
        }
    }

    Ok(stats)
}
