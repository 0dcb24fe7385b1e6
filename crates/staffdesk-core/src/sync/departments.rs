//! Department replication, joined across stores by name.

use std::collections::HashMap;

use super::dominance::{DepartmentRule, Dominance};
use super::{Collection, CollectionStats, IdentifierMapper};
use crate::db::LocalStore;
use crate::error::Result;
use crate::models::{DepartmentChanges, LocalDepartment, NewRemoteDepartment, RemoteDepartment};
use crate::remote::RemoteStore;

const COLLECTION: Collection = Collection::Departments;

pub(super) async fn sync<L: LocalStore, R: RemoteStore>(
    local: &L,
    remote: &R,
    mapper: &mut IdentifierMapper,
) -> Result<CollectionStats> {
    let mut stats = CollectionStats::default();

    let remote_rows = remote.list_departments().await?;
    let local_rows = local.list_departments()?;
    mapper.set_remote_units(remote_rows.iter().map(|department| department.id));

    let local_by_name: HashMap<&str, &LocalDepartment> = local_rows
        .iter()
        .map(|department| (department.name.as_str(), department))
        .collect();

    for remote_row in &remote_rows {
        let Some(local_row) = local_by_name.get(remote_row.name.as_str()) else {
            match local.insert_department(remote_row) {
                Ok(_) => stats.pulled_inserts += 1,
                Err(error) => stats.row_failed(COLLECTION, &remote_row.name, &error),
            }
            continue;
        };

        if local_row.remote_id != Some(remote_row.id) {
            match mapper.link_department(local, local_row.id, &remote_row.id) {
                Ok(()) => stats.linked += 1,
                Err(error) => stats.row_failed(COLLECTION, &remote_row.name, &error),
            }
        }

        if DepartmentRule::pull_worthy(local_row, remote_row) {
            match local.update_department(&remote_row.name, &DepartmentChanges::from(remote_row)) {
                Ok(()) => stats.pulled_updates += 1,
                Err(error) => stats.row_failed(COLLECTION, &remote_row.name, &error),
            }
        }
    }

    let remote_by_name: HashMap<&str, &RemoteDepartment> = remote_rows
        .iter()
        .map(|department| (department.name.as_str(), department))
        .collect();

    for local_row in local.list_departments()? {
        match remote_by_name.get(local_row.name.as_str()) {
            None => {
                let stored = match remote
                    .insert_department(&NewRemoteDepartment::from(&local_row))
                    .await
                {
                    Ok(stored) => stored,
                    Err(error) => {
                        stats.row_failed(COLLECTION, &local_row.name, &error);
                        continue;
                    }
                };
                stats.pushed_inserts += 1;

                if let Err(error) = mapper.link_department(local, local_row.id, &stored.id) {
                    stats.row_failed(COLLECTION, &local_row.name, &error);
                }
            }
            Some(remote_row) if DepartmentRule::push_worthy(&local_row, remote_row) => {
                match remote
                    .update_department(&remote_row.id, &DepartmentChanges::from(&local_row))
                    .await
                {
                    Ok(()) => stats.pushed_updates += 1,
                    Err(error) => stats.row_failed(COLLECTION, &local_row.name, &error),
                }
            }
            Some(_) => {}
        }
    }

    Ok(stats)
}
