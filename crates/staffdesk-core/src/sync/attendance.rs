//! Attendance replication, keyed by (employee, date).

use std::collections::HashMap;

use super::dominance::{AttendanceRule, Dominance};
use super::{Collection, CollectionStats, IdentifierMapper};
use crate::db::LocalStore;
use crate::error::Result;
use crate::models::{AttendanceKey, LocalAttendance, RemoteAttendance};
use crate::remote::RemoteStore;

const COLLECTION: Collection = Collection::Attendance;

pub(super) async fn sync<L: LocalStore, R: RemoteStore>(
    local: &L,
    remote: &R,
    mapper: &mut IdentifierMapper,
) -> Result<CollectionStats> {
    let mut stats = CollectionStats::default();

    let remote_rows = remote.list_attendance().await?;
    let local_rows = local.list_attendance()?;
    let local_by_key: HashMap<AttendanceKey, &LocalAttendance> =
        local_rows.iter().map(|entry| (entry.key(), entry)).collect();

    for remote_row in &remote_rows {
        let key = remote_row.key();
        match local_by_key.get(&key) {
            None => {
                let employee_id = match mapper.local_employee(local, &remote_row.employee_id) {
                    Ok(Some(employee_id)) => employee_id,
                    Ok(None) => {
                        tracing::debug!("Skipping attendance {key}: employee not present locally");
                        stats.skipped += 1;
                        continue;
                    }
                    Err(error) => {
                        stats.row_failed(COLLECTION, key, &error);
                        continue;
                    }
                };
                match local.insert_attendance(employee_id, &remote_row.fields) {
                    Ok(_) => stats.pulled_inserts += 1,
                    Err(error) => stats.row_failed(COLLECTION, key, &error),
                }
            }
            Some(local_row) if AttendanceRule::pull_worthy(local_row, remote_row) => {
                match local.update_attendance(&key, &remote_row.fields) {
                    Ok(()) => stats.pulled_updates += 1,
                    Err(error) => stats.row_failed(COLLECTION, key, &error),
                }
            }
            Some(_) => {}
        }
    }

    let remote_by_key: HashMap<AttendanceKey, &RemoteAttendance> =
        remote_rows.iter().map(|entry| (entry.key(), entry)).collect();
    let local_rows = local.list_attendance()?;
    let remote_people = mapper.remote_people(remote).await?;

    for local_row in local_rows {
        let key = local_row.key();
        let payload = RemoteAttendance {
            employee_id: key.employee,
            fields: local_row.fields.clone(),
        };

        match remote_by_key.get(&key) {
            None if !remote_people.contains(&key.employee) => {
                tracing::debug!("Skipping attendance {key}: employee not present remotely");
                stats.skipped += 1;
            }
            None => match remote.insert_attendance(&payload).await {
                Ok(()) => stats.pushed_inserts += 1,
                Err(error) => stats.row_failed(COLLECTION, key, &error),
            },
            Some(remote_row) if AttendanceRule::push_worthy(&local_row, remote_row) => {
                match remote.update_attendance(&payload).await {
                    Ok(()) => stats.pushed_updates += 1,
                    Err(error) => stats.row_failed(COLLECTION, key, &error),
                }
            }
            Some(_) => {}
        }
    }

    Ok(stats)
}
