//! Payroll replication, keyed by (employee, period start, period end).

use std::collections::HashMap;

use super::dominance::{Dominance, PayrollRule};
use super::{Collection, CollectionStats, IdentifierMapper};
use crate::db::LocalStore;
use crate::error::Result;
use crate::models::{LocalPayroll, PayrollKey, RemotePayroll};
use crate::remote::RemoteStore;

const COLLECTION: Collection = Collection::Payroll;

pub(super) async fn sync<L: LocalStore, R: RemoteStore>(
    local: &L,
    remote: &R,
    mapper: &mut IdentifierMapper,
) -> Result<CollectionStats> {
    let mut stats = CollectionStats::default();

    let remote_rows = remote.list_payroll().await?;
    let local_rows = local.list_payroll()?;
    let local_by_key: HashMap<PayrollKey, &LocalPayroll> = local_rows
        .iter()
        .map(|record| (record.key(), record))
        .collect();

    for remote_row in &remote_rows {
        let key = remote_row.key();
        match local_by_key.get(&key) {
            None => {
                let employee_id = match mapper.local_employee(local, &remote_row.employee_id) {
                    Ok(Some(employee_id)) => employee_id,
                    Ok(None) => {
                        tracing::debug!("Skipping payroll {key}: employee not present locally");
                        stats.skipped += 1;
                        continue;
                    }
                    Err(error) => {
                        stats.row_failed(COLLECTION, key, &error);
                        continue;
                    }
                };
                match local.insert_payroll(employee_id, &remote_row.fields) {
                    Ok(_) => stats.pulled_inserts += 1,
                    Err(error) => stats.row_failed(COLLECTION, key, &error),
                }
            }
            Some(local_row) if PayrollRule::pull_worthy(local_row, remote_row) => {
                match local.update_payroll(&key, &remote_row.fields) {
                    Ok(()) => stats.pulled_updates += 1,
                    Err(error) => stats.row_failed(COLLECTION, key, &error),
                }
            }
            Some(_) => {}
        }
    }

    let remote_by_key: HashMap<PayrollKey, &RemotePayroll> = remote_rows
        .iter()
        .map(|record| (record.key(), record))
        .collect();
    let local_rows = local.list_payroll()?;
    let remote_people = mapper.remote_people(remote).await?;

    for local_row in local_rows {
        let key = local_row.key();
        let write_update = match remote_by_key.get(&key) {
            None if !remote_people.contains(&key.employee) => {
                tracing::debug!("Skipping payroll {key}: employee not present remotely");
                stats.skipped += 1;
                continue;
            }
            None => false,
            Some(remote_row) if PayrollRule::push_worthy(&local_row, remote_row) => true,
            Some(_) => continue,
        };

        let payload = RemotePayroll {
            employee_id: key.employee,
            fields: local_row.fields,
        };
        if write_update {
            match remote.update_payroll(&payload).await {
                Ok(()) => stats.pushed_updates += 1,
                Err(error) => stats.row_failed(COLLECTION, key, &error),
            }
        } else {
            match remote.insert_payroll(&payload).await {
                Ok(()) => stats.pushed_inserts += 1,
                Err(error) => stats.row_failed(COLLECTION, key, &error),
            }
        }
    }

    Ok(stats)
}
