//! Administrator profile replication.
//!
//! The profile is a singleton keyed by admin email and only exists once local
//! registration has completed.

use super::dominance::{Dominance, ProfileRule};
use super::{Collection, CollectionStats};
use crate::db::LocalStore;
use crate::error::Result;
use crate::models::Profile;
use crate::remote::RemoteStore;

const COLLECTION: Collection = Collection::Profile;

pub(super) async fn sync<L: LocalStore, R: RemoteStore>(
    local: &L,
    remote: &R,
) -> Result<CollectionStats> {
    let mut stats = CollectionStats::default();

    let Some(local_profile) = local.load_profile()? else {
        tracing::debug!("No registered profile, nothing to sync");
        return Ok(stats);
    };
    let key = local_profile.admin_email.clone();

    let remote_profile = match remote.find_profile(&local_profile.admin_email).await {
        Ok(profile) => profile,
        Err(error) if error.is_missing_table() => {
            tracing::info!("Remote profile table does not exist, skipping profile sync");
            return Ok(stats);
        }
        Err(error) => return Err(error.into()),
    };

    let Some(remote_profile) = remote_profile else {
        match remote.insert_profile(&local_profile).await {
            Ok(()) => stats.pushed_inserts += 1,
            Err(error) => stats.row_failed(COLLECTION, key, &error),
        }
        return Ok(stats);
    };

    if ProfileRule::pull_worthy(&local_profile, &remote_profile) {
        let pulled = Profile {
            admin_email: local_profile.admin_email,
            fields: remote_profile.fields,
        };
        match local.update_profile(&pulled) {
            Ok(()) => stats.pulled_updates += 1,
            Err(error) => stats.row_failed(COLLECTION, key, &error),
        }
    } else if ProfileRule::push_worthy(&local_profile, &remote_profile) {
        match remote.update_profile(&local_profile).await {
            Ok(()) => stats.pushed_updates += 1,
            Err(error) => stats.row_failed(COLLECTION, key, &error),
        }
    }

    Ok(stats)
}
