//! Bidirectional replication between the local database and the remote store.
//!
//! A cycle walks the collections in dependency order (departments, employees,
//! attendance, payroll, profile). Each collection pulls remote changes first,
//! then re-reads the local side and pushes what the remote store lacks or holds
//! an older copy of. Deletions are never propagated.

mod attendance;
mod departments;
pub mod dominance;
mod employees;
mod mapper;
mod payroll;
mod profile;
pub mod scheduler;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

pub use mapper::IdentifierMapper;

use crate::auth::SessionProvider;
use crate::db::LocalStore;
use crate::error::Result;
use crate::remote::RemoteStore;

/// The replicated collections, in sync order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Departments,
    Employees,
    Attendance,
    Payroll,
    Profile,
}

impl Collection {
    pub const ALL: [Self; 5] = [
        Self::Departments,
        Self::Employees,
        Self::Attendance,
        Self::Payroll,
        Self::Profile,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Departments => "departments",
            Self::Employees => "employees",
            Self::Attendance => "attendance",
            Self::Payroll => "payroll",
            Self::Profile => "profile",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-collection counters for one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub pulled_inserts: usize,
    pub pulled_updates: usize,
    pub pushed_inserts: usize,
    pub pushed_updates: usize,
    /// Local rows newly bound to a canonical id
    pub linked: usize,
    /// Rows left alone because a referenced record is missing on the other side
    pub skipped: usize,
    pub failed: usize,
}

impl CollectionStats {
    /// Rows written to either store
    pub const fn writes(&self) -> usize {
        self.pulled_inserts + self.pulled_updates + self.pushed_inserts + self.pushed_updates
    }

    /// Record a row-level failure. The row is retried next cycle.
    pub(crate) fn row_failed(
        &mut self,
        collection: Collection,
        key: impl fmt::Display,
        error: &impl fmt::Display,
    ) {
        tracing::warn!("Failed to sync {collection} row {key}: {error}");
        self.failed += 1;
    }
}

impl fmt::Display for CollectionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pulled {}+{}, pushed {}+{}, linked {}, skipped {}, failed {}",
            self.pulled_inserts,
            self.pulled_updates,
            self.pushed_inserts,
            self.pushed_updates,
            self.linked,
            self.skipped,
            self.failed
        )
    }
}

/// Result of one collection within a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionOutcome {
    Synced(CollectionStats),
    /// The collection aborted, usually because a listing failed
    Failed(String),
}

/// Summary of a completed cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub collections: Vec<(Collection, CollectionOutcome)>,
}

impl CycleReport {
    pub fn stats(&self, collection: Collection) -> Option<CollectionStats> {
        self.collections
            .iter()
            .find_map(|(candidate, outcome)| match outcome {
                CollectionOutcome::Synced(stats) if *candidate == collection => Some(*stats),
                _ => None,
            })
    }

    /// Rows written to either store across all collections
    pub fn writes(&self) -> usize {
        self.collections
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                CollectionOutcome::Synced(stats) => Some(stats.writes()),
                CollectionOutcome::Failed(_) => None,
            })
            .sum()
    }

    pub fn failed_collections(&self) -> Vec<Collection> {
        self.collections
            .iter()
            .filter(|(_, outcome)| matches!(outcome, CollectionOutcome::Failed(_)))
            .map(|(collection, _)| *collection)
            .collect()
    }
}

/// What a call to [`SyncEngine::run_sync_cycle`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Nobody is signed in; nothing was contacted
    SkippedNoSession,
    /// Another cycle was still in flight
    AlreadyRunning,
}

/// Clears the in-flight flag when a cycle ends, however it ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs sync cycles between a local store and a remote store.
pub struct SyncEngine<L, R, S> {
    local: L,
    remote: R,
    sessions: S,
    running: AtomicBool,
}

impl<L: LocalStore, R: RemoteStore, S: SessionProvider> SyncEngine<L, R, S> {
    pub const fn new(local: L, remote: R, sessions: S) -> Self {
        Self {
            local,
            remote,
            sessions,
            running: AtomicBool::new(false),
        }
    }

    pub const fn local(&self) -> &L {
        &self.local
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    /// Run one full cycle over every collection.
    ///
    /// A failing collection is logged and the cycle moves on to the next one.
    /// Overlapping calls return [`CycleOutcome::AlreadyRunning`] immediately.
    pub async fn run_sync_cycle(&self) -> CycleOutcome {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::info!("Sync cycle already in progress, skipping");
            return CycleOutcome::AlreadyRunning;
        }
        let _guard = RunningGuard(&self.running);

        let session = match self.sessions.active_session().await {
            Ok(Some(session)) => session,
            Ok(None) => {
                tracing::info!("No active session, skipping sync");
                return CycleOutcome::SkippedNoSession;
            }
            Err(error) => {
                tracing::info!("Session unavailable ({error}), skipping sync");
                return CycleOutcome::SkippedNoSession;
            }
        };

        self.remote.authorize(&session.access_token).await;
        if let Err(error) = self.remote.provision_schema().await {
            tracing::warn!("Remote schema setup failed, continuing: {error}");
        }

        tracing::info!("Starting sync cycle");
        let mut mapper = IdentifierMapper::new();
        let mut report = CycleReport::default();
        for collection in Collection::ALL {
            let outcome = match self.sync_collection(collection, &mut mapper).await {
                Ok(stats) => {
                    tracing::info!("Synced {collection}: {stats}");
                    CollectionOutcome::Synced(stats)
                }
                Err(error) => {
                    tracing::error!("Failed to sync {collection}: {error}");
                    CollectionOutcome::Failed(error.to_string())
                }
            };
            report.collections.push((collection, outcome));
        }
        tracing::info!("Sync cycle finished, {} rows written", report.writes());

        CycleOutcome::Completed(report)
    }

    async fn sync_collection(
        &self,
        collection: Collection,
        mapper: &mut IdentifierMapper,
    ) -> Result<CollectionStats> {
        match collection {
            Collection::Departments => departments::sync(&self.local, &self.remote, mapper).await,
            Collection::Employees => employees::sync(&self.local, &self.remote, mapper).await,
            Collection::Attendance => attendance::sync(&self.local, &self.remote, mapper).await,
            Collection::Payroll => payroll::sync(&self.local, &self.remote, mapper).await,
            Collection::Profile => profile::sync(&self.local, &self.remote).await,
        }
    }
}
