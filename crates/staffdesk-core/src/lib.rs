//! staffdesk-core - Core library for Staffdesk
//!
//! This crate contains the HR records, the local database layer, the Supabase
//! auth and PostgREST clients, and the replication engine that keeps the local
//! store and the cloud project in step.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod remote;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use sync::{CycleOutcome, SyncEngine};
