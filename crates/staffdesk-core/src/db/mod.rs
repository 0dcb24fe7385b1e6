//! Local database layer for Staffdesk

mod connection;
mod migrations;
mod repository;

pub use connection::Database;
pub use repository::{LocalStore, SqliteLocalStore};
