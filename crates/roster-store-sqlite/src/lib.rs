//! SQLite backend for the Roster scheduling store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The calendar, meeting, task and
//! directory modules hold the synchronous SQL for each area; [`SqliteStore`]
//! runs them inside transactions.

mod calendar;
mod directory;
mod encode;
mod meetings;
mod schema;
mod store;
mod tasks;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
