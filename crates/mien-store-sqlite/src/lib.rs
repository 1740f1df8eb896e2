//! SQLite backend for the Mien face API.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One [`SqliteStore`] serves as face
//! index, face repository and session resolver.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{MAX_RESULTS, SqliteStore};

#[cfg(test)]
mod tests;
