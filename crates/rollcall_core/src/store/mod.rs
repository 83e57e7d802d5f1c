//! Key-value persistence for the four rollcall records.
//!
//! # Responsibility
//! - Define the raw string store contract (`KeyValueStore`).
//! - Provide SQLite and in-memory backends.
//! - Wrap a backend in typed accessors (`PersistentStore`).
//!
//! # Invariants
//! - Each `set` is independent; there is no atomicity across keys.
//! - Malformed persisted values never surface as errors to callers.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory_kv;
mod sqlite_kv;
mod typed;

pub use memory_kv::MemoryKvStore;
pub use sqlite_kv::SqliteKvStore;
pub use typed::{decode_record, PersistentStore};

pub type StoreResult<T> = Result<T, StoreError>;

/// Fixed record names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Users,
    Session,
    Students,
    Attendance,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Session => "sessionUser",
            Self::Students => "students",
            Self::Attendance => "attendance",
        }
    }
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw string store, the equivalent of browser local storage.
pub trait KeyValueStore {
    fn get_raw(&self, key: StoreKey) -> StoreResult<Option<String>>;
    fn set_raw(&self, key: StoreKey, value: &str) -> StoreResult<()>;
    fn remove(&self, key: StoreKey) -> StoreResult<()>;
}

/// Backend failure. Always surfaced to the caller.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Encode {
        key: StoreKey,
        source: serde_json::Error,
    },
    /// The connection was never migrated.
    NotReady(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode { key, source } => write!(f, "failed to encode `{key}`: {source}"),
            Self::NotReady(details) => write!(f, "store not ready: {details}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode { source, .. } => Some(source),
            Self::NotReady(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// A persisted value that could not be decoded.
///
/// Callers replace the value with the record's empty default.
/// Only the failure position is kept; decoder messages can echo stored
/// values such as passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableError {
    pub key: StoreKey,
    pub kind: &'static str,
    pub line: usize,
    pub column: usize,
}

impl Display for RecoverableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "malformed `{}` record: {} error at line {} column {}",
            self.key, self.kind, self.line, self.column
        )
    }
}

impl Error for RecoverableError {}
