//! Typed accessors over a raw key-value backend.
//!
//! # Responsibility
//! - Encode/decode the four records as JSON.
//! - Substitute empty defaults for missing or malformed values.
//!
//! # Invariants
//! - A decode failure is logged and recovered, never returned.
//! - Backend and encode failures are returned unchanged.

use super::{KeyValueStore, RecoverableError, StoreError, StoreKey, StoreResult};
use crate::model::attendance::AttendanceBook;
use crate::model::session::Session;
use crate::model::student::Student;
use crate::model::user::User;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::error::Category;

/// Decodes one persisted JSON value.
pub fn decode_record<T: DeserializeOwned>(key: StoreKey, raw: &str) -> Result<T, RecoverableError> {
    serde_json::from_str(raw).map_err(|err| RecoverableError {
        key,
        kind: match err.classify() {
            Category::Io => "io",
            Category::Syntax => "syntax",
            Category::Data => "data",
            Category::Eof => "eof",
        },
        line: err.line(),
        column: err.column(),
    })
}

/// Typed view of the Users, Session, Students and Attendance records.
pub struct PersistentStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> PersistentStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn load_users(&self) -> StoreResult<Vec<User>> {
        self.load(StoreKey::Users)
    }

    pub fn save_users(&self, users: &[User]) -> StoreResult<()> {
        self.save(StoreKey::Users, users)
    }

    pub fn load_session(&self) -> StoreResult<Option<Session>> {
        self.load(StoreKey::Session)
    }

    pub fn save_session(&self, session: &Session) -> StoreResult<()> {
        self.save(StoreKey::Session, session)
    }

    pub fn clear_session(&self) -> StoreResult<()> {
        self.backend.remove(StoreKey::Session)
    }

    pub fn load_students(&self) -> StoreResult<Vec<Student>> {
        self.load(StoreKey::Students)
    }

    pub fn save_students(&self, students: &[Student]) -> StoreResult<()> {
        self.save(StoreKey::Students, students)
    }

    pub fn load_attendance(&self) -> StoreResult<AttendanceBook> {
        self.load(StoreKey::Attendance)
    }

    pub fn save_attendance(&self, book: &AttendanceBook) -> StoreResult<()> {
        self.save(StoreKey::Attendance, book)
    }

    fn load<T: DeserializeOwned + Default>(&self, key: StoreKey) -> StoreResult<T> {
        let Some(raw) = self.backend.get_raw(key)? else {
            return Ok(T::default());
        };
        match decode_record(key, &raw) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(
                    "event=store_load module=store status=recovered key={} kind={} line={} column={}",
                    key, err.kind, err.line, err.column
                );
                Ok(T::default())
            }
        }
    }

    fn save<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> StoreResult<()> {
        let encoded =
            serde_json::to_string(value).map_err(|source| StoreError::Encode { key, source })?;
        self.backend.set_raw(key, &encoded)
    }
}
