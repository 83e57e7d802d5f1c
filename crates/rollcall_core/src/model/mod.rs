//! Typed records persisted by the rollcall store.
//!
//! # Responsibility
//! - Define one explicit struct per persisted entity.
//! - Validate required fields at construction time.
//!
//! # Invariants
//! - Every record serializes with camelCase field names.
//! - Timestamps are Unix epoch milliseconds.

pub mod attendance;
pub mod session;
pub mod student;
pub mod user;
