//! Use-case services.
//!
//! # Responsibility
//! - Turn user actions into read-modify-write cycles on the store.
//! - Keep callers (CLI, tests) away from record encoding details.
//!
//! # Invariants
//! - Services receive their store handle and clock explicitly; there is no
//!   process-wide state.
//! - Each operation finishes its writes before returning.

pub mod account_service;
pub mod attendance_service;
pub mod dashboard_service;
pub mod roster_service;
pub mod session_service;
