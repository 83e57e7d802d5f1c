//! Core domain logic for Rollcall attendance tracking.
//! This crate is the single source of truth for business invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::attendance::{days_in_month, AttendanceBook, MonthAttendance, MonthKey};
pub use model::session::{Session, SESSION_TTL_MS};
pub use model::student::{NewStudent, Student, StudentId, StudentPatch, StudentValidationError};
pub use model::user::{User, UserValidationError, MIN_PASSWORD_CHARS};
pub use service::account_service::{AccountError, AccountResult, AccountService};
pub use service::attendance_service::{
    year_options, AttendanceError, AttendanceService, GridRow, MonthGrid,
};
pub use service::dashboard_service::{
    DashboardService, DashboardSnapshot, Kpi, MonthlySplit, SeriesPoint,
};
pub use service::roster_service::{
    natural_cmp, students_in_class, RosterError, RosterService, ALL_CLASSES,
};
pub use service::session_service::{SessionError, SessionService};
pub use store::{
    KeyValueStore, MemoryKvStore, PersistentStore, RecoverableError, SqliteKvStore, StoreError,
    StoreKey, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
