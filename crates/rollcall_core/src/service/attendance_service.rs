//! Attendance grid use-cases.
//!
//! # Responsibility
//! - Read and toggle single cells of the presence map.
//! - Build the month grid shown for a class filter.
//!
//! # Invariants
//! - Reads never create entries; absence means "not present".
//! - Out-of-range months and days are rejected before any write.

use crate::model::attendance::{days_in_month, MonthKey};
use crate::model::student::StudentId;
use crate::service::roster_service::students_in_class;
use crate::store::{KeyValueStore, PersistentStore, StoreError, StoreResult};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

/// Attendance operation failure.
#[derive(Debug)]
pub enum AttendanceError {
    InvalidMonth { year: i32, month: u32 },
    DayOutOfRange { month: MonthKey, day: u32 },
    Store(StoreError),
}

impl Display for AttendanceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMonth { year, month } => {
                write!(f, "invalid month {month} for year {year}")
            }
            Self::DayOutOfRange { month, day } => write!(
                f,
                "day {day} is outside 1..={} for {month}",
                month.days()
            ),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AttendanceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for AttendanceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// One roster row of a month grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub student_id: StudentId,
    pub roll: u32,
    pub name: String,
    /// Index `d - 1` holds day `d`.
    pub days: Vec<bool>,
}

/// Presence table for one month and class filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub month: MonthKey,
    pub days: u32,
    pub rows: Vec<GridRow>,
}

/// Year choices offered by the month picker: last year through two ahead.
pub fn year_options(current_year: i32) -> RangeInclusive<i32> {
    (current_year - 1)..=(current_year + 2)
}

/// Attendance grid over an injected store.
pub struct AttendanceService<'a, S: KeyValueStore> {
    store: &'a PersistentStore<S>,
}

impl<'a, S: KeyValueStore> AttendanceService<'a, S> {
    pub fn new(store: &'a PersistentStore<S>) -> Self {
        Self { store }
    }

    pub fn days_in_month(&self, year: i32, month: u32) -> u32 {
        days_in_month(year, month)
    }

    /// `false` for any missing level, including invalid months.
    pub fn is_present(
        &self,
        student_id: &StudentId,
        year: i32,
        month: u32,
        day: u32,
    ) -> StoreResult<bool> {
        let Some(key) = MonthKey::new(year, month) else {
            return Ok(false);
        };
        Ok(self.store.load_attendance()?.is_present(student_id, key, day))
    }

    /// Flips one cell, creating missing levels, and returns the new value.
    pub fn toggle(
        &self,
        student_id: &StudentId,
        year: i32,
        month: u32,
        day: u32,
    ) -> Result<bool, AttendanceError> {
        let key = month_key(year, month)?;
        if !key.contains_day(day) {
            return Err(AttendanceError::DayOutOfRange { month: key, day });
        }

        let mut book = self.store.load_attendance()?;
        let present = book.month_or_create(student_id, key).toggle(day);
        self.store.save_attendance(&book)?;

        debug!(
            "event=attendance_toggle module=attendance status=ok student_id={student_id} month={key} day={day} present={present}"
        );
        Ok(present)
    }

    /// Builds the grid for `class_filter` ("all" for every class).
    ///
    /// Missing student+month entries are created and persisted.
    pub fn month_grid(
        &self,
        year: i32,
        month: u32,
        class_filter: &str,
    ) -> Result<MonthGrid, AttendanceError> {
        let key = month_key(year, month)?;
        let days = key.days();
        let students = students_in_class(self.store.load_students()?, class_filter);

        let mut book = self.store.load_attendance()?;
        let mut created = 0usize;
        let mut rows = Vec::with_capacity(students.len());
        for student in students {
            let missing = book
                .student(&student.id)
                .and_then(|entry| entry.month(key))
                .is_none();
            if missing {
                created += 1;
            }
            let month_entry = book.month_or_create(&student.id, key);
            let cells = (1..=days).map(|day| month_entry.is_present(day)).collect();
            rows.push(GridRow {
                student_id: student.id,
                roll: student.roll,
                name: student.name,
                days: cells,
            });
        }

        if created > 0 {
            self.store.save_attendance(&book)?;
            info!(
                "event=attendance_grid_init module=attendance status=ok month={key} created_entries={created}"
            );
        }

        Ok(MonthGrid {
            month: key,
            days,
            rows,
        })
    }
}

fn month_key(year: i32, month: u32) -> Result<MonthKey, AttendanceError> {
    MonthKey::new(year, month).ok_or(AttendanceError::InvalidMonth { year, month })
}
