//! Attendance book: student → month → day → present.
//!
//! # Responsibility
//! - Own the three-level presence structure and its lazy creation.
//! - Provide Gregorian calendar helpers shared by the grid and dashboard.
//!
//! # Invariants
//! - Missing levels read as "not present"; lookups never create entries.
//! - Writers only go through the `*_or_create` accessors.
//! - Day keys written by this crate are within `1..=days_in_month`.

use crate::model::student::StudentId;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Number of days in `month` (1-based) of `year`.
///
/// 0 for an invalid month or a year outside the representable calendar.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    if !(1..=12).contains(&month) {
        return 0;
    }
    let next = if month == 12 {
        year.checked_add(1).map(|next_year| (next_year, 1))
    } else {
        Some((year, month + 1))
    };
    next.and_then(|(next_year, next_month)| NaiveDate::from_ymd_opt(next_year, next_month, 1))
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last_day| last_day.day())
        .unwrap_or(0)
}

/// Calendar month identifier, persisted as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Returns `None` unless `month` is in `1..=12` of a representable year.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (days_in_month(year, month) > 0).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn contains_day(&self, day: u32) -> bool {
        (1..=self.days()).contains(&day)
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (year, month) = value
            .split_once('-')
            .ok_or_else(|| format!("month key `{value}` is not YYYY-MM"))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(format!("month key `{value}` is not YYYY-MM"));
        }
        let year = year
            .parse::<i32>()
            .map_err(|_| format!("invalid year in month key `{value}`"))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| format!("invalid month in month key `{value}`"))?;
        Self::new(year, month).ok_or_else(|| format!("month out of range in `{value}`"))
    }
}

impl TryFrom<String> for MonthKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

/// Day number → presence for one student in one month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthAttendance {
    days: BTreeMap<u32, bool>,
}

impl MonthAttendance {
    pub fn is_present(&self, day: u32) -> bool {
        self.days.get(&day).copied().unwrap_or(false)
    }

    pub fn set(&mut self, day: u32, present: bool) {
        self.days.insert(day, present);
    }

    /// Flips `day` and returns the new value.
    pub fn toggle(&mut self, day: u32) -> bool {
        let present = !self.is_present(day);
        self.set(day, present);
        present
    }
}

/// All months recorded for one student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentAttendance {
    months: BTreeMap<MonthKey, MonthAttendance>,
}

impl StudentAttendance {
    pub fn month(&self, key: MonthKey) -> Option<&MonthAttendance> {
        self.months.get(&key)
    }

    pub fn month_or_create(&mut self, key: MonthKey) -> &mut MonthAttendance {
        self.months.entry(key).or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

/// Whole attendance record, keyed by student id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceBook {
    students: BTreeMap<StudentId, StudentAttendance>,
}

impl AttendanceBook {
    pub fn student(&self, id: &StudentId) -> Option<&StudentAttendance> {
        self.students.get(id)
    }

    pub fn student_or_create(&mut self, id: &StudentId) -> &mut StudentAttendance {
        self.students.entry(id.clone()).or_default()
    }

    pub fn month_or_create(&mut self, id: &StudentId, key: MonthKey) -> &mut MonthAttendance {
        self.student_or_create(id).month_or_create(key)
    }

    pub fn is_present(&self, id: &StudentId, key: MonthKey, day: u32) -> bool {
        self.student(id)
            .and_then(|student| student.month(key))
            .is_some_and(|month| month.is_present(day))
    }

    pub fn is_present_on(&self, id: &StudentId, date: NaiveDate) -> bool {
        self.is_present(id, MonthKey::from_date(date), date.day())
    }

    /// Drops every month recorded for `id`. Returns whether an entry existed.
    pub fn remove_student(&mut self, id: &StudentId) -> bool {
        self.students.remove(id).is_some()
    }

    pub fn contains_student(&self, id: &StudentId) -> bool {
        self.students.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::{days_in_month, AttendanceBook, MonthKey};
    use crate::model::student::StudentId;
    use chrono::NaiveDate;

    #[test]
    fn days_in_month_follows_gregorian_calendar() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 1), 31);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 13), 0);
        assert_eq!(days_in_month(2024, 0), 0);
    }

    #[test]
    fn unrepresentable_years_have_no_days_and_no_month_key() {
        assert_eq!(days_in_month(i32::MAX, 12), 0);
        assert_eq!(days_in_month(i32::MIN, 1), 0);
        assert!(MonthKey::new(i32::MAX, 12).is_none());
        assert!(MonthKey::new(300_000, 6).is_none());
    }

    #[test]
    fn month_key_parses_and_formats_zero_padded() {
        let key: MonthKey = "2024-03".parse().unwrap();
        assert_eq!(key, MonthKey::new(2024, 3).unwrap());
        assert_eq!(key.to_string(), "2024-03");
        assert!("2024-3".parse::<MonthKey>().is_err());
        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!(MonthKey::new(2024, 0).is_none());
    }

    #[test]
    fn lookups_on_missing_levels_are_absent_not_errors() {
        let book = AttendanceBook::default();
        let id = StudentId::from("s1");
        let key = MonthKey::new(2024, 5).unwrap();
        assert!(!book.is_present(&id, key, 3));
        assert!(!book.contains_student(&id));
    }

    #[test]
    fn book_serializes_as_nested_objects_with_string_day_keys() {
        let mut book = AttendanceBook::default();
        let id = StudentId::from("s1");
        let key = MonthKey::new(2024, 5).unwrap();
        book.month_or_create(&id, key).set(3, true);
        book.month_or_create(&id, key).set(4, false);

        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["s1"]["2024-05"]["3"], true);
        assert_eq!(json["s1"]["2024-05"]["4"], false);

        let decoded: AttendanceBook = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, book);
        let date = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        assert!(decoded.is_present_on(&id, date));
    }
}
