//! Dashboard aggregations.
//!
//! # Responsibility
//! - Derive present counts, windowed series, KPI percentages and the
//!   current-month split from the roster and attendance book.
//!
//! # Invariants
//! - All operations are read-only.
//! - Windows end at `Clock::today()` inclusive and contain exactly `days`
//!   points.
//! - `present_pct + absent_pct == 100`.

use crate::clock::Clock;
use crate::model::attendance::{days_in_month, AttendanceBook, MonthKey};
use crate::model::student::Student;
use crate::service::roster_service::students_in_class;
use crate::store::{KeyValueStore, PersistentStore, StoreResult};
use chrono::{Days, NaiveDate};

/// One bar of the windowed series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    /// `"<day> <Mon>"`, e.g. `"5 Oct"`.
    pub label: String,
    pub present: usize,
}

/// Present/absent percentages over a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kpi {
    pub present_pct: u32,
    pub absent_pct: u32,
}

/// Present vs absent day-slots in the current month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlySplit {
    pub month: MonthKey,
    pub present: usize,
    pub absent: usize,
}

/// Everything one dashboard render needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSnapshot {
    pub class_filter: String,
    pub period_days: u32,
    pub total_students: usize,
    pub series: Vec<SeriesPoint>,
    pub kpi: Kpi,
    pub monthly: MonthlySplit,
}

/// Dashboard aggregator over an injected store and clock.
pub struct DashboardService<'a, S: KeyValueStore> {
    store: &'a PersistentStore<S>,
    clock: &'a dyn Clock,
}

impl<'a, S: KeyValueStore> DashboardService<'a, S> {
    pub fn new(store: &'a PersistentStore<S>, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// `"all"` or blank returns every student, otherwise exact class match.
    pub fn filter_by_class(&self, class: &str) -> StoreResult<Vec<Student>> {
        Ok(students_in_class(self.store.load_students()?, class))
    }

    pub fn present_count_on_date(&self, date: NaiveDate, subset: &[Student]) -> StoreResult<usize> {
        let book = self.store.load_attendance()?;
        Ok(count_present(&book, date, subset))
    }

    pub fn window_series(&self, days: u32, subset: &[Student]) -> StoreResult<Vec<SeriesPoint>> {
        let book = self.store.load_attendance()?;
        Ok(build_series(&book, self.clock.today(), days, subset))
    }

    pub fn kpi_percentages(&self, days: u32, subset: &[Student]) -> StoreResult<Kpi> {
        let series = self.window_series(days, subset)?;
        Ok(kpi_from_series(&series, subset.len(), days))
    }

    pub fn monthly_split(&self, subset: &[Student]) -> StoreResult<MonthlySplit> {
        let book = self.store.load_attendance()?;
        Ok(split_for_month(
            &book,
            MonthKey::from_date(self.clock.today()),
            subset,
        ))
    }

    /// Computes every dashboard figure from one read of each record.
    pub fn snapshot(&self, days: u32, class: &str) -> StoreResult<DashboardSnapshot> {
        let subset = self.filter_by_class(class)?;
        let book = self.store.load_attendance()?;
        let today = self.clock.today();

        let series = build_series(&book, today, days, &subset);
        let kpi = kpi_from_series(&series, subset.len(), days);
        let monthly = split_for_month(&book, MonthKey::from_date(today), &subset);

        Ok(DashboardSnapshot {
            class_filter: class.to_string(),
            period_days: days,
            total_students: subset.len(),
            series,
            kpi,
            monthly,
        })
    }
}

fn count_present(book: &AttendanceBook, date: NaiveDate, subset: &[Student]) -> usize {
    subset
        .iter()
        .filter(|student| book.is_present_on(&student.id, date))
        .count()
}

fn build_series(
    book: &AttendanceBook,
    today: NaiveDate,
    days: u32,
    subset: &[Student],
) -> Vec<SeriesPoint> {
    (0..days)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
        .map(|date| SeriesPoint {
            date,
            label: date.format("%-d %b").to_string(),
            present: count_present(book, date, subset),
        })
        .collect()
}

fn kpi_from_series(series: &[SeriesPoint], subset_len: usize, days: u32) -> Kpi {
    let total_possible = subset_len as u64 * u64::from(days);
    let total_present: u64 = series.iter().map(|point| point.present as u64).sum();
    let present_pct = round_half_up_percent(total_present, total_possible);
    Kpi {
        present_pct,
        absent_pct: 100 - present_pct,
    }
}

/// `round(100 * part / total)` with halves rounded up; 0 when `total` is 0.
fn round_half_up_percent(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let rounded = (200 * part + total) / (2 * total);
    rounded.min(100) as u32
}

fn split_for_month(book: &AttendanceBook, month: MonthKey, subset: &[Student]) -> MonthlySplit {
    let days = days_in_month(month.year(), month.month());
    let present: usize = (1..=days)
        .filter_map(|day| NaiveDate::from_ymd_opt(month.year(), month.month(), day))
        .map(|date| count_present(book, date, subset))
        .sum();
    let capacity = subset.len() * days as usize;

    MonthlySplit {
        month,
        present,
        absent: capacity.saturating_sub(present),
    }
}
