use rollcall_core::{
    AttendanceError, AttendanceService, ManualClock, MemoryKvStore, MonthKey, NewStudent,
    PersistentStore, RosterService, StudentId,
};

const START_MS: i64 = 1_700_000_000_000;

fn add(roster: &RosterService<'_, MemoryKvStore>, name: &str, roll: u32, class: &str) -> StudentId {
    roster
        .add(NewStudent {
            name: name.to_string(),
            roll,
            student_class: class.to_string(),
            section: "A".to_string(),
            mobile: "9000000000".to_string(),
        })
        .unwrap()
}

#[test]
fn days_in_month_matches_calendar() {
    let store = PersistentStore::new(MemoryKvStore::new());
    let attendance = AttendanceService::new(&store);

    assert_eq!(attendance.days_in_month(2024, 2), 29);
    assert_eq!(attendance.days_in_month(2023, 2), 28);
    assert_eq!(attendance.days_in_month(2023, 4), 30);
    assert_eq!(attendance.days_in_month(2023, 1), 31);
}

#[test]
fn toggle_is_self_inverse_and_persisted() {
    let store = PersistentStore::new(MemoryKvStore::new());
    let attendance = AttendanceService::new(&store);
    let id = StudentId::from("s1");

    assert!(!attendance.is_present(&id, 2024, 2, 29).unwrap());
    assert!(attendance.toggle(&id, 2024, 2, 29).unwrap());
    assert!(attendance.is_present(&id, 2024, 2, 29).unwrap());
    let key = MonthKey::new(2024, 2).unwrap();
    assert!(store.load_attendance().unwrap().is_present(&id, key, 29));

    assert!(!attendance.toggle(&id, 2024, 2, 29).unwrap());
    assert!(!attendance.is_present(&id, 2024, 2, 29).unwrap());
    assert!(!store.load_attendance().unwrap().is_present(&id, key, 29));
}

#[test]
fn toggle_rejects_out_of_range_day_and_month_without_writing() {
    let store = PersistentStore::new(MemoryKvStore::new());
    let attendance = AttendanceService::new(&store);
    let id = StudentId::from("s1");

    let day_err = attendance.toggle(&id, 2023, 2, 29).unwrap_err();
    assert!(matches!(day_err, AttendanceError::DayOutOfRange { day: 29, .. }));
    let zero_err = attendance.toggle(&id, 2023, 2, 0).unwrap_err();
    assert!(matches!(zero_err, AttendanceError::DayOutOfRange { day: 0, .. }));
    let month_err = attendance.toggle(&id, 2023, 13, 1).unwrap_err();
    assert!(matches!(
        month_err,
        AttendanceError::InvalidMonth { month: 13, .. }
    ));

    assert!(!store.load_attendance().unwrap().contains_student(&id));
}

#[test]
fn calendar_edge_years_are_rejected_not_panicking() {
    let store = PersistentStore::new(MemoryKvStore::new());
    let attendance = AttendanceService::new(&store);
    let id = StudentId::from("s1");

    assert_eq!(attendance.days_in_month(i32::MAX, 12), 0);
    assert!(!attendance.is_present(&id, i32::MAX, 12, 1).unwrap());

    let toggle_err = attendance.toggle(&id, i32::MAX, 12, 1).unwrap_err();
    assert!(matches!(
        toggle_err,
        AttendanceError::InvalidMonth { year: i32::MAX, month: 12 }
    ));
    let grid_err = attendance.month_grid(i32::MAX, 12, "all").unwrap_err();
    assert!(matches!(grid_err, AttendanceError::InvalidMonth { .. }));

    assert!(!store.load_attendance().unwrap().contains_student(&id));
}

#[test]
fn is_present_on_unknown_student_or_month_is_false() {
    let store = PersistentStore::new(MemoryKvStore::new());
    let attendance = AttendanceService::new(&store);
    let id = StudentId::from("ghost");

    assert!(!attendance.is_present(&id, 2024, 1, 1).unwrap());
    assert!(!attendance.is_present(&id, 2024, 0, 1).unwrap());
    assert!(!store.load_attendance().unwrap().contains_student(&id));
}

#[test]
fn month_grid_filters_by_class_and_initializes_entries() {
    let store = PersistentStore::new(MemoryKvStore::new());
    let clock = ManualClock::new(START_MS);
    let roster = RosterService::new(&store, &clock);
    let attendance = AttendanceService::new(&store);
    let ada = add(&roster, "Ada", 1, "10");
    let ben = add(&roster, "Ben", 2, "9");
    attendance.toggle(&ada, 2024, 4, 30).unwrap();

    let grid = attendance.month_grid(2024, 4, "10").unwrap();
    assert_eq!(grid.month.to_string(), "2024-04");
    assert_eq!(grid.days, 30);
    assert_eq!(grid.rows.len(), 1);
    assert_eq!(grid.rows[0].student_id, ada);
    assert_eq!(grid.rows[0].days.len(), 30);
    assert!(grid.rows[0].days[29]);
    assert!(!grid.rows[0].days[0]);

    let all = attendance.month_grid(2024, 5, "all").unwrap();
    assert_eq!(all.rows.len(), 2);
    assert_eq!(all.days, 31);
    let key = MonthKey::new(2024, 5).unwrap();
    let book = store.load_attendance().unwrap();
    assert!(book.student(&ben).unwrap().month(key).is_some());
    assert!(book.student(&ada).unwrap().month(key).is_some());
}

#[test]
fn month_grid_for_unknown_class_is_empty() {
    let store = PersistentStore::new(MemoryKvStore::new());
    let clock = ManualClock::new(START_MS);
    let roster = RosterService::new(&store, &clock);
    let attendance = AttendanceService::new(&store);
    add(&roster, "Ada", 1, "10");

    let grid = attendance.month_grid(2024, 2, "12").unwrap();
    assert!(grid.rows.is_empty());
    assert_eq!(grid.days, 29);
}
