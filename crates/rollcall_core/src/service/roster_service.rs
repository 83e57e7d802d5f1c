//! Roster use-cases over the Students record.
//!
//! # Responsibility
//! - Add, edit, delete and search students.
//! - Keep the attendance book in step with roster membership.
//!
//! # Invariants
//! - Generated ids never collide with an existing student id.
//! - Deleting a student removes its attendance entry before returning.
//! - Edits and deletes for unknown ids are no-ops, not errors.
//! - `search` and `distinct_classes` recompute from the store on every call.

use crate::clock::Clock;
use crate::model::student::{NewStudent, Student, StudentId, StudentPatch, StudentValidationError};
use crate::store::{KeyValueStore, PersistentStore, StoreError, StoreResult};
use log::info;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Class filter value meaning "every class".
pub const ALL_CLASSES: &str = "all";

/// Roster add failure.
#[derive(Debug)]
pub enum RosterError {
    Validation(StudentValidationError),
    Store(StoreError),
}

impl Display for RosterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RosterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StudentValidationError> for RosterError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RosterError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Roster manager over an injected store and clock.
pub struct RosterService<'a, S: KeyValueStore> {
    store: &'a PersistentStore<S>,
    clock: &'a dyn Clock,
}

impl<'a, S: KeyValueStore> RosterService<'a, S> {
    pub fn new(store: &'a PersistentStore<S>, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Appends a student and opens an empty attendance entry for it.
    pub fn add(&self, input: NewStudent) -> Result<StudentId, RosterError> {
        let mut students = self.store.load_students()?;
        let id = loop {
            let candidate = StudentId::generate(self.clock.now_ms());
            if !students.iter().any(|student| student.id == candidate) {
                break candidate;
            }
        };

        let student = Student::new(id.clone(), input)?;
        students.push(student);
        self.store.save_students(&students)?;

        let mut book = self.store.load_attendance()?;
        if !book.contains_student(&id) {
            book.student_or_create(&id);
            self.store.save_attendance(&book)?;
        }

        info!(
            "event=student_add module=roster status=ok student_id={} roster_size={}",
            id,
            students.len()
        );
        Ok(id)
    }

    /// Merges `patch` into the student. Returns `false` if `id` is unknown.
    pub fn update(&self, id: &StudentId, patch: &StudentPatch) -> StoreResult<bool> {
        let mut students = self.store.load_students()?;
        let Some(student) = students.iter_mut().find(|student| &student.id == id) else {
            return Ok(false);
        };

        student.apply(patch);
        self.store.save_students(&students)?;
        info!("event=student_update module=roster status=ok student_id={id}");
        Ok(true)
    }

    /// Removes the student and its whole attendance entry.
    ///
    /// Returns `false` if `id` is unknown; any stray attendance entry for it
    /// is still dropped.
    pub fn delete(&self, id: &StudentId) -> StoreResult<bool> {
        let mut book = self.store.load_attendance()?;
        if book.remove_student(id) {
            self.store.save_attendance(&book)?;
        }

        let mut students = self.store.load_students()?;
        let before = students.len();
        students.retain(|student| &student.id != id);
        if students.len() == before {
            return Ok(false);
        }

        self.store.save_students(&students)?;
        info!(
            "event=student_delete module=roster status=ok student_id={id} roster_size={}",
            students.len()
        );
        Ok(true)
    }

    pub fn get(&self, id: &StudentId) -> StoreResult<Option<Student>> {
        Ok(self
            .store
            .load_students()?
            .into_iter()
            .find(|student| &student.id == id))
    }

    pub fn list(&self) -> StoreResult<Vec<Student>> {
        self.store.load_students()
    }

    /// Case-insensitive substring search across roll, name, class, section
    /// and mobile. A blank filter returns the whole roster.
    pub fn search(&self, text: &str) -> StoreResult<Vec<Student>> {
        let needle = text.trim().to_lowercase();
        let students = self.store.load_students()?;
        if needle.is_empty() {
            return Ok(students);
        }
        Ok(students
            .into_iter()
            .filter(|student| student.matches(&needle))
            .collect())
    }

    /// Unique trimmed class names in natural order ("2" before "10").
    pub fn distinct_classes(&self) -> StoreResult<Vec<String>> {
        let unique: BTreeSet<String> = self
            .store
            .load_students()?
            .iter()
            .map(|student| student.student_class.trim().to_string())
            .filter(|class| !class.is_empty())
            .collect();
        let mut classes: Vec<String> = unique.into_iter().collect();
        classes.sort_by(|left, right| natural_cmp(left, right));
        Ok(classes)
    }

    /// Stores the two demo students when the roster is empty.
    pub fn seed_demo_if_empty(&self) -> StoreResult<bool> {
        if !self.store.load_students()?.is_empty() {
            return Ok(false);
        }
        self.store.save_students(&demo_roster())?;
        info!("event=roster_seed module=roster status=ok roster_size=2");
        Ok(true)
    }
}

/// Students whose class equals `class`; `"all"` or blank keeps everyone.
pub fn students_in_class(students: Vec<Student>, class: &str) -> Vec<Student> {
    let class = class.trim();
    if class.is_empty() || class == ALL_CLASSES {
        return students;
    }
    students
        .into_iter()
        .filter(|student| student.student_class == class)
        .collect()
}

/// Orders strings with embedded numbers by numeric value.
///
/// Digit runs compare as numbers, other runs case-insensitively; the raw
/// strings break remaining ties.
pub fn natural_cmp(left: &str, right: &str) -> Ordering {
    let left_chunks = chunks(left);
    let right_chunks = chunks(right);

    for (a, b) in left_chunks.iter().zip(right_chunks.iter()) {
        let order = match (a, b) {
            (Chunk::Digits(a), Chunk::Digits(b)) => {
                let a = a.trim_start_matches('0');
                let b = b.trim_start_matches('0');
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
            (Chunk::Text(a), Chunk::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        };
        if order != Ordering::Equal {
            return order;
        }
    }

    left_chunks
        .len()
        .cmp(&right_chunks.len())
        .then_with(|| left.cmp(right))
}

enum Chunk<'s> {
    Digits(&'s str),
    Text(&'s str),
}

fn chunks(value: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = None;

    for (index, ch) in value.char_indices() {
        let is_digit = ch.is_ascii_digit();
        match in_digits {
            Some(previous) if previous != is_digit => {
                out.push(make_chunk(&value[start..index], previous));
                start = index;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }
    if let Some(previous) = in_digits {
        out.push(make_chunk(&value[start..], previous));
    }
    out
}

fn make_chunk(slice: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(slice)
    } else {
        Chunk::Text(slice)
    }
}

fn demo_roster() -> Vec<Student> {
    vec![
        Student {
            id: StudentId::from("s1"),
            name: "John Doe".to_string(),
            roll: 1,
            student_class: "10".to_string(),
            section: "A".to_string(),
            mobile: "9000000001".to_string(),
        },
        Student {
            id: StudentId::from("s2"),
            name: "Jane Smith".to_string(),
            roll: 2,
            student_class: "10".to_string(),
            section: "A".to_string(),
            mobile: "9000000002".to_string(),
        },
    ]
}
