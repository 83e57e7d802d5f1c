//! Student roster record.
//!
//! # Responsibility
//! - Define the persisted student shape, its creation rules and merge-style
//!   edits.
//!
//! # Invariants
//! - `id` is opaque and never reused within one roster.
//! - Text fields are stored trimmed and non-blank.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const RANDOM_SUFFIX_CHARS: usize = 5;

/// Opaque student identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates `s_<millis>_<5 random chars>`.
    ///
    /// Uniqueness against an existing roster is the caller's job.
    pub fn generate(now_ms: i64) -> Self {
        let random = Uuid::new_v4().simple().to_string();
        Self(format!(
            "s_{now_ms}_{}",
            &random[..RANDOM_SUFFIX_CHARS]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StudentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for StudentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Required text field that was blank after trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentValidationError {
    BlankField(&'static str),
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "student {field} must not be blank"),
        }
    }
}

impl Error for StudentValidationError {}

/// Persisted student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub roll: u32,
    pub student_class: String,
    pub section: String,
    pub mobile: String,
}

/// Roster form input for a new student.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub roll: u32,
    pub student_class: String,
    pub section: String,
    pub mobile: String,
}

/// Partial edit. `None` and blank strings keep the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub roll: Option<u32>,
    pub student_class: Option<String>,
    pub section: Option<String>,
    pub mobile: Option<String>,
}

impl Student {
    /// Validates `input` and assigns `id`.
    pub fn new(id: StudentId, input: NewStudent) -> Result<Self, StudentValidationError> {
        Ok(Self {
            id,
            name: required("name", &input.name)?,
            roll: input.roll,
            student_class: required("class", &input.student_class)?,
            section: required("section", &input.section)?,
            mobile: required("mobile", &input.mobile)?,
        })
    }

    /// Merges `patch` into this record.
    pub fn apply(&mut self, patch: &StudentPatch) {
        merge_text(&mut self.name, patch.name.as_deref());
        if let Some(roll) = patch.roll {
            self.roll = roll;
        }
        merge_text(&mut self.student_class, patch.student_class.as_deref());
        merge_text(&mut self.section, patch.section.as_deref());
        merge_text(&mut self.mobile, patch.mobile.as_deref());
    }

    /// Case-insensitive substring match over the roster columns.
    ///
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        [
            self.roll.to_string().as_str(),
            self.name.as_str(),
            self.student_class.as_str(),
            self.section.as_str(),
            self.mobile.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

fn required(field: &'static str, value: &str) -> Result<String, StudentValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StudentValidationError::BlankField(field));
    }
    Ok(trimmed.to_string())
}

fn merge_text(target: &mut String, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) {
        *target = value.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::{NewStudent, Student, StudentId, StudentPatch, StudentValidationError};

    fn input() -> NewStudent {
        NewStudent {
            name: " Ada ".to_string(),
            roll: 7,
            student_class: "10".to_string(),
            section: "B".to_string(),
            mobile: "9000000007".to_string(),
        }
    }

    #[test]
    fn generated_id_has_prefix_timestamp_and_suffix() {
        let id = StudentId::generate(1_700_000_000_000);
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "s");
        assert_eq!(parts[1], "1700000000000");
        assert_eq!(parts[2].len(), 5);
    }

    #[test]
    fn new_trims_fields_and_rejects_blank_ones() {
        let student = Student::new(StudentId::from("s1"), input()).unwrap();
        assert_eq!(student.name, "Ada");

        let mut blank = input();
        blank.section = "   ".to_string();
        let err = Student::new(StudentId::from("s2"), blank).unwrap_err();
        assert_eq!(err, StudentValidationError::BlankField("section"));
    }

    #[test]
    fn patch_keeps_values_for_blank_or_missing_fields() {
        let mut student = Student::new(StudentId::from("s1"), input()).unwrap();
        student.apply(&StudentPatch {
            name: Some("  ".to_string()),
            roll: Some(9),
            mobile: Some(" 9111111111 ".to_string()),
            ..StudentPatch::default()
        });
        assert_eq!(student.name, "Ada");
        assert_eq!(student.roll, 9);
        assert_eq!(student.mobile, "9111111111");
        assert_eq!(student.student_class, "10");
    }

    #[test]
    fn serialized_fields_use_camel_case() {
        let student = Student::new(StudentId::from("s1"), input()).unwrap();
        let json = serde_json::to_value(&student).unwrap();
        assert_eq!(json["id"], "s1");
        assert_eq!(json["studentClass"], "10");
        assert_eq!(json["roll"], 7);
    }
}
