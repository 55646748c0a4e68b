//! Input validation for timetabling problems.
//!
//! Checks structural integrity of courses, faculty and classrooms before
//! encoding. Detects:
//! - Empty input collections
//! - Duplicate IDs, course codes and display names
//! - Blank course fields the timetable invariants depend on
//!
//! Satisfiability is not checked here; the encoder and search report
//! courses that cannot be placed.

use crate::models::{Classroom, Course, Faculty};
use std::collections::HashSet;
use std::fmt;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// No courses, faculty or classrooms were supplied.
    EmptyCollection,
    /// Two entities share the same ID.
    DuplicateId,
    /// Two courses share the same code.
    DuplicateCode,
    /// Two faculty members or two classrooms share a display name.
    DuplicateName,
    /// A course field required for scheduling is blank.
    MissingField,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates the input data for a timetabling problem.
///
/// Checks:
/// 1. At least one course, faculty member and classroom
/// 2. No duplicate course, faculty or classroom IDs
/// 3. No duplicate course codes
/// 4. No duplicate faculty or classroom names (entries refer to them by name)
/// 5. Every course has a code, department and student group
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    courses: &[Course],
    faculty: &[Faculty],
    classrooms: &[Classroom],
) -> ValidationResult {
    let mut errors = Vec::new();

    for (len, what) in [
        (courses.len(), "courses"),
        (faculty.len(), "faculty"),
        (classrooms.len(), "classrooms"),
    ] {
        if len == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyCollection,
                format!("No {what} supplied; add at least one before generating a timetable"),
            ));
        }
    }

    check_unique(
        courses.iter().map(|c| c.id.as_str()),
        ValidationErrorKind::DuplicateId,
        "course ID",
        &mut errors,
    );
    check_unique(
        courses.iter().map(|c| c.code.as_str()),
        ValidationErrorKind::DuplicateCode,
        "course code",
        &mut errors,
    );
    check_unique(
        faculty.iter().map(|f| f.id.as_str()),
        ValidationErrorKind::DuplicateId,
        "faculty ID",
        &mut errors,
    );
    check_unique(
        faculty.iter().map(|f| f.name.as_str()),
        ValidationErrorKind::DuplicateName,
        "faculty name",
        &mut errors,
    );
    check_unique(
        classrooms.iter().map(|r| r.id.as_str()),
        ValidationErrorKind::DuplicateId,
        "classroom ID",
        &mut errors,
    );
    check_unique(
        classrooms.iter().map(|r| r.name.as_str()),
        ValidationErrorKind::DuplicateName,
        "classroom name",
        &mut errors,
    );

    for course in courses {
        for (value, field) in [
            (&course.code, "code"),
            (&course.department, "department"),
            (&course.student_group, "student group"),
        ] {
            if value.trim().is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingField,
                    format!("Course '{}' has no {field}", course.id),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_unique<'a>(
    values: impl Iterator<Item = &'a str>,
    kind: ValidationErrorKind,
    what: &str,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            errors.push(ValidationError::new(
                kind.clone(),
                format!("Duplicate {what}: {value}"),
            ));
        }
    }
}
