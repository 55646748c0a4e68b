//! Course model.
//!
//! A course is the unit being timetabled: one weekly one-hour meeting
//! that needs a qualified faculty member, a suitably equipped classroom,
//! and a cell where its student group is free.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A course to be scheduled exactly once per week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique course identifier.
    pub id: String,
    /// Human-readable name, e.g. "Data Structures".
    pub name: String,
    /// Unique course code, e.g. "CS201".
    pub code: String,
    /// Offering department. Faculty eligibility is matched against this.
    pub department: String,
    /// Student cohort attending, e.g. "Year 2 CS". A group attends at most
    /// one class per cell.
    pub student_group: String,
    /// Equipment tags the room must provide.
    #[serde(default)]
    pub required_equipment: BTreeSet<String>,
}

impl Course {
    /// Creates a course with the given ID and code.
    pub fn new(id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            code: code.into(),
            department: String::new(),
            student_group: String::new(),
            required_equipment: BTreeSet::new(),
        }
    }

    /// Sets the course name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    /// Sets the student group.
    pub fn with_student_group(mut self, group: impl Into<String>) -> Self {
        self.student_group = group.into();
        self
    }

    /// Adds a required equipment tag.
    pub fn with_equipment(mut self, tag: impl Into<String>) -> Self {
        self.required_equipment.insert(tag.into());
        self
    }

    /// Whether a room offering `available` covers this course's needs.
    pub fn is_satisfied_by(&self, available: &BTreeSet<String>) -> bool {
        self.required_equipment.is_subset(available)
    }

    /// Required tags missing from `available`, in sorted order.
    pub fn missing_equipment(&self, available: &BTreeSet<String>) -> Vec<String> {
        self.required_equipment
            .difference(available)
            .cloned()
            .collect()
    }
}
