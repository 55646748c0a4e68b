//! Teaching resources: faculty and classrooms.
//!
//! Both are exclusive per cell: a faculty member teaches at most one class
//! in a cell, and a classroom hosts at most one class in a cell.
//!
//! # Availability
//! Faculty declare the cells they *can* teach. Classrooms are available
//! everywhere except their blocked cells, which override everything else.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{SlotCell, SlotSet};

/// A faculty member who can teach courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    /// Unique faculty identifier.
    pub id: String,
    /// Display name. Timetable entries refer to faculty by name.
    pub name: String,
    /// Home department.
    pub department: String,
    /// Other departments this person may teach for.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub eligible_departments: BTreeSet<String>,
    /// Cells this person is available to teach.
    #[serde(default)]
    pub availability: SlotSet,
}

/// A classroom that hosts courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classroom {
    /// Unique classroom identifier.
    pub id: String,
    /// Display name. Timetable entries refer to rooms by name.
    pub name: String,
    /// Seats. Carried for display; not a scheduling constraint.
    #[serde(default)]
    pub capacity: u32,
    /// Equipment tags the room provides.
    #[serde(default)]
    pub available_equipment: BTreeSet<String>,
    /// Cells in which the room cannot be used.
    #[serde(default, skip_serializing_if = "SlotSet::is_empty")]
    pub blocked: SlotSet,
}

impl Faculty {
    /// Creates a faculty member with no availability.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            department: String::new(),
            eligible_departments: BTreeSet::new(),
            availability: SlotSet::new(),
        }
    }

    /// Sets the home department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    /// Adds another department this person may teach for.
    pub fn with_eligible_department(mut self, department: impl Into<String>) -> Self {
        self.eligible_departments.insert(department.into());
        self
    }

    /// Sets the availability.
    pub fn with_availability(mut self, availability: SlotSet) -> Self {
        self.availability = availability;
        self
    }

    /// Whether this person may teach for `department`.
    pub fn teaches_for(&self, department: &str) -> bool {
        self.department == department || self.eligible_departments.contains(department)
    }

    /// Whether this person is available in a cell.
    #[inline]
    pub fn is_available(&self, cell: SlotCell) -> bool {
        self.availability.contains(cell)
    }
}

impl Classroom {
    /// Creates a classroom with no equipment.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capacity: 0,
            available_equipment: BTreeSet::new(),
            blocked: SlotSet::new(),
        }
    }

    /// Sets the capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Adds an equipment tag.
    pub fn with_equipment(mut self, tag: impl Into<String>) -> Self {
        self.available_equipment.insert(tag.into());
        self
    }

    /// Blocks a cell.
    pub fn with_blocked(mut self, cell: SlotCell) -> Self {
        self.blocked.insert(cell);
        self
    }

    /// Whether the room provides a tag.
    pub fn has_equipment(&self, tag: &str) -> bool {
        self.available_equipment.contains(tag)
    }

    /// Whether the room can be used in a cell.
    #[inline]
    pub fn is_open(&self, cell: SlotCell) -> bool {
        !self.blocked.contains(cell)
    }
}
