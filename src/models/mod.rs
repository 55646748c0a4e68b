//! Timetabling domain models.
//!
//! Provides the data types for describing a department's week and the
//! timetable produced for it.
//!
//! # Domain Mappings
//!
//! | u-timetable | Solver role | Exclusive per cell |
//! |-------------|-------------|--------------------|
//! | Course | Variable | Student group |
//! | Faculty | Resource (with availability) | Yes |
//! | Classroom | Resource (with equipment) | Yes |
//! | SlotCell | Domain coordinate | - |
//! | Timetable | Solution | - |

mod calendar;
mod constraint;
mod course;
mod resource;
mod timetable;

pub use calendar::{
    DaySlots, SlotCell, SlotSet, TimeSlot, Weekday, CELL_COUNT, DAYS_PER_WEEK, SLOTS_PER_DAY,
};
pub use constraint::{DepartmentPolicy, SoftConstraint};
pub use course::Course;
pub use resource::{Classroom, Faculty};
pub use timetable::{ScheduleEntry, Timetable, Violation, ViolationType};
