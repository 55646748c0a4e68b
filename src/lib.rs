//! Deterministic university timetabling.
//!
//! Places every course into the weekly teaching grid (Monday to Friday,
//! eight one-hour slots from 09:00 to 17:00) with a faculty member and a
//! classroom, such that nobody and nothing is double-booked, faculty teach
//! only when available and rooms carry the equipment each course needs.
//! Among valid timetables it prefers an even teaching load.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Course`, `Faculty`, `Classroom`,
//!   `Weekday`, `TimeSlot`, `SlotSet`, `Timetable`, `SoftConstraint`
//! - **`validation`**: Input integrity checks (empty collections, duplicate IDs, codes and names)
//! - **`cp`**: Constraint encoding, backtracking search, workload improvement and conflict explanation
//! - **`scheduler`**: `TimetableScheduler` pipeline, `TimetableKpi`, `GenerationGate`
//! - **`config`**: `SolverConfig` (budgets, seed, objective weights)
//! - **`error`**: `TimetableError` and per-course `Blocker` reasons
//!
//! # Example
//!
//! ```
//! use u_timetable::models::{Classroom, Course, Faculty, SlotSet, Weekday};
//! use u_timetable::scheduler::{TimetableRequest, TimetableScheduler};
//! use u_timetable::SolverConfig;
//!
//! let request = TimetableRequest::new(
//!     vec![
//!         Course::new("c1", "CS201").with_department("CS").with_student_group("Year 2 CS"),
//!         Course::new("c2", "CS461").with_department("CS").with_student_group("Year 4 CS"),
//!     ],
//!     vec![Faculty::new("f1", "Dr. Alan Turing")
//!         .with_department("CS")
//!         .with_availability(SlotSet::new().with_whole_day(Weekday::Monday))],
//!     vec![Classroom::new("r1", "Hall A")],
//! );
//!
//! let scheduler = TimetableScheduler::new(SolverConfig::default().with_seed(7));
//! let timetable = scheduler.generate(&request).unwrap();
//! assert_eq!(timetable.day(Weekday::Monday).len(), 2);
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", Ch. 6

pub mod config;
pub mod cp;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use config::SolverConfig;
pub use error::{BlockReason, Blocker, Result, TimetableError};
