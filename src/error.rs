//! Error types for timetable generation.
//!
//! Every failure a caller can see is a [`TimetableError`]. The variants
//! separate bad input (fix the data), proven infeasibility (fix the data,
//! guided by the [`Blocker`] list), an exhausted budget (relax or retry)
//! and faults in the crate itself.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::validation::ValidationError;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TimetableError>;

/// Timetable generation failure.
#[derive(Debug, Error)]
pub enum TimetableError {
    /// Input failed structural validation; nothing was solved.
    #[error("invalid input: {}", join(.0))]
    InvalidInput(Vec<ValidationError>),

    /// No assignment satisfies the hard constraints.
    #[error("unsatisfiable constraints: {}", join(.blockers))]
    UnsatisfiableConstraints { blockers: Vec<Blocker> },

    /// The search budget ran out before a timetable or a proof was found.
    #[error(
        "no timetable found within budget ({nodes} search nodes, {elapsed_ms} ms); \
         relax constraints or retry with a larger budget"
    )]
    BudgetExhausted { nodes: u64, elapsed_ms: u64 },

    /// The solve was cancelled, typically by a newer generation request.
    #[error("generation cancelled")]
    Cancelled,

    /// The solver ended in a state it should never reach.
    #[error("internal solver fault: {0}")]
    InternalFault(String),

    /// The solver configuration is unusable.
    #[error("invalid solver configuration: {0}")]
    Config(String),
}

impl TimetableError {
    /// Blocking courses for an unsatisfiable result, empty otherwise.
    pub fn blockers(&self) -> &[Blocker] {
        match self {
            Self::UnsatisfiableConstraints { blockers } => blockers,
            _ => &[],
        }
    }

    /// Short machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::UnsatisfiableConstraints { .. } => "unsatisfiable_constraints",
            Self::BudgetExhausted { .. } => "budget_exhausted",
            Self::Cancelled => "cancelled",
            Self::InternalFault(_) => "internal_fault",
            Self::Config(_) => "config",
        }
    }
}

/// A course that cannot be placed, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Blocker {
    pub course_id: String,
    pub course_code: String,
    pub reason: BlockReason,
}

/// Why a course cannot be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum BlockReason {
    /// No faculty member teaches for the course's department.
    NoQualifiedFaculty { department: String },
    /// Qualified faculty exist but none has any availability.
    NoAvailableFaculty { department: String },
    /// No classroom provides all required equipment. `missing_equipment`
    /// lists tags that no classroom offers at all.
    NoSuitableClassroom { missing_equipment: Vec<String> },
    /// Qualified faculty and suitable rooms exist but never in the same
    /// open cell.
    NoFreeSlot,
    /// A faculty member, classroom or student group is the only option for
    /// more courses than it has usable cells.
    Overbooked {
        resource: String,
        demand: usize,
        cells: usize,
    },
    /// Each course can be placed alone, but this group of courses cannot
    /// all be placed together. Lists the other members by code.
    ConflictingDemand { conflicting_with: Vec<String> },
    /// Part of an infeasible instance too large to narrow down.
    Unexplained,
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.course_code, self.course_id, self.reason)
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoQualifiedFaculty { department } => {
                write!(f, "no faculty member teaches for '{department}'")
            }
            Self::NoAvailableFaculty { department } => {
                write!(f, "no '{department}' faculty member has any availability")
            }
            Self::NoSuitableClassroom { missing_equipment } if !missing_equipment.is_empty() => {
                write!(f, "no classroom offers {}", missing_equipment.join(", "))
            }
            Self::NoSuitableClassroom { .. } => {
                f.write_str("no single classroom offers all required equipment")
            }
            Self::NoFreeSlot => {
                f.write_str("qualified faculty and suitable classrooms are never free together")
            }
            Self::Overbooked {
                resource,
                demand,
                cells,
            } => write!(
                f,
                "{resource} is needed for {demand} classes but has only {cells} usable hours"
            ),
            Self::ConflictingDemand { conflicting_with } => {
                write!(f, "cannot be placed together with {}", conflicting_with.join(", "))
            }
            Self::Unexplained => f.write_str("part of an infeasible course set"),
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
