//! Timetabling constraints.
//!
//! Hard constraints are fixed and always enforced: per-cell exclusivity of
//! faculty, classrooms and student groups; faculty availability; room
//! equipment coverage; room blocked cells; department eligibility (as
//! governed by [`DepartmentPolicy`]).
//!
//! Soft constraints shape the improvement pass that runs after a feasible
//! timetable is found. They are weighted penalties, lower total = better.

use serde::{Deserialize, Serialize};

/// Which faculty may teach a course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentPolicy {
    /// Faculty must belong to, or be eligible for, the course's department.
    #[default]
    Strict,
    /// Any faculty member may teach any course.
    Any,
}

/// A weighted soft constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SoftConstraint {
    /// Penalizes `max load - min load` across eligible faculty.
    WorkloadBalance { weight: i64 },

    /// Penalizes each hour a faculty member teaches beyond `max_hours`
    /// in a run of back-to-back slots on the same day.
    ConsecutiveHours { max_hours: u8, weight: i64 },

    /// Penalizes the sum of squared faculty loads. Smooths the balance
    /// objective so the search can make progress between plateaus.
    LoadSpread { weight: i64 },
}

impl SoftConstraint {
    /// Creates a workload-balance constraint.
    pub fn workload_balance(weight: i64) -> Self {
        Self::WorkloadBalance { weight }
    }

    /// Creates a consecutive-hours constraint.
    pub fn consecutive_hours(max_hours: u8, weight: i64) -> Self {
        Self::ConsecutiveHours { max_hours, weight }
    }

    /// Creates a load-spread constraint.
    pub fn load_spread(weight: i64) -> Self {
        Self::LoadSpread { weight }
    }

    /// The default objective: balance first, then short runs, then spread.
    pub fn defaults() -> Vec<SoftConstraint> {
        vec![
            Self::workload_balance(10),
            Self::consecutive_hours(2, 3),
            Self::load_spread(1),
        ]
    }

    /// Weight of this constraint.
    pub fn weight(&self) -> i64 {
        match self {
            Self::WorkloadBalance { weight }
            | Self::ConsecutiveHours { weight, .. }
            | Self::LoadSpread { weight } => *weight,
        }
    }
}
