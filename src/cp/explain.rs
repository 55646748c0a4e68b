//! Conflict explanation for infeasible course sets.
//!
//! Deletion filter: drop each course in turn and re-solve the rest. If the
//! rest is still infeasible the course was not needed for the conflict and
//! stays out; otherwise it goes back in. What remains is a minimal
//! conflicting subset: removing any one member makes the others placeable.
//!
//! Each sub-search gets its own node budget. A sub-search that runs out of
//! budget keeps its course in the core, so the result is still conflicting
//! but may not be minimal.
//!
//! # Reference
//! Junker (2004), "QUICKXPLAIN: Preferred Explanations and Relaxations for
//! Over-Constrained Problems"

use std::time::Instant;

use super::search::{search, SearchLimits, SearchOutcome};
use super::{CancelToken, TimetableModel};
use crate::error::{BlockReason, Blocker, Result, TimetableError};

/// A conflicting course subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Conflict {
    /// Course indices, in input order.
    pub core: Vec<usize>,
    /// False when some sub-search ran out of budget.
    pub minimal: bool,
}

/// Shrinks an infeasible course set to a conflicting core.
pub(crate) fn minimal_conflict(
    model: &TimetableModel<'_>,
    node_budget: u64,
    deadline: Option<Instant>,
    cancel: Option<&CancelToken>,
) -> Result<Conflict> {
    let mut core: Vec<usize> = (0..model.course_count()).collect();
    let mut minimal = true;

    let mut i = 0;
    while i < core.len() {
        let mut rest = core.clone();
        rest.remove(i);

        let limits = SearchLimits {
            max_nodes: node_budget,
            deadline,
            cancel,
        };
        match search(model, &rest, limits).0 {
            SearchOutcome::Infeasible => core = rest,
            SearchOutcome::Solved(_) => i += 1,
            SearchOutcome::NodeLimit | SearchOutcome::TimeLimit => {
                minimal = false;
                i += 1;
            }
            SearchOutcome::Cancelled => return Err(TimetableError::Cancelled),
        }
    }

    Ok(Conflict { core, minimal })
}

/// One blocker per core member, naming the other members.
pub(crate) fn conflict_blockers(model: &TimetableModel<'_>, core: &[usize]) -> Vec<Blocker> {
    core.iter()
        .map(|&c| {
            let course = &model.courses[c];
            let conflicting_with = core
                .iter()
                .filter(|&&other| other != c)
                .map(|&other| model.courses[other].code.clone())
                .collect();
            Blocker {
                course_id: course.id.clone(),
                course_code: course.code.clone(),
                reason: BlockReason::ConflictingDemand { conflicting_with },
            }
        })
        .collect()
}

/// Every course, flagged as part of an unexplained conflict.
pub(crate) fn unexplained_blockers(model: &TimetableModel<'_>) -> Vec<Blocker> {
    model
        .courses
        .iter()
        .map(|course| Blocker {
            course_id: course.id.clone(),
            course_code: course.code.clone(),
            reason: BlockReason::Unexplained,
        })
        .collect()
}
