//! Timetable generation pipeline.
//!
//! # Algorithm
//!
//! 1. Validate the input collections and the solver configuration.
//! 2. Encode courses into candidate domains; report every course with an
//!    empty domain, then every course bound to an overbooked faculty
//!    member, classroom or student group.
//! 3. Backtracking search for a clash-free placement.
//! 4. Simulated-annealing pass over the workload objective.
//! 5. Assemble the timetable and re-check it against the input.
//!
//! An infeasible instance is narrowed down to a minimal conflicting
//! course set before it is reported.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::SolverConfig;
use crate::cp::explain::{conflict_blockers, minimal_conflict, unexplained_blockers};
use crate::cp::improve::{improve, ImproveParams};
use crate::cp::search::{search, SearchLimits, SearchOutcome};
use crate::cp::{CancelToken, TimetableCpBuilder, TimetableModel};
use crate::error::{Result, TimetableError};
use crate::models::{Classroom, Course, Faculty, Timetable};
use crate::validation::validate_input;

use super::assemble::assemble;

/// Input container for one generation call.
///
/// Deserializes from `{ "courses": [...], "faculty": [...], "classrooms": [...] }`.
/// Input order matters: it fixes tie-breaking, so the same request always
/// yields the same timetable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimetableRequest {
    /// Courses to place, one weekly hour each.
    pub courses: Vec<Course>,
    /// Teaching staff.
    pub faculty: Vec<Faculty>,
    /// Rooms.
    pub classrooms: Vec<Classroom>,
}

impl TimetableRequest {
    /// Creates a new request.
    pub fn new(courses: Vec<Course>, faculty: Vec<Faculty>, classrooms: Vec<Classroom>) -> Self {
        Self {
            courses,
            faculty,
            classrooms,
        }
    }
}

/// Counters from one successful generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SolveStats {
    /// Search nodes (tentative placements) visited.
    pub nodes: u64,
    /// Placements undone.
    pub backtracks: u64,
    /// Objective of the first feasible timetable.
    pub initial_score: i64,
    /// Objective after improvement.
    pub final_score: i64,
    /// Wall-clock time (ms).
    pub elapsed_ms: u64,
}

/// A generated timetable and how it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub timetable: Timetable,
    pub stats: SolveStats,
}

/// Deterministic timetable generator.
///
/// # Example
///
/// ```
/// use u_timetable::models::{Classroom, Course, Faculty, SlotSet};
/// use u_timetable::scheduler::{TimetableRequest, TimetableScheduler};
///
/// let request = TimetableRequest::new(
///     vec![Course::new("c1", "CS101").with_department("CS").with_student_group("Y1")],
///     vec![Faculty::new("f1", "Dr. Turing")
///         .with_department("CS")
///         .with_availability(SlotSet::full_week())],
///     vec![Classroom::new("r1", "Hall A")],
/// );
///
/// let timetable = TimetableScheduler::default().generate(&request).unwrap();
/// assert_eq!(timetable.entry_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TimetableScheduler {
    config: SolverConfig,
}

impl TimetableScheduler {
    /// Creates a scheduler with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Generates a timetable.
    pub fn generate(&self, request: &TimetableRequest) -> Result<Timetable> {
        self.solve(request, None).map(|s| s.timetable)
    }

    /// Generates a timetable, stopping early once `cancel` fires.
    pub fn generate_with_cancel(
        &self,
        request: &TimetableRequest,
        cancel: &CancelToken,
    ) -> Result<Timetable> {
        self.solve(request, Some(cancel)).map(|s| s.timetable)
    }

    /// Generates a timetable and reports search and objective counters.
    pub fn solve(&self, request: &TimetableRequest, cancel: Option<&CancelToken>) -> Result<Solution> {
        let started = Instant::now();
        let config = &self.config;
        config.validate()?;
        validate_input(&request.courses, &request.faculty, &request.classrooms)
            .map_err(TimetableError::InvalidInput)?;

        info!(
            courses = request.courses.len(),
            faculty = request.faculty.len(),
            classrooms = request.classrooms.len(),
            seed = config.seed,
            "generating timetable"
        );

        let deadline = config.time_limit().map(|limit| started + limit);

        let model = TimetableCpBuilder::new(&request.courses, &request.faculty, &request.classrooms)
            .with_department_policy(config.department_policy)
            .build()
            .map_err(|blockers| {
                warn!(blocked = blockers.len(), "courses without any legal placement");
                TimetableError::UnsatisfiableConstraints { blockers }
            })?;

        let overbooked = model.overbooked();
        if !overbooked.is_empty() {
            warn!(blocked = overbooked.len(), "resources overbooked before search");
            return Err(TimetableError::UnsatisfiableConstraints {
                blockers: overbooked,
            });
        }

        let all: Vec<usize> = (0..model.course_count()).collect();
        let limits = SearchLimits {
            max_nodes: config.max_search_nodes,
            deadline,
            cancel,
        };
        let (outcome, search_stats) = search(&model, &all, limits);
        debug!(
            nodes = search_stats.nodes,
            backtracks = search_stats.backtracks,
            "search finished"
        );

        let choice = match outcome {
            SearchOutcome::Solved(choice) => choice
                .into_iter()
                .collect::<Option<Vec<usize>>>()
                .ok_or_else(|| TimetableError::InternalFault("search left a course unplaced".into()))?,
            SearchOutcome::Infeasible => {
                warn!(nodes = search_stats.nodes, "no clash-free timetable exists");
                return Err(self.explain(&model, deadline, cancel));
            }
            SearchOutcome::NodeLimit | SearchOutcome::TimeLimit => {
                let elapsed_ms = elapsed_ms(started);
                warn!(nodes = search_stats.nodes, elapsed_ms, "search budget exhausted");
                return Err(TimetableError::BudgetExhausted {
                    nodes: search_stats.nodes,
                    elapsed_ms,
                });
            }
            SearchOutcome::Cancelled => return Err(TimetableError::Cancelled),
        };

        let params = ImproveParams {
            seed: config.seed,
            iterations: config.improvement_iterations,
            initial_temperature: config.initial_temperature,
            cooling_rate: config.cooling_rate,
            objective: &config.soft_constraints,
            deadline,
        };
        let improved = improve(&model, choice, &params, cancel)?;
        debug!(
            initial_score = improved.initial_score,
            final_score = improved.final_score,
            accepted_moves = improved.accepted_moves,
            "improvement finished"
        );

        let timetable = assemble(&model, &improved.choice);
        let violations = timetable.verify(&request.courses, &request.faculty, &request.classrooms);
        if let Some(first) = violations.first() {
            return Err(TimetableError::InternalFault(format!(
                "assembled timetable fails verification ({} violations, first: {})",
                violations.len(),
                first.message
            )));
        }

        let stats = SolveStats {
            nodes: search_stats.nodes,
            backtracks: search_stats.backtracks,
            initial_score: improved.initial_score,
            final_score: improved.final_score,
            elapsed_ms: elapsed_ms(started),
        };
        info!(
            entries = timetable.entry_count(),
            score = stats.final_score,
            elapsed_ms = stats.elapsed_ms,
            "timetable generated"
        );

        Ok(Solution { timetable, stats })
    }

    /// Turns a proven infeasibility into a blocker list.
    fn explain(
        &self,
        model: &TimetableModel<'_>,
        deadline: Option<Instant>,
        cancel: Option<&CancelToken>,
    ) -> TimetableError {
        let config = &self.config;
        if !config.explain_conflicts || model.course_count() > config.max_explained_courses {
            return TimetableError::UnsatisfiableConstraints {
                blockers: unexplained_blockers(model),
            };
        }

        match minimal_conflict(model, config.explain_node_budget, deadline, cancel) {
            Ok(conflict) => {
                if !conflict.minimal {
                    debug!(size = conflict.core.len(), "conflict set may not be minimal");
                }
                TimetableError::UnsatisfiableConstraints {
                    blockers: conflict_blockers(model, &conflict.core),
                }
            }
            Err(e) => e,
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
