//! Solver configuration.
//!
//! All fields have defaults, so a partial JSON document (or `{}`) is a
//! valid configuration.
//!
//! # Example
//! ```
//! use u_timetable::config::SolverConfig;
//!
//! let config = SolverConfig::from_json_str(r#"{ "seed": 7, "improvement_iterations": 100 }"#).unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.improvement_iterations, 100);
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, TimetableError};
use crate::models::{DepartmentPolicy, SoftConstraint};

/// Largest accepted soft-constraint weight.
pub const MAX_WEIGHT: i64 = 1_000_000;

/// Search, improvement and objective settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Seed for the improvement pass. Same input + same seed = same timetable.
    pub seed: u64,
    /// Maximum number of search nodes (tentative assignments).
    pub max_search_nodes: u64,
    /// Optional wall-clock limit for the whole solve (ms).
    pub time_limit_ms: Option<u64>,
    /// Improvement iterations after a feasible timetable is found.
    /// Zero disables the pass.
    pub improvement_iterations: u32,
    /// Starting temperature for simulated annealing.
    pub initial_temperature: f64,
    /// Per-iteration temperature multiplier, in (0, 1].
    pub cooling_rate: f64,
    /// Which faculty may teach which courses.
    pub department_policy: DepartmentPolicy,
    /// Improvement objective.
    pub soft_constraints: Vec<SoftConstraint>,
    /// Narrow unsatisfiable inputs down to a minimal conflicting course set.
    pub explain_conflicts: bool,
    /// Skip explanation above this many courses.
    pub max_explained_courses: usize,
    /// Node budget for each sub-search during explanation.
    pub explain_node_budget: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_search_nodes: 1_000_000,
            time_limit_ms: None,
            improvement_iterations: 5_000,
            initial_temperature: 2.0,
            cooling_rate: 0.999,
            department_policy: DepartmentPolicy::Strict,
            soft_constraints: SoftConstraint::defaults(),
            explain_conflicts: true,
            max_explained_courses: 40,
            explain_node_budget: 50_000,
        }
    }
}

impl SolverConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| TimetableError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the improvement seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the search node budget.
    pub fn with_max_search_nodes(mut self, nodes: u64) -> Self {
        self.max_search_nodes = nodes;
        self
    }

    /// Sets the wall-clock limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_ms = Some(limit.as_millis() as u64);
        self
    }

    /// Sets the number of improvement iterations.
    pub fn with_improvement_iterations(mut self, iterations: u32) -> Self {
        self.improvement_iterations = iterations;
        self
    }

    /// Sets the department policy.
    pub fn with_department_policy(mut self, policy: DepartmentPolicy) -> Self {
        self.department_policy = policy;
        self
    }

    /// Replaces the improvement objective.
    pub fn with_soft_constraints(mut self, constraints: Vec<SoftConstraint>) -> Self {
        self.soft_constraints = constraints;
        self
    }

    /// Enables or disables conflict explanation.
    pub fn with_conflict_explanation(mut self, enabled: bool) -> Self {
        self.explain_conflicts = enabled;
        self
    }

    /// Wall-clock limit as a `Duration`.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    /// Rejects settings the solver cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_search_nodes == 0 {
            return Err(TimetableError::Config(
                "max_search_nodes must be positive".into(),
            ));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate <= 1.0) {
            return Err(TimetableError::Config(format!(
                "cooling_rate must be in (0, 1], got {}",
                self.cooling_rate
            )));
        }
        if !self.initial_temperature.is_finite() || self.initial_temperature < 0.0 {
            return Err(TimetableError::Config(format!(
                "initial_temperature must be a finite non-negative number, got {}",
                self.initial_temperature
            )));
        }
        for constraint in &self.soft_constraints {
            if !(0..=MAX_WEIGHT).contains(&constraint.weight()) {
                return Err(TimetableError::Config(format!(
                    "soft constraint weights must be in 0..={MAX_WEIGHT}: {constraint:?}"
                )));
            }
            if let SoftConstraint::ConsecutiveHours { max_hours: 0, .. } = constraint {
                return Err(TimetableError::Config(
                    "consecutive_hours.max_hours must be at least 1".into(),
                ));
            }
        }
        Ok(())
    }
}
