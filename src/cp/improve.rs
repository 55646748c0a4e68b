//! Workload improvement by simulated annealing.
//!
//! Starts from a feasible placement and applies random moves that keep
//! every hard constraint satisfied:
//! - **Relocate**: move one course to another candidate from its domain.
//! - **Swap**: two courses exchange cells, each keeping its own faculty
//!   member and classroom.
//!
//! A move that lowers the objective is always accepted; a worsening move
//! is accepted with probability `exp(-delta / T)`. The best placement seen
//! is returned. All randomness comes from a seeded `StdRng`.
//!
//! # Occupancy
//! The week has 40 cells, so each faculty member, classroom and student
//! group keeps its busy cells in one `u64` bitmask.
//!
//! # Reference
//! Kirkpatrick et al. (1983), "Optimization by Simulated Annealing"

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

use super::{CancelToken, Candidate, TimetableModel};
use crate::error::{Result, TimetableError};
use crate::models::{SoftConstraint, DAYS_PER_WEEK, SLOTS_PER_DAY};

/// Annealing parameters.
#[derive(Debug, Clone)]
pub(crate) struct ImproveParams<'c> {
    pub seed: u64,
    pub iterations: u32,
    pub initial_temperature: f64,
    pub cooling_rate: f64,
    pub objective: &'c [SoftConstraint],
    pub deadline: Option<Instant>,
}

/// Result of an improvement run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Improvement {
    /// Candidate index per course.
    pub choice: Vec<usize>,
    pub initial_score: i64,
    pub final_score: i64,
    pub accepted_moves: u32,
}

/// Anneals a feasible `choice` and returns the best placement seen.
pub(crate) fn improve(
    model: &TimetableModel<'_>,
    choice: Vec<usize>,
    params: &ImproveParams<'_>,
    cancel: Option<&CancelToken>,
) -> Result<Improvement> {
    let mut state = Occupancy::from_choice(model, &choice);
    let mut current = choice;
    let mut current_score = state.score(model, params.objective);
    let initial_score = current_score;

    let mut best = current.clone();
    let mut best_score = current_score;
    let mut accepted_moves = 0;

    let n = model.course_count();
    if n == 0 || params.objective.is_empty() || params.iterations == 0 {
        return Ok(Improvement {
            choice: best,
            initial_score,
            final_score: best_score,
            accepted_moves,
        });
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut temperature = params.initial_temperature;

    for iteration in 0..params.iterations {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(TimetableError::Cancelled);
        }
        if iteration % 128 == 0 {
            if let Some(deadline) = params.deadline {
                if Instant::now() >= deadline {
                    break;
                }
            }
        }
        if best_score == 0 {
            break;
        }

        let a = rng.random_range(0..n);
        let applied = if n > 1 && rng.random_bool(0.3) {
            let mut b = rng.random_range(0..n - 1);
            if b >= a {
                b += 1;
            }
            state.try_swap(model, &mut current, a, b)
        } else {
            let k = rng.random_range(0..model.domains[a].len());
            state.try_relocate(model, &mut current, a, k)
        };

        if let Some(undo) = applied {
            let new_score = state.score(model, params.objective);
            let delta = new_score.saturating_sub(current_score);
            let accept = delta <= 0
                || (temperature > 1e-9 && rng.random::<f64>() < (-(delta as f64) / temperature).exp());

            if accept {
                current_score = new_score;
                accepted_moves += 1;
                if current_score < best_score {
                    best_score = current_score;
                    best.clone_from(&current);
                }
            } else {
                state.revert(model, &mut current, undo);
            }
        }

        temperature *= params.cooling_rate;
    }

    Ok(Improvement {
        choice: best,
        initial_score,
        final_score: best_score,
        accepted_moves,
    })
}

/// Previous candidate indices of the courses a move touched.
#[derive(Debug, Clone, Copy)]
enum Undo {
    One(usize, usize),
    Two((usize, usize), (usize, usize)),
}

/// Busy-cell bitmasks per faculty member, classroom and student group.
struct Occupancy {
    faculty: Vec<u64>,
    rooms: Vec<u64>,
    groups: Vec<u64>,
}

impl Occupancy {
    fn from_choice(model: &TimetableModel<'_>, choice: &[usize]) -> Self {
        let mut state = Self {
            faculty: vec![0; model.faculty.len()],
            rooms: vec![0; model.classrooms.len()],
            groups: vec![0; model.group_count],
        };
        for (course, &k) in choice.iter().enumerate() {
            state.occupy(model, course, model.domains[course][k]);
        }
        state
    }

    fn occupy(&mut self, model: &TimetableModel<'_>, course: usize, c: Candidate) {
        let bit = 1u64 << c.cell.index();
        self.faculty[c.faculty] |= bit;
        self.rooms[c.classroom] |= bit;
        self.groups[model.groups[course]] |= bit;
    }

    fn release(&mut self, model: &TimetableModel<'_>, course: usize, c: Candidate) {
        let bit = !(1u64 << c.cell.index());
        self.faculty[c.faculty] &= bit;
        self.rooms[c.classroom] &= bit;
        self.groups[model.groups[course]] &= bit;
    }

    fn is_free(&self, model: &TimetableModel<'_>, course: usize, c: Candidate) -> bool {
        let bit = 1u64 << c.cell.index();
        (self.faculty[c.faculty] | self.rooms[c.classroom] | self.groups[model.groups[course]]) & bit
            == 0
    }

    fn try_relocate(
        &mut self,
        model: &TimetableModel<'_>,
        choice: &mut [usize],
        course: usize,
        k: usize,
    ) -> Option<Undo> {
        let old = choice[course];
        if old == k {
            return None;
        }
        let from = model.domains[course][old];
        let to = model.domains[course][k];

        self.release(model, course, from);
        if !self.is_free(model, course, to) {
            self.occupy(model, course, from);
            return None;
        }
        self.occupy(model, course, to);
        choice[course] = k;
        Some(Undo::One(course, old))
    }

    fn try_swap(
        &mut self,
        model: &TimetableModel<'_>,
        choice: &mut [usize],
        a: usize,
        b: usize,
    ) -> Option<Undo> {
        let (old_a, old_b) = (choice[a], choice[b]);
        let ca = model.domains[a][old_a];
        let cb = model.domains[b][old_b];
        if ca.cell == cb.cell {
            return None;
        }

        let new_a = model.domains[a]
            .binary_search(&Candidate { cell: cb.cell, ..ca })
            .ok()?;
        let new_b = model.domains[b]
            .binary_search(&Candidate { cell: ca.cell, ..cb })
            .ok()?;
        let (na, nb) = (model.domains[a][new_a], model.domains[b][new_b]);

        self.release(model, a, ca);
        self.release(model, b, cb);
        if self.is_free(model, a, na) {
            self.occupy(model, a, na);
            if self.is_free(model, b, nb) {
                self.occupy(model, b, nb);
                choice[a] = new_a;
                choice[b] = new_b;
                return Some(Undo::Two((a, old_a), (b, old_b)));
            }
            self.release(model, a, na);
        }
        self.occupy(model, a, ca);
        self.occupy(model, b, cb);
        None
    }

    fn revert(&mut self, model: &TimetableModel<'_>, choice: &mut [usize], undo: Undo) {
        let (moves, len) = match undo {
            Undo::One(c, k) => ([(c, k), (c, k)], 1),
            Undo::Two(x, y) => ([x, y], 2),
        };
        let moves = &moves[..len];
        for &(course, _) in moves {
            self.release(model, course, model.domains[course][choice[course]]);
        }
        for &(course, old) in moves {
            choice[course] = old;
            self.occupy(model, course, model.domains[course][old]);
        }
    }

    /// Weighted soft-constraint score. Lower is better.
    fn score(&self, model: &TimetableModel<'_>, objective: &[SoftConstraint]) -> i64 {
        let loads: Vec<i64> = model
            .eligible_faculty
            .iter()
            .map(|&f| i64::from(self.faculty[f].count_ones()))
            .collect();

        objective
            .iter()
            .map(|constraint| match *constraint {
                SoftConstraint::WorkloadBalance { weight } => {
                    let max = loads.iter().copied().max().unwrap_or(0);
                    let min = loads.iter().copied().min().unwrap_or(0);
                    weight.saturating_mul(max - min)
                }
                SoftConstraint::ConsecutiveHours { max_hours, weight } => {
                    let excess: i64 = model
                        .eligible_faculty
                        .iter()
                        .map(|&f| consecutive_excess(self.faculty[f], max_hours))
                        .sum();
                    weight.saturating_mul(excess)
                }
                SoftConstraint::LoadSpread { weight } => {
                    weight.saturating_mul(loads.iter().map(|l| l * l).sum::<i64>())
                }
            })
            .fold(0i64, i64::saturating_add)
    }
}

/// Hours beyond `max_hours` across all same-day runs in a busy mask.
pub(crate) fn consecutive_excess(mask: u64, max_hours: u8) -> i64 {
    let mut excess = 0;
    for day in 0..DAYS_PER_WEEK {
        let bits = (mask >> (day * SLOTS_PER_DAY)) & 0xFF;
        let mut run = 0i64;
        for slot in 0..SLOTS_PER_DAY {
            if bits & (1 << slot) != 0 {
                run += 1;
                if run > i64::from(max_hours) {
                    excess += 1;
                }
            } else {
                run = 0;
            }
        }
    }
    excess
}
