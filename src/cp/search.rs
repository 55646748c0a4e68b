//! Backtracking search with forward checking.
//!
//! # Algorithm
//! 1. Pick the unassigned course with the fewest live candidates
//!    (ties: course code, then input position).
//! 2. Try its live candidates, least-loaded faculty first, then in
//!    domain order.
//! 3. After each tentative placement, prune every clashing candidate from
//!    the other unassigned courses, recording removals on a trail.
//! 4. If a domain is wiped out, undo the trail and try the next candidate;
//!    if none is left, backtrack.
//!
//! Every choice is made in a fixed order, so the first solution found
//! depends only on the input order.
//!
//! # Reference
//! Haralick & Elliott (1980), "Increasing Tree Search Efficiency for
//! Constraint Satisfaction Problems"

use std::time::Instant;

use super::{CancelToken, TimetableModel};

/// Bounds on one search run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchLimits<'t> {
    pub max_nodes: u64,
    pub deadline: Option<Instant>,
    pub cancel: Option<&'t CancelToken>,
}

/// How a search run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SearchOutcome {
    /// Candidate index per course; `None` for courses outside the subset.
    Solved(Vec<Option<usize>>),
    /// The whole tree was explored without a solution.
    Infeasible,
    /// The node budget ran out.
    NodeLimit,
    /// The deadline passed.
    TimeLimit,
    /// The cancel token fired.
    Cancelled,
}

/// Counters from one search run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SearchStats {
    pub nodes: u64,
    pub backtracks: u64,
}

enum Stop {
    NodeLimit,
    TimeLimit,
    Cancelled,
}

struct Backtracker<'m, 'a, 't> {
    model: &'m TimetableModel<'a>,
    limits: SearchLimits<'t>,
    /// Courses taking part in this run.
    active: Vec<usize>,
    alive: Vec<Vec<bool>>,
    live_count: Vec<usize>,
    assigned: Vec<Option<usize>>,
    /// Pruned (course, candidate) pairs, undone on backtrack.
    trail: Vec<(usize, usize)>,
    faculty_load: Vec<u32>,
    stats: SearchStats,
}

/// Searches for a clash-free placement of the courses in `subset`.
pub(crate) fn search(
    model: &TimetableModel<'_>,
    subset: &[usize],
    limits: SearchLimits<'_>,
) -> (SearchOutcome, SearchStats) {
    let n = model.course_count();
    let mut bt = Backtracker {
        model,
        limits,
        active: subset.to_vec(),
        alive: model.domains.iter().map(|d| vec![true; d.len()]).collect(),
        live_count: model.domains.iter().map(Vec::len).collect(),
        assigned: vec![None; n],
        trail: Vec::new(),
        faculty_load: vec![0; model.faculty.len()],
        stats: SearchStats::default(),
    };

    let outcome = match bt.dfs() {
        Ok(true) => SearchOutcome::Solved(bt.assigned.clone()),
        Ok(false) => SearchOutcome::Infeasible,
        Err(Stop::NodeLimit) => SearchOutcome::NodeLimit,
        Err(Stop::TimeLimit) => SearchOutcome::TimeLimit,
        Err(Stop::Cancelled) => SearchOutcome::Cancelled,
    };
    (outcome, bt.stats)
}

impl Backtracker<'_, '_, '_> {
    fn dfs(&mut self) -> Result<bool, Stop> {
        let Some(var) = self.select_variable() else {
            return Ok(true);
        };

        for value in self.ordered_values(var) {
            self.tick()?;

            let mark = self.trail.len();
            self.assigned[var] = Some(value);

            if self.forward_check(var, value) {
                let faculty = self.model.domains[var][value].faculty;
                self.faculty_load[faculty] += 1;
                if self.dfs()? {
                    return Ok(true);
                }
                self.faculty_load[faculty] -= 1;
            }

            self.undo(mark);
            self.assigned[var] = None;
            self.stats.backtracks += 1;
        }

        Ok(false)
    }

    /// Most-constrained unassigned course.
    fn select_variable(&self) -> Option<usize> {
        self.active
            .iter()
            .copied()
            .filter(|&c| self.assigned[c].is_none())
            .min_by(|&a, &b| {
                (self.live_count[a], &self.model.courses[a].code, a).cmp(&(
                    self.live_count[b],
                    &self.model.courses[b].code,
                    b,
                ))
            })
    }

    /// Live candidates of `var`, least-loaded faculty first.
    fn ordered_values(&self, var: usize) -> Vec<usize> {
        let domain = &self.model.domains[var];
        let mut values: Vec<usize> = (0..domain.len()).filter(|&k| self.alive[var][k]).collect();
        values.sort_by_key(|&k| (self.faculty_load[domain[k].faculty], k));
        values
    }

    /// Prunes candidates that clash with `var = value`. Returns `false` on
    /// a domain wipe-out.
    fn forward_check(&mut self, var: usize, value: usize) -> bool {
        let placed = self.model.domains[var][value];

        for i in 0..self.active.len() {
            let other = self.active[i];
            if other == var || self.assigned[other].is_some() {
                continue;
            }
            for k in 0..self.model.domains[other].len() {
                if self.alive[other][k]
                    && self
                        .model
                        .clashes(var, placed, other, self.model.domains[other][k])
                {
                    self.alive[other][k] = false;
                    self.live_count[other] -= 1;
                    self.trail.push((other, k));
                }
            }
            if self.live_count[other] == 0 {
                return false;
            }
        }
        true
    }

    fn undo(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some((course, k)) = self.trail.pop() {
                self.alive[course][k] = true;
                self.live_count[course] += 1;
            }
        }
    }

    fn tick(&mut self) -> Result<(), Stop> {
        if self.stats.nodes >= self.limits.max_nodes {
            return Err(Stop::NodeLimit);
        }
        self.stats.nodes += 1;

        if self.limits.cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(Stop::Cancelled);
        }
        if self.stats.nodes % 256 == 0 {
            if let Some(deadline) = self.limits.deadline {
                if Instant::now() >= deadline {
                    return Err(Stop::TimeLimit);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::tests::{cell, course, faculty};
    use crate::cp::TimetableCpBuilder;
    use crate::models::{Classroom, SlotSet, Weekday};

    fn unlimited() -> SearchLimits<'static> {
        SearchLimits {
            max_nodes: u64::MAX,
            deadline: None,
            cancel: None,
        }
    }

    fn all(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_solves_disjoint_courses() {
        let courses = vec![
            course("CS101", "CS", "Y1"),
            course("CS102", "CS", "Y2"),
            course("CS103", "CS", "Y3"),
        ];
        let faculty = vec![faculty("a", "CS", SlotSet::full_week())];
        let rooms = vec![Classroom::new("r1", "R1")];
        let model = TimetableCpBuilder::new(&courses, &faculty, &rooms).build().unwrap();

        let (outcome, stats) = search(&model, &all(3), unlimited());
        let SearchOutcome::Solved(choice) = outcome else {
            panic!("expected a solution");
        };
        // One lecturer and one room: three distinct cells
        let mut cells: Vec<_> = choice
            .iter()
            .enumerate()
            .map(|(c, k)| model.domain(c)[k.unwrap()].cell)
            .collect();
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), 3);
        assert_eq!(stats.backtracks, 0);
    }

    #[test]
    fn test_proves_infeasible() {
        let only = SlotSet::new().with_cell(cell(Weekday::Monday, 9));
        let courses = vec![course("CS101", "CS", "Y1"), course("CS102", "CS", "Y2")];
        let faculty = vec![faculty("a", "CS", only)];
        let rooms = vec![Classroom::new("r1", "R1"), Classroom::new("r2", "R2")];
        let model = TimetableCpBuilder::new(&courses, &faculty, &rooms).build().unwrap();

        let (outcome, _) = search(&model, &all(2), unlimited());
        assert_eq!(outcome, SearchOutcome::Infeasible);

        // Either course alone is fine
        let (outcome, _) = search(&model, &[1], unlimited());
        assert!(matches!(outcome, SearchOutcome::Solved(ref c) if c[0].is_none() && c[1].is_some()));
    }

    #[test]
    fn test_student_group_separation() {
        // Two lecturers, two rooms, one cell: only possible if groups differ
        let only = SlotSet::new().with_cell(cell(Weekday::Monday, 9));
        let courses = vec![course("CS101", "CS", "Y1"), course("CS102", "CS", "Y1")];
        let faculty = vec![faculty("a", "CS", only.clone()), faculty("b", "CS", only)];
        let rooms = vec![Classroom::new("r1", "R1"), Classroom::new("r2", "R2")];
        let model = TimetableCpBuilder::new(&courses, &faculty, &rooms).build().unwrap();

        let (outcome, _) = search(&model, &all(2), unlimited());
        assert_eq!(outcome, SearchOutcome::Infeasible);
    }

    #[test]
    fn test_balances_faculty_during_search() {
        let courses = vec![
            course("CS101", "CS", "Y1"),
            course("CS102", "CS", "Y2"),
            course("CS103", "CS", "Y3"),
            course("CS104", "CS", "Y4"),
        ];
        let faculty = vec![
            faculty("a", "CS", SlotSet::full_week()),
            faculty("b", "CS", SlotSet::full_week()),
        ];
        let rooms = vec![Classroom::new("r1", "R1")];
        let model = TimetableCpBuilder::new(&courses, &faculty, &rooms).build().unwrap();

        let (SearchOutcome::Solved(choice), _) = search(&model, &all(4), unlimited()) else {
            panic!("expected a solution");
        };
        let a_load = choice
            .iter()
            .enumerate()
            .filter(|(c, k)| model.domain(*c)[k.unwrap()].faculty == 0)
            .count();
        assert_eq!(a_load, 2);
    }

    #[test]
    fn test_node_limit() {
        let only = SlotSet::new().with_cell(cell(Weekday::Monday, 9));
        let courses = vec![course("CS101", "CS", "Y1"), course("CS102", "CS", "Y2")];
        let faculty = vec![faculty("a", "CS", only)];
        let rooms = vec![Classroom::new("r1", "R1")];
        let model = TimetableCpBuilder::new(&courses, &faculty, &rooms).build().unwrap();

        let limits = SearchLimits {
            max_nodes: 0,
            ..unlimited()
        };
        let (outcome, stats) = search(&model, &all(2), limits);
        assert_eq!(outcome, SearchOutcome::NodeLimit);
        assert_eq!(stats.nodes, 0);
    }

    #[test]
    fn test_deadline_checked_every_256_nodes() {
        // Seven courses for six hours of one lecturer: refuting it takes thousands of nodes
        let six = SlotSet::new().with_day(
            Weekday::Monday,
            [9, 10, 11, 12, 13, 14].map(|h| crate::models::TimeSlot::starting_at(h).unwrap()),
        );
        let courses: Vec<_> = (0..7)
            .map(|i| course(&format!("CS10{i}"), "CS", &format!("Y{i}")))
            .collect();
        let faculty = vec![faculty("a", "CS", six)];
        let rooms = vec![Classroom::new("r1", "R1")];
        let model = TimetableCpBuilder::new(&courses, &faculty, &rooms).build().unwrap();

        let limits = SearchLimits {
            deadline: Some(Instant::now()),
            ..unlimited()
        };
        let (outcome, stats) = search(&model, &all(7), limits);
        assert_eq!(outcome, SearchOutcome::TimeLimit);
        assert_eq!(stats.nodes, 256);
    }

    #[test]
    fn test_cancelled() {
        let courses = vec![course("CS101", "CS", "Y1")];
        let faculty = vec![faculty("a", "CS", SlotSet::full_week())];
        let rooms = vec![Classroom::new("r1", "R1")];
        let model = TimetableCpBuilder::new(&courses, &faculty, &rooms).build().unwrap();

        let token = CancelToken::new();
        token.cancel();
        let limits = SearchLimits {
            cancel: Some(&token),
            ..unlimited()
        };
        let (outcome, _) = search(&model, &all(1), limits);
        assert_eq!(outcome, SearchOutcome::Cancelled);
    }

    #[test]
    fn test_deterministic() {
        let courses = vec![
            course("CS101", "CS", "Y1"),
            course("CS102", "CS", "Y1"),
            course("CS103", "CS", "Y2"),
        ];
        let faculty = vec![
            faculty("a", "CS", SlotSet::new().with_whole_day(Weekday::Tuesday)),
            faculty("b", "CS", SlotSet::full_week()),
        ];
        let rooms = vec![Classroom::new("r1", "R1"), Classroom::new("r2", "R2")];
        let model = TimetableCpBuilder::new(&courses, &faculty, &rooms).build().unwrap();

        let first = search(&model, &all(3), unlimited());
        let second = search(&model, &all(3), unlimited());
        assert_eq!(first, second);
    }
}
