//! CP-based timetable formulation and search.
//!
//! Turns courses, faculty and classrooms into a finite-domain constraint
//! satisfaction problem and solves it.
//!
//! # Formulation
//! - One variable per course.
//! - Domain: every [`Candidate`] `(cell, classroom, faculty)` that passes
//!   the unary constraints (department eligibility, faculty availability,
//!   equipment coverage, room blocked cells).
//! - Binary constraints: two courses placed in the same cell must differ
//!   in faculty, classroom and student group.
//!
//! # Search
//! `search` runs most-constrained-first backtracking with forward
//! checking. `improve` then anneals the workload objective without
//! leaving the feasible region. `explain` shrinks an infeasible course
//! set to a minimal conflicting subset.
//!
//! # Reference
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", Ch. 6
//! - Schaerf (1999), "A Survey of Automated Timetabling"

pub(crate) mod explain;
pub(crate) mod improve;
pub(crate) mod search;

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::{BlockReason, Blocker};
use crate::models::{Classroom, Course, DepartmentPolicy, Faculty, SlotCell};

/// A legal placement for one course.
///
/// Field order defines the sort order: cell, then classroom, then faculty.
/// Domains are built in that order and stay sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Candidate {
    /// Where the class meets.
    pub cell: SlotCell,
    /// Index into the classroom slice.
    pub classroom: usize,
    /// Index into the faculty slice.
    pub faculty: usize,
}

/// Cooperative cancellation flag shared between a caller and a solve.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// An encoded timetabling problem.
///
/// Borrows the input slices; candidate indices refer back into them.
#[derive(Debug, Clone)]
pub struct TimetableModel<'a> {
    pub(crate) courses: &'a [Course],
    pub(crate) faculty: &'a [Faculty],
    pub(crate) classrooms: &'a [Classroom],
    /// Candidate placements per course, sorted.
    pub(crate) domains: Vec<Vec<Candidate>>,
    /// Interned student group per course.
    pub(crate) groups: Vec<usize>,
    pub(crate) group_count: usize,
    /// Faculty indices that appear in at least one domain, ascending.
    pub(crate) eligible_faculty: Vec<usize>,
}

impl<'a> TimetableModel<'a> {
    /// Number of courses (variables).
    pub fn course_count(&self) -> usize {
        self.domains.len()
    }

    /// Candidate placements for a course.
    pub fn domain(&self, course: usize) -> &[Candidate] {
        &self.domains[course]
    }

    /// Total number of candidates across all courses.
    pub fn candidate_count(&self) -> usize {
        self.domains.iter().map(Vec::len).sum()
    }

    /// Faculty who can teach at least one course.
    pub fn eligible_faculty(&self) -> &[usize] {
        &self.eligible_faculty
    }

    /// Courses whose only possible faculty member, classroom or student
    /// group has fewer usable cells than courses to hold.
    ///
    /// A faculty member or classroom binds a course only when every
    /// candidate of that course uses it; a student group always binds its
    /// courses. Each course is reported once, under the first overbooked
    /// resource found (faculty, then classrooms, then student groups).
    /// An empty result does not prove the model feasible.
    pub fn overbooked(&self) -> Vec<Blocker> {
        let n = self.course_count();
        let mut reasons: Vec<Option<BlockReason>> = vec![None; n];

        for (f, member) in self.faculty.iter().enumerate() {
            let bound: Vec<usize> = (0..n)
                .filter(|&c| self.domains[c].iter().all(|k| k.faculty == f))
                .collect();
            self.check_demand(&bound, || format!("faculty '{}'", member.name), &mut reasons);
        }
        for (r, room) in self.classrooms.iter().enumerate() {
            let bound: Vec<usize> = (0..n)
                .filter(|&c| self.domains[c].iter().all(|k| k.classroom == r))
                .collect();
            self.check_demand(&bound, || format!("classroom '{}'", room.name), &mut reasons);
        }
        for g in 0..self.group_count {
            let bound: Vec<usize> = (0..n).filter(|&c| self.groups[c] == g).collect();
            if let Some(&first) = bound.first() {
                let label = &self.courses[first].student_group;
                self.check_demand(&bound, || format!("student group '{label}'"), &mut reasons);
            }
        }

        reasons
            .into_iter()
            .enumerate()
            .filter_map(|(c, reason)| {
                reason.map(|reason| Blocker {
                    course_id: self.courses[c].id.clone(),
                    course_code: self.courses[c].code.clone(),
                    reason,
                })
            })
            .collect()
    }

    fn check_demand(
        &self,
        bound: &[usize],
        resource: impl FnOnce() -> String,
        reasons: &mut [Option<BlockReason>],
    ) {
        let mask = bound
            .iter()
            .flat_map(|&c| self.domains[c].iter())
            .fold(0u64, |mask, k| mask | (1u64 << k.cell.index()));
        let cells = mask.count_ones() as usize;
        if bound.len() <= cells {
            return;
        }

        let reason = BlockReason::Overbooked {
            resource: resource(),
            demand: bound.len(),
            cells,
        };
        for &c in bound {
            if reasons[c].is_none() {
                reasons[c] = Some(reason.clone());
            }
        }
    }

    /// Whether two placements clash when both are used.
    #[inline]
    pub(crate) fn clashes(&self, a_course: usize, a: Candidate, b_course: usize, b: Candidate) -> bool {
        a.cell == b.cell
            && (a.faculty == b.faculty
                || a.classroom == b.classroom
                || self.groups[a_course] == self.groups[b_course])
    }
}

/// Builds a [`TimetableModel`] from domain objects.
///
/// # Example
/// ```
/// use u_timetable::cp::TimetableCpBuilder;
/// use u_timetable::models::{Classroom, Course, Faculty, SlotSet, Weekday};
///
/// let courses = vec![Course::new("c1", "CS101")
///     .with_department("CS")
///     .with_student_group("Y1")];
/// let faculty = vec![Faculty::new("f1", "Turing")
///     .with_department("CS")
///     .with_availability(SlotSet::new().with_whole_day(Weekday::Monday))];
/// let rooms = vec![Classroom::new("r1", "Hall A")];
///
/// let model = TimetableCpBuilder::new(&courses, &faculty, &rooms).build().unwrap();
/// assert_eq!(model.domain(0).len(), 8);
/// ```
pub struct TimetableCpBuilder<'a> {
    courses: &'a [Course],
    faculty: &'a [Faculty],
    classrooms: &'a [Classroom],
    department_policy: DepartmentPolicy,
}

impl<'a> TimetableCpBuilder<'a> {
    /// Creates a new builder.
    pub fn new(courses: &'a [Course], faculty: &'a [Faculty], classrooms: &'a [Classroom]) -> Self {
        Self {
            courses,
            faculty,
            classrooms,
            department_policy: DepartmentPolicy::Strict,
        }
    }

    /// Sets the department policy.
    pub fn with_department_policy(mut self, policy: DepartmentPolicy) -> Self {
        self.department_policy = policy;
        self
    }

    /// Encodes the problem.
    ///
    /// Returns every course whose domain is empty, with the first failing
    /// reason, instead of a model.
    pub fn build(&self) -> Result<TimetableModel<'a>, Vec<Blocker>> {
        let mut domains = Vec::with_capacity(self.courses.len());
        let mut blockers = Vec::new();

        for course in self.courses {
            match self.encode_course(course) {
                Ok(domain) => domains.push(domain),
                Err(reason) => blockers.push(Blocker {
                    course_id: course.id.clone(),
                    course_code: course.code.clone(),
                    reason,
                }),
            }
        }

        if !blockers.is_empty() {
            return Err(blockers);
        }

        // Intern student groups in order of first appearance
        let mut group_ids: HashMap<&str, usize> = HashMap::new();
        let groups: Vec<usize> = self
            .courses
            .iter()
            .map(|c| {
                let next = group_ids.len();
                *group_ids.entry(c.student_group.as_str()).or_insert(next)
            })
            .collect();

        let eligible: BTreeSet<usize> = domains
            .iter()
            .flat_map(|d| d.iter().map(|c| c.faculty))
            .collect();

        let model = TimetableModel {
            courses: self.courses,
            faculty: self.faculty,
            classrooms: self.classrooms,
            domains,
            groups,
            group_count: group_ids.len(),
            eligible_faculty: eligible.into_iter().collect(),
        };

        debug!(
            courses = model.course_count(),
            candidates = model.candidate_count(),
            groups = model.group_count,
            "encoded timetable model"
        );

        Ok(model)
    }

    /// Builds the candidate list for one course.
    fn encode_course(&self, course: &Course) -> Result<Vec<Candidate>, BlockReason> {
        let qualified: Vec<usize> = self
            .faculty
            .iter()
            .enumerate()
            .filter(|(_, f)| match self.department_policy {
                DepartmentPolicy::Strict => f.teaches_for(&course.department),
                DepartmentPolicy::Any => true,
            })
            .map(|(i, _)| i)
            .collect();

        if qualified.is_empty() {
            return Err(BlockReason::NoQualifiedFaculty {
                department: course.department.clone(),
            });
        }
        if qualified.iter().all(|&i| self.faculty[i].availability.is_empty()) {
            return Err(BlockReason::NoAvailableFaculty {
                department: course.department.clone(),
            });
        }

        let rooms: Vec<usize> = self
            .classrooms
            .iter()
            .enumerate()
            .filter(|(_, r)| course.is_satisfied_by(&r.available_equipment))
            .map(|(i, _)| i)
            .collect();

        if rooms.is_empty() {
            // Tags no classroom offers at all
            let missing_equipment = course
                .required_equipment
                .iter()
                .filter(|tag| !self.classrooms.iter().any(|r| r.has_equipment(tag)))
                .cloned()
                .collect();
            return Err(BlockReason::NoSuitableClassroom { missing_equipment });
        }

        let mut domain = Vec::new();
        for cell in SlotCell::all() {
            for &classroom in &rooms {
                if !self.classrooms[classroom].is_open(cell) {
                    continue;
                }
                for &faculty in &qualified {
                    if self.faculty[faculty].is_available(cell) {
                        domain.push(Candidate {
                            cell,
                            classroom,
                            faculty,
                        });
                    }
                }
            }
        }

        if domain.is_empty() {
            return Err(BlockReason::NoFreeSlot);
        }
        Ok(domain)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{SlotSet, TimeSlot, Weekday};

    pub(crate) fn cell(day: Weekday, hour: u8) -> SlotCell {
        SlotCell::new(day, TimeSlot::starting_at(hour).unwrap())
    }

    pub(crate) fn course(code: &str, dept: &str, group: &str) -> Course {
        Course::new(code.to_lowercase(), code)
            .with_name(format!("{code} course"))
            .with_department(dept)
            .with_student_group(group)
    }

    pub(crate) fn faculty(id: &str, dept: &str, availability: SlotSet) -> Faculty {
        Faculty::new(id, format!("Prof. {id}"))
            .with_department(dept)
            .with_availability(availability)
    }

    #[test]
    fn test_domain_size() {
        let courses = vec![course("CS101", "CS", "Y1")];
        let faculty = vec![
            faculty("a", "CS", SlotSet::new().with_whole_day(Weekday::Monday)),
            faculty("b", "CS", SlotSet::new().with_cell(cell(Weekday::Monday, 9))),
        ];
        let rooms = vec![Classroom::new("r1", "R1"), Classroom::new("r2", "R2")];

        let model = TimetableCpBuilder::new(&courses, &faculty, &rooms).build().unwrap();
        // 8 Monday cells x 2 rooms for a, plus 1 cell x 2 rooms for b
        assert_eq!(model.domain(0).len(), 18);
        assert_eq!(model.eligible_faculty(), &[0, 1]);
    }

    #[test]
    fn test_domain_sorted() {
        let courses = vec![course("CS101", "CS", "Y1")];
        let faculty = vec![
            faculty("a", "CS", SlotSet::full_week()),
            faculty("b", "CS", SlotSet::full_week()),
        ];
        let rooms = vec![Classroom::new("r1", "R1"), Classroom::new("r2", "R2")];

        let model = TimetableCpBuilder::new(&courses, &faculty, &rooms).build().unwrap();
        assert!(model.domain(0).windows(2).all(|w| w[0] < w[1]));
        assert_eq!(model.domain(0)[0].cell, cell(Weekday::Monday, 9));
    }

    #[test]
    fn test_department_filter() {
        let courses = vec![course("MA202", "Math", "Y2")];
        let faculty = vec![
            faculty("cs", "CS", SlotSet::full_week()),
            faculty("ma", "Math", SlotSet::new().with_whole_day(Weekday::Friday)),
        ];
        let rooms = vec![Classroom::new("r1", "R1")];

        let model = TimetableCpBuilder::new(&courses, &faculty, &rooms).build().unwrap();
        assert!(model.domain(0).iter().all(|c| c.faculty == 1));
        assert!(model.domain(0).iter().all(|c| c.cell.day == Weekday::Friday));

        let any = TimetableCpBuilder::new(&courses, &faculty, &rooms)
            .with_department_policy(DepartmentPolicy::Any)
            .build()
            .unwrap();
        assert!(any.domain(0).iter().any(|c| c.faculty == 0));
    }

    #[test]
    fn test_eligible_department() {
        let courses = vec![course("MA202", "Math", "Y2")];
        let faculty = vec![faculty("cs", "CS", SlotSet::full_week()).with_eligible_department("Math")];
        let rooms = vec![Classroom::new("r1", "R1")];
        assert!(TimetableCpBuilder::new(&courses, &faculty, &rooms).build().is_ok());
    }

    #[test]
    fn test_blocked_cells_removed() {
        let courses = vec![course("CS101", "CS", "Y1")];
        let faculty = vec![faculty("a", "CS", SlotSet::new().with_whole_day(Weekday::Monday))];
        let rooms = vec![Classroom::new("r1", "R1").with_blocked(cell(Weekday::Monday, 9))];

        let model = TimetableCpBuilder::new(&courses, &faculty, &rooms).build().unwrap();
        assert_eq!(model.domain(0).len(), 7);
        assert!(model.domain(0).iter().all(|c| c.cell != cell(Weekday::Monday, 9)));
    }

    #[test]
    fn test_reasons() {
        let avail = SlotSet::new().with_cell(cell(Weekday::Monday, 9));
        let courses = vec![
            course("PH100", "Physics", "Y1"),
            course("CS101", "CS", "Y1").with_equipment("GPU Cluster"),
            course("MA100", "Math", "Y1"),
            course("CS102", "CS", "Y2"),
        ];
        let faculty = vec![
            faculty("cs", "CS", avail),
            faculty("ma", "Math", SlotSet::new()),
        ];
        let rooms = vec![Classroom::new("r1", "R1").with_blocked(cell(Weekday::Monday, 9))];

        let blockers = TimetableCpBuilder::new(&courses, &faculty, &rooms)
            .build()
            .unwrap_err();
        let reasons: Vec<(&str, &BlockReason)> = blockers
            .iter()
            .map(|b| (b.course_code.as_str(), &b.reason))
            .collect();

        assert_eq!(reasons.len(), 4);
        assert_eq!(
            reasons[0],
            ("PH100", &BlockReason::NoQualifiedFaculty { department: "Physics".into() })
        );
        assert_eq!(
            reasons[1],
            (
                "CS101",
                &BlockReason::NoSuitableClassroom {
                    missing_equipment: vec!["GPU Cluster".into()]
                }
            )
        );
        assert_eq!(
            reasons[2],
            ("MA100", &BlockReason::NoAvailableFaculty { department: "Math".into() })
        );
        assert_eq!(reasons[3], ("CS102", &BlockReason::NoFreeSlot));
    }

    #[test]
    fn test_group_interning_and_clash() {
        let courses = vec![
            course("CS101", "CS", "Y1"),
            course("CS102", "CS", "Y2"),
            course("CS103", "CS", "Y1"),
        ];
        let faculty = vec![
            faculty("a", "CS", SlotSet::full_week()),
            faculty("b", "CS", SlotSet::full_week()),
        ];
        let rooms = vec![Classroom::new("r1", "R1"), Classroom::new("r2", "R2")];
        let model = TimetableCpBuilder::new(&courses, &faculty, &rooms).build().unwrap();

        assert_eq!(model.groups, vec![0, 1, 0]);
        assert_eq!(model.group_count, 2);

        let at = |room, fac| Candidate {
            cell: cell(Weekday::Monday, 9),
            classroom: room,
            faculty: fac,
        };
        // Different room and faculty, different groups
        assert!(!model.clashes(0, at(0, 0), 1, at(1, 1)));
        // Same group
        assert!(model.clashes(0, at(0, 0), 2, at(1, 1)));
        // Same faculty
        assert!(model.clashes(0, at(0, 0), 1, at(1, 0)));
        // Different cells never clash
        let later = Candidate {
            cell: cell(Weekday::Monday, 10),
            ..at(0, 0)
        };
        assert!(!model.clashes(0, at(0, 0), 2, later));
    }

    #[test]
    fn test_overbooked_faculty() {
        // Three courses, one lecturer with two free hours
        let two = SlotSet::new()
            .with_cell(cell(Weekday::Monday, 9))
            .with_cell(cell(Weekday::Monday, 10));
        let courses = vec![
            course("CS101", "CS", "Y1"),
            course("CS102", "CS", "Y2"),
            course("CS103", "CS", "Y3"),
            course("MA100", "Math", "M1"),
        ];
        let faculty = vec![
            faculty("a", "CS", two),
            faculty("ma", "Math", SlotSet::full_week()),
        ];
        let rooms = vec![Classroom::new("r1", "R1"), Classroom::new("r2", "R2")];
        let model = TimetableCpBuilder::new(&courses, &faculty, &rooms).build().unwrap();

        let blockers = model.overbooked();
        let codes: Vec<&str> = blockers.iter().map(|b| b.course_code.as_str()).collect();
        assert_eq!(codes, vec!["CS101", "CS102", "CS103"]);
        assert_eq!(
            blockers[0].reason,
            BlockReason::Overbooked {
                resource: "faculty 'Prof. a'".into(),
                demand: 3,
                cells: 2,
            }
        );
    }

    #[test]
    fn test_overbooked_classroom_and_group() {
        let monday = SlotSet::new().with_whole_day(Weekday::Monday);
        let courses = vec![
            course("CS101", "CS", "Y1").with_equipment("Projector"),
            course("CS102", "CS", "Y2").with_equipment("Projector"),
        ];
        let staff = vec![faculty("a", "CS", monday.clone()), faculty("b", "CS", monday)];
        let rooms = vec![
            Classroom::new("r1", "Lab")
                .with_equipment("Projector")
                .with_blocked(cell(Weekday::Monday, 9))
                .with_blocked(cell(Weekday::Monday, 10))
                .with_blocked(cell(Weekday::Monday, 11))
                .with_blocked(cell(Weekday::Monday, 12))
                .with_blocked(cell(Weekday::Monday, 13))
                .with_blocked(cell(Weekday::Monday, 14))
                .with_blocked(cell(Weekday::Monday, 15)),
            Classroom::new("r2", "Plain"),
        ];
        let model = TimetableCpBuilder::new(&courses, &staff, &rooms).build().unwrap();
        let blockers = model.overbooked();
        assert_eq!(blockers.len(), 2);
        assert!(matches!(
            &blockers[1].reason,
            BlockReason::Overbooked { resource, demand: 2, cells: 1 } if resource == "classroom 'Lab'"
        ));

        let same_group = vec![course("CS101", "CS", "Y1"), course("CS102", "CS", "Y1")];
        let one = SlotSet::new().with_cell(cell(Weekday::Friday, 16));
        let late_staff = vec![faculty("a", "CS", one.clone()), faculty("b", "CS", one)];
        let model = TimetableCpBuilder::new(&same_group, &late_staff, &rooms).build().unwrap();
        let blockers = model.overbooked();
        assert!(matches!(
            &blockers[0].reason,
            BlockReason::Overbooked { resource, .. } if resource == "student group 'Y1'"
        ));
    }

    #[test]
    fn test_not_overbooked_when_alternatives_exist() {
        // Two lecturers share the load: no single resource binds
        let only = SlotSet::new().with_cell(cell(Weekday::Monday, 9));
        let courses = vec![course("CS101", "CS", "Y1"), course("CS102", "CS", "Y2")];
        let faculty = vec![faculty("a", "CS", only.clone()), faculty("b", "CS", only)];
        let rooms = vec![Classroom::new("r1", "R1"), Classroom::new("r2", "R2")];
        let model = TimetableCpBuilder::new(&courses, &faculty, &rooms).build().unwrap();
        assert!(model.overbooked().is_empty());
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let shared = token.clone();
        assert!(!token.is_cancelled());
        shared.cancel();
        assert!(token.is_cancelled());
    }
}
