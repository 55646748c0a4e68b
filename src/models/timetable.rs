//! Timetable (solution) model.
//!
//! A timetable is the weekly grid produced by one generation call: for
//! each weekday, the list of classes held that day. Entries carry
//! denormalized display fields so a presentation layer can render the grid
//! without joining back to the input.
//!
//! # Wire Format
//! Serializes as `{ "monday": [...], ..., "friday": [...] }` with camelCase
//! entry fields. Days without classes are omitted.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{Classroom, Course, Faculty, SlotCell, TimeSlot, Weekday};

/// One scheduled class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub time_slot: TimeSlot,
    pub course_code: String,
    pub course_name: String,
    pub faculty_name: String,
    pub classroom_name: String,
    pub department: String,
    pub student_group: String,
}

/// A weekly timetable keyed by weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub monday: Vec<ScheduleEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tuesday: Vec<ScheduleEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wednesday: Vec<ScheduleEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thursday: Vec<ScheduleEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub friday: Vec<ScheduleEntry>,
}

/// A broken timetable invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (course code, faculty name, classroom name or group).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of timetable violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// An input course has no entry.
    MissingCourse,
    /// A course appears in more than one entry.
    DuplicateCourse,
    /// An entry names a course, faculty member or room not in the input.
    UnknownReference,
    /// A faculty member teaches two classes in one cell.
    FacultyClash,
    /// A room hosts two classes in one cell.
    ClassroomClash,
    /// A student group attends two classes in one cell.
    StudentGroupClash,
    /// A class is placed outside its faculty member's availability.
    FacultyUnavailable,
    /// A room lacks equipment the course requires.
    EquipmentMismatch,
    /// A class is placed in a room's blocked cell.
    ClassroomBlocked,
}

impl Violation {
    fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
        severity: i32,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
            severity,
        }
    }

    /// Creates a missing-course violation.
    pub fn missing_course(code: impl Into<String>) -> Self {
        let code = code.into();
        let message = format!("Course {code} is not scheduled");
        Self::new(ViolationType::MissingCourse, code, message, 100)
    }

    /// Creates a clash violation of the given type.
    pub fn clash(
        violation_type: ViolationType,
        entity: impl Into<String>,
        cell: SlotCell,
    ) -> Self {
        let entity = entity.into();
        let message = format!("'{entity}' is double-booked on {cell}");
        Self::new(violation_type, entity, message, 95)
    }
}

impl Timetable {
    /// Creates an empty timetable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries held on a day.
    pub fn day(&self, day: Weekday) -> &[ScheduleEntry] {
        match day {
            Weekday::Monday => &self.monday,
            Weekday::Tuesday => &self.tuesday,
            Weekday::Wednesday => &self.wednesday,
            Weekday::Thursday => &self.thursday,
            Weekday::Friday => &self.friday,
        }
    }

    fn day_mut(&mut self, day: Weekday) -> &mut Vec<ScheduleEntry> {
        match day {
            Weekday::Monday => &mut self.monday,
            Weekday::Tuesday => &mut self.tuesday,
            Weekday::Wednesday => &mut self.wednesday,
            Weekday::Thursday => &mut self.thursday,
            Weekday::Friday => &mut self.friday,
        }
    }

    /// Adds an entry to a day.
    pub fn add_entry(&mut self, day: Weekday, entry: ScheduleEntry) {
        self.day_mut(day).push(entry);
    }

    /// Orders each day by slot, then course code.
    pub fn sort(&mut self) {
        for day in Weekday::ALL {
            self.day_mut(day)
                .sort_by(|a, b| (a.time_slot, &a.course_code).cmp(&(b.time_slot, &b.course_code)));
        }
    }

    /// All entries with their day, in day order.
    pub fn entries(&self) -> impl Iterator<Item = (Weekday, &ScheduleEntry)> + '_ {
        Weekday::ALL
            .into_iter()
            .flat_map(move |day| self.day(day).iter().map(move |e| (day, e)))
    }

    /// Entries in one cell.
    pub fn entries_at(&self, cell: SlotCell) -> Vec<&ScheduleEntry> {
        self.day(cell.day)
            .iter()
            .filter(|e| e.time_slot == cell.slot)
            .collect()
    }

    /// Where a course is held, if scheduled.
    pub fn entry_for_course(&self, code: &str) -> Option<(SlotCell, &ScheduleEntry)> {
        self.entries()
            .find(|(_, e)| e.course_code == code)
            .map(|(day, e)| (SlotCell::new(day, e.time_slot), e))
    }

    /// Cells a faculty member teaches in, in grid order.
    pub fn cells_for_faculty(&self, faculty_name: &str) -> Vec<SlotCell> {
        self.entries()
            .filter(|(_, e)| e.faculty_name == faculty_name)
            .map(|(day, e)| SlotCell::new(day, e.time_slot))
            .collect()
    }

    /// Number of entries across the week.
    pub fn entry_count(&self) -> usize {
        Weekday::ALL.iter().map(|&d| self.day(d).len()).sum()
    }

    /// Whether the timetable holds no classes.
    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Checks this timetable against the input it was built from.
    ///
    /// Returns every violation found: completeness, per-cell uniqueness of
    /// faculty, classroom and student group, faculty availability, room
    /// equipment and blocked cells. An empty result means the timetable
    /// satisfies all hard constraints.
    pub fn verify(
        &self,
        courses: &[Course],
        faculty: &[Faculty],
        classrooms: &[Classroom],
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        let course_by_code: HashMap<&str, &Course> =
            courses.iter().map(|c| (c.code.as_str(), c)).collect();
        let faculty_by_name: HashMap<&str, &Faculty> =
            faculty.iter().map(|f| (f.name.as_str(), f)).collect();
        let room_by_name: HashMap<&str, &Classroom> =
            classrooms.iter().map(|r| (r.name.as_str(), r)).collect();

        // Completeness
        let mut seen_codes: HashMap<&str, usize> = HashMap::new();
        for (_, e) in self.entries() {
            *seen_codes.entry(e.course_code.as_str()).or_insert(0) += 1;
        }
        for course in courses {
            match seen_codes.get(course.code.as_str()) {
                None => violations.push(Violation::missing_course(&course.code)),
                Some(&n) if n > 1 => violations.push(Violation::new(
                    ViolationType::DuplicateCourse,
                    &course.code,
                    format!("Course {} is scheduled {n} times", course.code),
                    90,
                )),
                _ => {}
            }
        }

        // Per-cell uniqueness
        let mut faculty_cells: HashSet<(&str, SlotCell)> = HashSet::new();
        let mut room_cells: HashSet<(&str, SlotCell)> = HashSet::new();
        let mut group_cells: HashSet<(&str, SlotCell)> = HashSet::new();

        for (day, e) in self.entries() {
            let cell = SlotCell::new(day, e.time_slot);

            if !faculty_cells.insert((e.faculty_name.as_str(), cell)) {
                violations.push(Violation::clash(ViolationType::FacultyClash, &e.faculty_name, cell));
            }
            if !room_cells.insert((e.classroom_name.as_str(), cell)) {
                violations.push(Violation::clash(
                    ViolationType::ClassroomClash,
                    &e.classroom_name,
                    cell,
                ));
            }
            if !group_cells.insert((e.student_group.as_str(), cell)) {
                violations.push(Violation::clash(
                    ViolationType::StudentGroupClash,
                    &e.student_group,
                    cell,
                ));
            }

            // Resource checks
            let Some(course) = course_by_code.get(e.course_code.as_str()) else {
                violations.push(unknown(&e.course_code, "course"));
                continue;
            };
            match faculty_by_name.get(e.faculty_name.as_str()) {
                Some(f) if !f.is_available(cell) => violations.push(Violation::new(
                    ViolationType::FacultyUnavailable,
                    &f.name,
                    format!("{} is not available on {cell} ({})", f.name, course.code),
                    85,
                )),
                Some(_) => {}
                None => violations.push(unknown(&e.faculty_name, "faculty member")),
            }
            match room_by_name.get(e.classroom_name.as_str()) {
                Some(r) => {
                    if !course.is_satisfied_by(&r.available_equipment) {
                        violations.push(Violation::new(
                            ViolationType::EquipmentMismatch,
                            &course.code,
                            format!(
                                "{} lacks {:?} required by {}",
                                r.name,
                                course.missing_equipment(&r.available_equipment),
                                course.code
                            ),
                            80,
                        ));
                    }
                    if !r.is_open(cell) {
                        violations.push(Violation::new(
                            ViolationType::ClassroomBlocked,
                            &r.name,
                            format!("{} is blocked on {cell} ({})", r.name, course.code),
                            85,
                        ));
                    }
                }
                None => violations.push(unknown(&e.classroom_name, "classroom")),
            }
        }

        violations
    }
}

fn unknown(name: &str, what: &str) -> Violation {
    Violation::new(
        ViolationType::UnknownReference,
        name,
        format!("Entry references unknown {what} '{name}'"),
        70,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SlotSet;

    fn slot(hour: u8) -> TimeSlot {
        TimeSlot::starting_at(hour).unwrap()
    }

    fn entry(code: &str, hour: u8, faculty: &str, room: &str, group: &str) -> ScheduleEntry {
        ScheduleEntry {
            time_slot: slot(hour),
            course_code: code.into(),
            course_name: format!("{code} name"),
            faculty_name: faculty.into(),
            classroom_name: room.into(),
            department: "CS".into(),
            student_group: group.into(),
        }
    }

    fn inputs() -> (Vec<Course>, Vec<Faculty>, Vec<Classroom>) {
        let courses = vec![
            Course::new("c1", "CS101").with_student_group("Y1").with_equipment("Projector"),
            Course::new("c2", "CS102").with_student_group("Y2"),
        ];
        let faculty = vec![
            Faculty::new("f1", "Turing").with_availability(SlotSet::new().with_whole_day(Weekday::Monday)),
            Faculty::new("f2", "Hopper").with_availability(SlotSet::new().with_whole_day(Weekday::Monday)),
        ];
        let rooms = vec![
            Classroom::new("r1", "Hall A").with_equipment("Projector"),
            Classroom::new("r2", "Room B"),
        ];
        (courses, faculty, rooms)
    }

    fn sample_timetable() -> Timetable {
        let mut t = Timetable::new();
        t.add_entry(Weekday::Monday, entry("CS102", 10, "Hopper", "Room B", "Y2"));
        t.add_entry(Weekday::Monday, entry("CS101", 9, "Turing", "Hall A", "Y1"));
        t.sort();
        t
    }

    #[test]
    fn test_sort_and_queries() {
        let t = sample_timetable();
        assert_eq!(t.entry_count(), 2);
        assert_eq!(t.monday[0].course_code, "CS101");

        let (cell, e) = t.entry_for_course("CS102").unwrap();
        assert_eq!(cell, SlotCell::new(Weekday::Monday, slot(10)));
        assert_eq!(e.faculty_name, "Hopper");
        assert!(t.entry_for_course("XX999").is_none());

        assert_eq!(t.entries_at(SlotCell::new(Weekday::Monday, slot(9))).len(), 1);
        assert_eq!(t.cells_for_faculty("Turing").len(), 1);
        assert!(t.day(Weekday::Friday).is_empty());
    }

    #[test]
    fn test_verify_valid() {
        let (courses, faculty, rooms) = inputs();
        assert!(sample_timetable().verify(&courses, &faculty, &rooms).is_empty());
    }

    #[test]
    fn test_verify_missing_course() {
        let (courses, faculty, rooms) = inputs();
        let mut t = Timetable::new();
        t.add_entry(Weekday::Monday, entry("CS101", 9, "Turing", "Hall A", "Y1"));

        let v = t.verify(&courses, &faculty, &rooms);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].violation_type, ViolationType::MissingCourse);
        assert_eq!(v[0].entity_id, "CS102");
    }

    #[test]
    fn test_verify_clashes() {
        let (courses, faculty, rooms) = inputs();
        let mut t = Timetable::new();
        t.add_entry(Weekday::Monday, entry("CS101", 9, "Turing", "Hall A", "Y1"));
        t.add_entry(Weekday::Monday, entry("CS102", 9, "Turing", "Hall A", "Y1"));

        let kinds: Vec<ViolationType> = t
            .verify(&courses, &faculty, &rooms)
            .into_iter()
            .map(|v| v.violation_type)
            .collect();
        assert!(kinds.contains(&ViolationType::FacultyClash));
        assert!(kinds.contains(&ViolationType::ClassroomClash));
        assert!(kinds.contains(&ViolationType::StudentGroupClash));
    }

    #[test]
    fn test_verify_availability_and_equipment() {
        let (courses, faculty, rooms) = inputs();
        let mut t = Timetable::new();
        t.add_entry(Weekday::Tuesday, entry("CS101", 9, "Turing", "Room B", "Y1"));
        t.add_entry(Weekday::Monday, entry("CS102", 9, "Hopper", "Room B", "Y2"));

        let kinds: Vec<ViolationType> = t
            .verify(&courses, &faculty, &rooms)
            .into_iter()
            .map(|v| v.violation_type)
            .collect();
        assert!(kinds.contains(&ViolationType::FacultyUnavailable));
        assert!(kinds.contains(&ViolationType::EquipmentMismatch));
    }

    #[test]
    fn test_verify_duplicate_course() {
        let (courses, faculty, rooms) = inputs();
        let mut t = sample_timetable();
        t.add_entry(Weekday::Monday, entry("CS102", 11, "Hopper", "Room B", "Y2"));

        let v = t.verify(&courses, &faculty, &rooms);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].violation_type, ViolationType::DuplicateCourse);
        assert_eq!(v[0].message, "Course CS102 is scheduled 2 times");
        assert_eq!(v[0].severity, 90);
    }

    #[test]
    fn test_verify_blocked_classroom() {
        let (courses, faculty, mut rooms) = inputs();
        rooms[1] = rooms[1]
            .clone()
            .with_blocked(SlotCell::new(Weekday::Monday, slot(10)));

        let v = sample_timetable().verify(&courses, &faculty, &rooms);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].violation_type, ViolationType::ClassroomBlocked);
        assert_eq!(v[0].entity_id, "Room B");
    }

    #[test]
    fn test_verify_unknown_references() {
        let (courses, faculty, rooms) = inputs();
        let mut t = Timetable::new();
        t.add_entry(Weekday::Monday, entry("CS101", 9, "Turing", "Hall A", "Y1"));
        t.add_entry(Weekday::Monday, entry("CS102", 10, "Knuth", "Lab Z", "Y2"));
        t.add_entry(Weekday::Monday, entry("XX999", 11, "Hopper", "Room B", "Y3"));

        let v = t.verify(&courses, &faculty, &rooms);
        assert!(v
            .iter()
            .all(|v| v.violation_type == ViolationType::UnknownReference));
        let mut names: Vec<&str> = v.iter().map(|v| v.entity_id.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["Knuth", "Lab Z", "XX999"]);
    }

    #[test]
    fn test_wire_format() {
        let value = serde_json::to_value(sample_timetable()).unwrap();
        assert!(value.get("tuesday").is_none());
        let first = &value["monday"][0];
        assert_eq!(first["timeSlot"], "09:00 - 10:00");
        assert_eq!(first["courseCode"], "CS101");
        assert_eq!(first["classroomName"], "Hall A");
        assert_eq!(first["studentGroup"], "Y1");

        let back: Timetable = serde_json::from_value(value).unwrap();
        assert_eq!(back, sample_timetable());
    }
}
