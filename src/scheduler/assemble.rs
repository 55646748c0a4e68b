//! Assignment to timetable conversion.

use crate::cp::TimetableModel;
use crate::models::{ScheduleEntry, Timetable};

/// Builds the timetable for a complete assignment.
///
/// `choice[c]` is the chosen candidate index for course `c`. Display
/// fields are copied from the input; each day is sorted by slot, then
/// course code.
pub(crate) fn assemble(model: &TimetableModel<'_>, choice: &[usize]) -> Timetable {
    let mut timetable = Timetable::new();

    for (c, &k) in choice.iter().enumerate() {
        let course = &model.courses[c];
        let placed = model.domains[c][k];
        timetable.add_entry(
            placed.cell.day,
            ScheduleEntry {
                time_slot: placed.cell.slot,
                course_code: course.code.clone(),
                course_name: course.name.clone(),
                faculty_name: model.faculty[placed.faculty].name.clone(),
                classroom_name: model.classrooms[placed.classroom].name.clone(),
                department: course.department.clone(),
                student_group: course.student_group.clone(),
            },
        );
    }

    timetable.sort();
    timetable
}
