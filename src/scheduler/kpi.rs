//! Timetable quality metrics (KPIs).
//!
//! Computes workload and room-usage indicators from a finished timetable.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Load | Weekly teaching hours per faculty member |
//! | Imbalance | max load − min load |
//! | Longest run | Longest same-day block of back-to-back hours |
//! | Room utilisation | Occupied cells / 40 per classroom |
//! | Occupied cells | Cells holding at least one class |
//!
//! Faculty without any entry count with load 0.
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", Sec. 2.3

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Faculty, SlotCell, Timetable, CELL_COUNT};

/// Timetable performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimetableKpi {
    /// Weekly hours per faculty member, by name.
    pub load_by_faculty: BTreeMap<String, u32>,
    pub min_load: u32,
    pub max_load: u32,
    /// `max_load - min_load`.
    pub imbalance: u32,
    /// Longest back-to-back teaching block per faculty member, by name.
    pub longest_run_by_faculty: BTreeMap<String, u32>,
    /// Longest back-to-back block across all faculty.
    pub longest_run: u32,
    /// Fraction of the week each classroom is in use (0.0..1.0), by name.
    pub utilization_by_classroom: BTreeMap<String, f64>,
    /// Mean classroom utilisation.
    pub avg_utilization: f64,
    /// Cells with at least one class.
    pub occupied_cells: usize,
}

impl TimetableKpi {
    /// Computes KPIs from a timetable and its faculty list.
    ///
    /// # Arguments
    /// * `timetable` - The generated timetable.
    /// * `faculty` - All faculty, including those with no classes.
    pub fn calculate(timetable: &Timetable, faculty: &[Faculty]) -> Self {
        let mut cells_by_faculty: BTreeMap<String, BTreeSet<SlotCell>> = faculty
            .iter()
            .map(|f| (f.name.clone(), BTreeSet::new()))
            .collect();
        let mut cells_by_room: BTreeMap<String, BTreeSet<SlotCell>> = BTreeMap::new();
        let mut occupied: BTreeSet<SlotCell> = BTreeSet::new();

        for (day, entry) in timetable.entries() {
            let cell = SlotCell::new(day, entry.time_slot);
            cells_by_faculty
                .entry(entry.faculty_name.clone())
                .or_default()
                .insert(cell);
            cells_by_room
                .entry(entry.classroom_name.clone())
                .or_default()
                .insert(cell);
            occupied.insert(cell);
        }

        let load_by_faculty: BTreeMap<String, u32> = cells_by_faculty
            .iter()
            .map(|(name, cells)| (name.clone(), cells.len() as u32))
            .collect();
        let min_load = load_by_faculty.values().copied().min().unwrap_or(0);
        let max_load = load_by_faculty.values().copied().max().unwrap_or(0);

        let longest_run_by_faculty: BTreeMap<String, u32> = cells_by_faculty
            .iter()
            .map(|(name, cells)| (name.clone(), longest_run(cells)))
            .collect();
        let longest_run = longest_run_by_faculty.values().copied().max().unwrap_or(0);

        let utilization_by_classroom: BTreeMap<String, f64> = cells_by_room
            .iter()
            .map(|(name, cells)| (name.clone(), cells.len() as f64 / CELL_COUNT as f64))
            .collect();
        let avg_utilization = if utilization_by_classroom.is_empty() {
            0.0
        } else {
            let sum: f64 = utilization_by_classroom.values().sum();
            sum / utilization_by_classroom.len() as f64
        };

        Self {
            load_by_faculty,
            min_load,
            max_load,
            imbalance: max_load - min_load,
            longest_run_by_faculty,
            longest_run,
            utilization_by_classroom,
            avg_utilization,
            occupied_cells: occupied.len(),
        }
    }

    /// Whether the timetable meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_imbalance: u32, max_run: u32) -> bool {
        self.imbalance <= max_imbalance && self.longest_run <= max_run
    }
}

/// Longest chain of cells on one day with consecutive slots.
fn longest_run(cells: &BTreeSet<SlotCell>) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut prev: Option<SlotCell> = None;

    // BTreeSet iterates day-major, slot-minor
    for &cell in cells {
        let follows = prev.is_some_and(|p| p.day == cell.day && p.slot.next() == Some(cell.slot));
        run = if follows { run + 1 } else { 1 };
        best = best.max(run);
        prev = Some(cell);
    }
    best
}
