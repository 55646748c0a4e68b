//! Weekly slot catalog and cell sets.
//!
//! The teaching week is a fixed grid: five weekdays (Monday to Friday)
//! by eight one-hour slots (09:00 to 17:00), 40 cells in total.
//! Faculty availability and classroom blocked periods are both sets of
//! cells on that grid.
//!
//! # Ordering
//! Cells order by day first, then slot. Every iteration over the grid in
//! this crate follows that order, which keeps solver output reproducible.
//!
//! # Wire Format
//! A [`SlotSet`] serializes as a list of `{ "day": "Monday", "timeSlots":
//! ["09:00 - 10:00", ...] }` records, one per day that has cells.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Number of teaching days in the week.
pub const DAYS_PER_WEEK: usize = 5;
/// Number of one-hour slots per day.
pub const SLOTS_PER_DAY: usize = 8;
/// Total number of (day, slot) cells in the week.
pub const CELL_COUNT: usize = DAYS_PER_WEEK * SLOTS_PER_DAY;

const SLOT_LABELS: [&str; SLOTS_PER_DAY] = [
    "09:00 - 10:00",
    "10:00 - 11:00",
    "11:00 - 12:00",
    "12:00 - 13:00",
    "13:00 - 14:00",
    "14:00 - 15:00",
    "15:00 - 16:00",
    "16:00 - 17:00",
];

/// A teaching day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(alias = "monday")]
    Monday,
    #[serde(alias = "tuesday")]
    Tuesday,
    #[serde(alias = "wednesday")]
    Wednesday,
    #[serde(alias = "thursday")]
    Thursday,
    #[serde(alias = "friday")]
    Friday,
}

impl Weekday {
    /// All teaching days in calendar order.
    pub const ALL: [Weekday; DAYS_PER_WEEK] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Zero-based position in the week.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Day at a zero-based position, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Display name ("Monday").
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        }
    }

    /// Lowercase key used in timetable output ("monday").
    pub fn key(self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown weekday '{s}'"))
    }
}

/// A one-hour teaching slot, 0 = 09:00-10:00 through 7 = 16:00-17:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot(u8);

impl TimeSlot {
    /// All slots in chronological order.
    pub const ALL: [TimeSlot; SLOTS_PER_DAY] = [
        TimeSlot(0),
        TimeSlot(1),
        TimeSlot(2),
        TimeSlot(3),
        TimeSlot(4),
        TimeSlot(5),
        TimeSlot(6),
        TimeSlot(7),
    ];

    /// Slot at a zero-based position, if within the catalog.
    pub fn new(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Slot starting at the given hour (9..=16).
    pub fn starting_at(hour: u8) -> Option<Self> {
        hour.checked_sub(9).and_then(|i| Self::new(i as usize))
    }

    /// Zero-based position in the day.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Start hour on a 24-hour clock.
    #[inline]
    pub fn start_hour(self) -> u8 {
        9 + self.0
    }

    /// Canonical label, e.g. `"09:00 - 10:00"`.
    pub fn label(self) -> &'static str {
        SLOT_LABELS[self.index()]
    }

    /// Parses a slot label. Whitespace is ignored, so `"09:00-10:00"`
    /// is accepted as well as the canonical form.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted: String = label.chars().filter(|c| !c.is_whitespace()).collect();
        SLOT_LABELS
            .iter()
            .position(|l| l.chars().filter(|c| !c.is_whitespace()).eq(wanted.chars()))
            .and_then(Self::new)
    }

    /// The slot immediately after this one on the same day.
    pub fn next(self) -> Option<Self> {
        Self::new(self.index() + 1)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.label().to_string()
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_label(&value).ok_or_else(|| format!("unknown time slot '{value}'"))
    }
}

/// A (day, slot) cell of the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotCell {
    pub day: Weekday,
    pub slot: TimeSlot,
}

impl SlotCell {
    /// Creates a cell.
    pub fn new(day: Weekday, slot: TimeSlot) -> Self {
        Self { day, slot }
    }

    /// Dense index in `0..CELL_COUNT`, day-major.
    #[inline]
    pub fn index(self) -> usize {
        self.day.index() * SLOTS_PER_DAY + self.slot.index()
    }

    /// Cell at a dense index.
    pub fn from_index(index: usize) -> Option<Self> {
        let day = Weekday::from_index(index / SLOTS_PER_DAY)?;
        let slot = TimeSlot::new(index % SLOTS_PER_DAY)?;
        Some(Self { day, slot })
    }

    /// Iterates all 40 cells in grid order.
    pub fn all() -> impl Iterator<Item = SlotCell> {
        (0..CELL_COUNT).filter_map(Self::from_index)
    }
}

impl fmt::Display for SlotCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.slot)
    }
}

/// A set of cells on the weekly grid.
///
/// Used for faculty availability (cells the person can teach) and for
/// classroom blocked periods (cells the room cannot be used).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<DaySlots>", into = "Vec<DaySlots>")]
pub struct SlotSet {
    cells: BTreeSet<SlotCell>,
}

/// Wire form of one day's worth of a [`SlotSet`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySlots {
    pub day: Weekday,
    pub time_slots: Vec<TimeSlot>,
}

impl SlotSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every cell of the week.
    pub fn full_week() -> Self {
        Self {
            cells: SlotCell::all().collect(),
        }
    }

    /// Adds the given slots on one day.
    pub fn with_day(mut self, day: Weekday, slots: impl IntoIterator<Item = TimeSlot>) -> Self {
        for slot in slots {
            self.cells.insert(SlotCell::new(day, slot));
        }
        self
    }

    /// Adds every slot of one day.
    pub fn with_whole_day(self, day: Weekday) -> Self {
        self.with_day(day, TimeSlot::ALL)
    }

    /// Adds a single cell.
    pub fn with_cell(mut self, cell: SlotCell) -> Self {
        self.cells.insert(cell);
        self
    }

    /// Inserts a cell. Returns `false` if it was already present.
    pub fn insert(&mut self, cell: SlotCell) -> bool {
        self.cells.insert(cell)
    }

    /// Whether the cell is in the set.
    #[inline]
    pub fn contains(&self, cell: SlotCell) -> bool {
        self.cells.contains(&cell)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the set has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in grid order.
    pub fn iter(&self) -> impl Iterator<Item = SlotCell> + '_ {
        self.cells.iter().copied()
    }

    /// Slots present on a given day, in order.
    pub fn slots_on(&self, day: Weekday) -> Vec<TimeSlot> {
        self.cells
            .iter()
            .filter(|c| c.day == day)
            .map(|c| c.slot)
            .collect()
    }
}

impl From<Vec<DaySlots>> for SlotSet {
    fn from(days: Vec<DaySlots>) -> Self {
        days.into_iter()
            .fold(SlotSet::new(), |set, d| set.with_day(d.day, d.time_slots))
    }
}

impl From<SlotSet> for Vec<DaySlots> {
    fn from(set: SlotSet) -> Self {
        Weekday::ALL
            .iter()
            .filter_map(|&day| {
                let time_slots = set.slots_on(day);
                (!time_slots.is_empty()).then_some(DaySlots { day, time_slots })
            })
            .collect()
    }
}

impl FromIterator<SlotCell> for SlotSet {
    fn from_iter<I: IntoIterator<Item = SlotCell>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}
