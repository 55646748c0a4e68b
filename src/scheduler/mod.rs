//! Timetable generation and KPI evaluation.
//!
//! Runs the full pipeline from request to timetable and measures the
//! result.
//!
//! # Algorithm
//!
//! `TimetableScheduler` validates the request, encodes it as a constraint
//! satisfaction problem, searches for a clash-free placement, improves the
//! workload spread, then assembles and re-checks the timetable. The same
//! request and seed always give the same timetable.
//!
//! # KPI
//!
//! `TimetableKpi` computes faculty load, load imbalance, consecutive-hour
//! runs and classroom utilisation.
//!
//! # Concurrency
//!
//! Generation is a single blocking call. `GenerationGate` keeps at most one
//! generation in flight and lets a newer request cancel an older one.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated Timetabling"

mod assemble;
mod gate;
mod generate;
mod kpi;

pub use gate::{GenerationGate, GenerationTicket};
pub use generate::{Solution, SolveStats, TimetableRequest, TimetableScheduler};
pub use kpi::TimetableKpi;
