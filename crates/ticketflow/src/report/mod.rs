//! Observations and per-stage reports.

mod observation;
mod stage;

pub use observation::{Observation, ObservationKind, Severity};
pub use stage::{FilterStep, Stage, StageReport};
