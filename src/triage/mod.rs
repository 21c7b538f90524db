//! Vomiting triage over the knowledge base.
//!
//! Structured clinical input → signals → red-flag gate → acute/chronic
//! branch → ranked candidate branches → priority level. Hospital-facing:
//! the output guides staff questioning, it is not an owner-facing
//! diagnosis.

pub mod evaluator;
pub mod signals;
pub mod types;

pub use evaluator::{evaluate, match_node, triage};
pub use signals::{derive_signals, BloodType, EnergyLevel, Signal, TriageInput, UrineOutput};
pub use types::{Candidate, PriorityLevel, TriageResult};
