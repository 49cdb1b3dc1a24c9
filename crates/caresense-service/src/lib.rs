//! caresense-service
//!
//! The assessment workflow around the scoring engine: result submission,
//! status transitions, final-risk computation and recalculation.

pub mod error;
pub mod events;
pub mod service;

pub use service::{AssessmentService, AssessmentSummary, Submission};
