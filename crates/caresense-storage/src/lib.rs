//! caresense-storage
//!
//! Persistence for patients, assessments and per-test result records.
//! The scoring engine never touches storage directly; the service layer
//! reads and writes through [`store::AssessmentStore`].

pub mod client;
pub mod error;
pub mod memory;
pub mod objects;
pub mod s3_store;
pub mod state;
pub mod store;
