//! caresense-core
//!
//! Pure domain types and S3 key conventions.
//! No AWS SDK dependency; this is the shared vocabulary of the CareSense system.

pub mod error;
pub mod models;
pub mod s3_keys;
