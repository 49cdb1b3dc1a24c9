//! caresense-cli
//!
//! Operator tooling for the scoring engine. The `caresense` binary lives
//! in `main.rs`; config and the offline scoring path are here so they
//! can be tested without a process boundary.

pub mod args;
pub mod commands;
pub mod config;
