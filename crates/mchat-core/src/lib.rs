//! mchat-core
//!
//! Pure domain types for M-CHAT-R screenings: patient metadata, answers,
//! risk levels, derived results and the report handed to export.
//! No I/O; this is the shared vocabulary of the workspace.

pub mod age;
pub mod error;
pub mod models;

/// Number of items on the M-CHAT-R.
pub const QUESTION_COUNT: usize = 20;
