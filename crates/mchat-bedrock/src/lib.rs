//! mchat-bedrock
//!
//! Narrative analysis of screening results via the Bedrock Converse API.

pub mod error;
pub mod generate;
pub mod prompt;
pub mod tokens;
