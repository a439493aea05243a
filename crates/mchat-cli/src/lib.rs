//! mchat-cli library root.
//!
//! Re-exports the front-end modules so integration tests can drive the
//! session and the interactive loop without a terminal.

pub mod aws;
pub mod commands;
pub mod config;
pub mod screen;
pub mod session;
