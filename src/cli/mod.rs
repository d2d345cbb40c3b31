//! Command-line interface
//!
//! Argument parsing for the demo driver and the ledger and asset commands.

pub mod commands;

pub use commands::{Command, Opt};
