//! Configuration management
//!
//! Mining difficulty, data directory and log level, resolved from defaults,
//! an optional TOML file, and `LEDGER_*` environment variables.

pub mod settings;

pub use settings::{Config, DEFAULT_DIFFICULTY, GLOBAL_CONFIG};
