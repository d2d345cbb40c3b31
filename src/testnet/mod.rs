//! Test fixtures
//!
//! Helpers for building small chains, temporary stores and pre-seeded asset
//! stores inside unit tests.

pub mod test_utils;

pub use test_utils::*;
