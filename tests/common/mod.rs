//! Common test utilities for tspw CLI tests.
//!
//! This module provides:
//! - `TestEnv`: isolated working directory and home, plus a fake `tsc`
//! - Fixtures: the fake compiler script

pub mod env;
pub mod fixtures;

pub use env::*;
