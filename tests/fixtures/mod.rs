//! Test fixtures for agv-router.
//!
//! Provides small hand-made plants (including the four-point reference
//! layout) and a generated grid plant for load and concurrency tests.

pub mod plants;

pub use plants::*;
