//! # Workflows Module
//!
//! The highest-level, user-facing layer. A workflow ties the engine and the
//! core models together to execute a complete procedure; [`run`] drives a
//! full simulation from a [`SimulationConfig`](crate::engine::config::SimulationConfig),
//! registering the standard writers and reporters before stepping.

pub mod run;

pub use run::{prepare, run};
