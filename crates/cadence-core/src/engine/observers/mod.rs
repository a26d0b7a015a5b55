//! # Standard Observers
//!
//! The bundled units of periodic work: file writers, run targeters, and the
//! speedometer. Each one is an ordinary [`Observer`](super::observer::Observer)
//! implementation; production codes register their own alongside these.

pub mod speedometer;
pub mod targeters;
pub mod writers;

pub use speedometer::Speedometer;
pub use targeters::{StopFile, TargetRmsd, TargetSteps, TargetWallTime};
pub use writers::{ThermoWriter, TrajectoryWriter};
