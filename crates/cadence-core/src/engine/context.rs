use super::backend::Backend;
use super::timing;
use crate::core::models::system::System;
use std::path::Path;
use std::time::{Duration, Instant};

/// The slice of engine state an observer sees while being notified.
///
/// Observers receive the backend mutably plus copies of the engine's step
/// bookkeeping; the callback registry itself is never reachable from here,
/// so an observer cannot mutate the notification order mid-batch.
pub struct RunContext<'a, B: Backend> {
    pub backend: &'a mut B,
    pub steps: u64,
    pub initial_steps: u64,
    pub max_steps: u64,
    pub start_time: Instant,
    pub output_path: Option<&'a Path>,
}

impl<'a, B: Backend> RunContext<'a, B> {
    /// The physical system, when the backend carries one.
    pub fn system(&self) -> Option<&System> {
        self.backend.system()
    }

    /// Root mean square displacement, defaulting to 0 when the backend does
    /// not track it.
    pub fn rmsd(&self) -> f64 {
        self.backend.rmsd().unwrap_or(0.0)
    }

    /// Wall-clock time elapsed since the run started.
    pub fn elapsed_wall_time(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Wall time per step in seconds, undefined until a step has elapsed.
    pub fn wall_time_per_step(&self) -> Option<f64> {
        timing::wall_time_per_step(self.elapsed_wall_time(), self.steps, self.initial_steps)
    }

    /// Wall time per step and particle in seconds, 0 without a system.
    pub fn wall_time_per_step_particle(&self) -> f64 {
        timing::wall_time_per_step_particle(
            self.wall_time_per_step(),
            self.system().map(|s| s.particle.len()),
        )
    }
}
