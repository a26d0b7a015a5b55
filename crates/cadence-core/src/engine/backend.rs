use super::error::EngineError;
use crate::core::io::xyz::XyzTrajectory;
use crate::core::models::system::System;
use std::path::Path;

/// The step-advancing contract consumed by the engine.
///
/// A backend owns the physical state and its own step counter; the engine
/// drives it between observer trigger steps and never touches physics. Every
/// capability beyond advancing is optional: the default implementations
/// encode "absent and tolerated", so a minimal backend only supplies
/// [`run_until`](Backend::run_until) and the step counter.
///
/// The backend is exclusively owned by the simulation for the duration of a
/// run; it is driven, never destroyed.
pub trait Backend {
    /// Advances physical state until the given absolute step. May block.
    fn run_until(&mut self, step: u64) -> Result<(), EngineError>;

    /// The backend's own step counter.
    fn steps(&self) -> u64;

    /// Overwrites the backend's step counter.
    fn set_steps(&mut self, steps: u64);

    /// Backend-specific setup before a run starts.
    ///
    /// On restart, the backend may adjust its step counter to the resumed
    /// value; the engine adopts it afterwards.
    fn run_pre(&mut self, restart: bool) -> Result<(), EngineError> {
        let _ = restart;
        Ok(())
    }

    /// Persists resumable state. Backends without checkpoint support keep
    /// the default no-op.
    fn write_checkpoint(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    /// Base location for backend-owned outputs.
    fn set_output_path(&mut self, path: &Path) {
        let _ = path;
    }

    /// Backend version string, used only for reporting.
    fn version(&self) -> Option<&str> {
        None
    }

    /// The physical system, when the backend carries one.
    fn system(&self) -> Option<&System> {
        None
    }

    /// Mutable access to the physical system.
    fn system_mut(&mut self) -> Option<&mut System> {
        None
    }

    /// Root mean square displacement since the start of the run, when the
    /// backend tracks it.
    fn rmsd(&self) -> Option<f64> {
        None
    }

    /// The backend-owned trajectory handle, exposed read-only.
    fn trajectory(&self) -> Option<&XyzTrajectory> {
        None
    }
}
