use crate::core::io::xyz::XyzTrajectory;
use crate::core::models::system::System;
use crate::core::utils::path_with_suffix;
use crate::engine::backend::Backend;
use crate::engine::error::EngineError;
use rand_distr::{Distribution, Normal};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A backend whose particles take uncorrelated Gaussian displacement steps.
///
/// There is no interaction and no integrator; this is demo dynamics that
/// nevertheless exercises the full backend contract: a real system, rmsd
/// tracking against the initial configuration, and checkpoint/restart
/// support through a single-frame XYZ file next to the output path.
#[derive(Debug, Clone)]
pub struct RandomWalkBackend {
    system: System,
    reference: System,
    step_size: f64,
    steps: u64,
    output_path: Option<PathBuf>,
    checkpoint: Option<XyzTrajectory>,
    trajectory: Option<XyzTrajectory>,
}

impl RandomWalkBackend {
    /// Creates a backend walking the given system with the given
    /// per-step displacement scale.
    pub fn new(system: System, step_size: f64) -> Self {
        let reference = system.clone();
        Self {
            system,
            reference,
            step_size: step_size.abs(),
            steps: 0,
            output_path: None,
            checkpoint: None,
            trajectory: None,
        }
    }
}

impl Backend for RandomWalkBackend {
    fn run_until(&mut self, step: u64) -> Result<(), EngineError> {
        let sweeps = step.saturating_sub(self.steps);
        let normal = Normal::new(0.0, self.step_size)
            .map_err(|err| EngineError::Internal(format!("invalid step size: {}", err)))?;
        let mut rng = rand::thread_rng();
        for _ in 0..sweeps {
            for p in &mut self.system.particle {
                for axis in 0..3 {
                    p.position[axis] += normal.sample(&mut rng);
                }
            }
        }
        self.steps = step;
        Ok(())
    }

    fn steps(&self) -> u64 {
        self.steps
    }

    fn set_steps(&mut self, steps: u64) {
        self.steps = steps;
    }

    fn run_pre(&mut self, restart: bool) -> Result<(), EngineError> {
        if !restart {
            return Ok(());
        }
        let Some(checkpoint) = &self.checkpoint else {
            return Ok(());
        };
        if !checkpoint.path().exists() {
            debug!("restart requested but no checkpoint found, starting fresh");
            return Ok(());
        }
        if let Some(frame) = checkpoint.read_last_frame()? {
            debug!(step = frame.step, "resuming from checkpoint");
            self.steps = frame.step;
            self.system = frame.system;
        }
        Ok(())
    }

    fn write_checkpoint(&mut self) -> Result<(), EngineError> {
        if let Some(checkpoint) = &self.checkpoint {
            checkpoint.write_single_frame(&self.system, self.steps)?;
        }
        Ok(())
    }

    fn set_output_path(&mut self, path: &Path) {
        self.checkpoint = Some(XyzTrajectory::new(path_with_suffix(path, ".chk")));
        self.trajectory = Some(XyzTrajectory::new(path));
        self.output_path = Some(path.to_path_buf());
    }

    fn version(&self) -> Option<&str> {
        Some("random-walk")
    }

    fn system(&self) -> Option<&System> {
        Some(&self.system)
    }

    fn system_mut(&mut self) -> Option<&mut System> {
        Some(&mut self.system)
    }

    fn rmsd(&self) -> Option<f64> {
        Some(self.system.mean_square_displacement(&self.reference).sqrt())
    }

    fn trajectory(&self) -> Option<&XyzTrajectory> {
        self.trajectory.as_ref()
    }
}
