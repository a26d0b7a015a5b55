use crate::core::io::xyz::XyzTrajectory;
use crate::engine::backend::Backend;
use crate::engine::context::RunContext;
use crate::engine::error::EngineError;
use crate::engine::observer::{Control, Observer};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Appends trajectory frames to an XYZ file at its scheduled cadence.
pub struct TrajectoryWriter {
    trajectory: XyzTrajectory,
}

impl TrajectoryWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            trajectory: XyzTrajectory::new(path.into()),
        }
    }

    pub fn trajectory(&self) -> &XyzTrajectory {
        &self.trajectory
    }
}

impl<B: Backend> Observer<B> for TrajectoryWriter {
    fn notify(&mut self, run: &mut RunContext<'_, B>) -> Result<Control, EngineError> {
        let Some(system) = run.backend.system() else {
            debug!(step = run.steps, "no system attached, skipping trajectory frame");
            return Ok(Control::Continue);
        };
        self.trajectory.write_frame(system, run.steps)?;
        Ok(Control::Continue)
    }

    fn clear(&mut self, _run: &mut RunContext<'_, B>) -> Result<(), EngineError> {
        self.trajectory.clear()?;
        Ok(())
    }
}

/// Writes basic thermodynamic data as a columnar text file.
///
/// The header row is written at step zero; later notifications append one
/// record per call.
pub struct ThermoWriter {
    path: PathBuf,
}

impl ThermoWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl<B: Backend> Observer<B> for ThermoWriter {
    fn notify(&mut self, run: &mut RunContext<'_, B>) -> Result<Control, EngineError> {
        let Some(system) = run.backend.system() else {
            debug!(step = run.steps, "no system attached, skipping thermo record");
            return Ok(Control::Continue);
        };
        if run.steps == 0 {
            std::fs::write(
                &self.path,
                "# columns: steps, temperature, potential energy, kinetic energy, total energy, rmsd\n",
            )?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "{} {:.6} {:.6} {:.6} {:.6} {:.6}",
            run.steps,
            system.temperature(None),
            system.potential_energy_per_particle(),
            system.kinetic_energy_per_particle(),
            system.total_energy_per_particle(),
            run.backend.rmsd().unwrap_or(0.0),
        )?;
        Ok(Control::Continue)
    }

    fn clear(&mut self, _run: &mut RunContext<'_, B>) -> Result<(), EngineError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
