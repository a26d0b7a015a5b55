use crate::error::{CliError, Result};
use cadence::core::models::cell::Cell;
use cadence::core::models::particle::Particle;
use cadence::core::models::system::System;
use cadence::engine::config::SimulationConfig;
use nalgebra::Point3;
use serde::Deserialize;
use std::path::Path;

/// The run configuration file: the engine configuration plus a backend
/// description.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Which backend to drive, with its construction parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BackendConfig {
    /// No physical state; advances instantaneously.
    DryRun,
    /// Particles on a cubic lattice taking Gaussian displacement steps.
    RandomWalk {
        particles: usize,
        cell_side: f64,
        step_size: f64,
        #[serde(default)]
        temperature: Option<f64>,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::DryRun
    }
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|source| CliError::FileParsing {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Builds a system of identical particles on a cubic lattice filling the
/// given cell.
pub fn lattice_system(particles: usize, cell_side: f64) -> Result<System> {
    if particles == 0 {
        return Err(CliError::Argument(
            "backend needs at least one particle".to_string(),
        ));
    }
    if cell_side <= 0.0 {
        return Err(CliError::Argument(format!(
            "cell side must be positive, got {}",
            cell_side
        )));
    }

    let per_side = (particles as f64).cbrt().ceil() as usize;
    let spacing = cell_side / per_side as f64;
    let mut placed = Vec::with_capacity(particles);
    'fill: for ix in 0..per_side {
        for iy in 0..per_side {
            for iz in 0..per_side {
                if placed.len() == particles {
                    break 'fill;
                }
                let site = |i: usize| (i as f64 + 0.5) * spacing - cell_side / 2.0;
                placed.push(Particle::new(
                    "A",
                    Point3::new(site(ix), site(iy), site(iz)),
                ));
            }
        }
    }
    Ok(System::with_particles(placed, Some(Cell::cubic(cell_side))))
}
