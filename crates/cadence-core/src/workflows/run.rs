use crate::core::utils::path_with_suffix;
use crate::engine::backend::Backend;
use crate::engine::config::SimulationConfig;
use crate::engine::error::EngineError;
use crate::engine::observer::Role;
use crate::engine::observers::{ThermoWriter, TrajectoryWriter};
use crate::engine::scheduler::Scheduler;
use crate::engine::simulation::{RunReport, Simulation};
use tracing::{info, instrument};

/// Builds a simulation with the standard observers registered according to
/// the config: a trajectory writer on the output path, a thermo writer next
/// to it, and (through the engine itself) the speedometer and the step
/// targeter.
///
/// Callers that need extra observers register them on the returned
/// simulation before calling [`Simulation::run`].
pub fn prepare<B: Backend + 'static>(backend: B, config: &SimulationConfig) -> Simulation<B> {
    let mut simulation = Simulation::new(backend, config.clone());

    if let Some(output) = &config.output_path {
        if config.trajectory_interval > 0 {
            simulation.add(
                "write-trajectory",
                Role::Ordinary,
                Scheduler::every(config.trajectory_interval),
                Box::new(TrajectoryWriter::new(output.clone())),
            );
        }
        if config.thermo_interval > 0 {
            simulation.add(
                "write-thermo",
                Role::Ordinary,
                Scheduler::every(config.thermo_interval),
                Box::new(ThermoWriter::new(path_with_suffix(output, ".thermo"))),
            );
        }
    }

    simulation
}

/// Runs a complete simulation from a configuration.
///
/// The simulation is returned alongside the report so callers can inspect
/// the final state.
#[instrument(skip_all, name = "run_workflow")]
pub fn run<B: Backend + 'static>(
    backend: B,
    config: &SimulationConfig,
) -> Result<(Simulation<B>, RunReport), EngineError> {
    let mut simulation = prepare(backend, config);
    let report = simulation.run(None)?;
    info!(
        steps = report.steps,
        elapsed_s = report.elapsed.as_secs_f64(),
        "workflow complete"
    );
    Ok((simulation, report))
}
