use crate::cli::RunArgs;
use crate::config::{BackendConfig, FileConfig, lattice_system};
use crate::error::Result;
use crate::progress::ProgressObserver;
use cadence::backends::{DryRunBackend, RandomWalkBackend};
use cadence::engine::backend::Backend;
use cadence::engine::config::SimulationConfig;
use cadence::engine::observer::Role;
use cadence::engine::scheduler::Scheduler;
use cadence::engine::simulation::Termination;
use cadence::workflows;
use tracing::{debug, info};

pub fn run(args: RunArgs) -> Result<()> {
    let mut file = FileConfig::load(&args.config)?;
    apply_overrides(&mut file.simulation, &args);
    debug!("Effective run configuration: {:?}", &file.simulation);

    match file.backend.clone() {
        BackendConfig::DryRun => drive(DryRunBackend::new(), &file.simulation, args.progress),
        BackendConfig::RandomWalk {
            particles,
            cell_side,
            step_size,
            temperature,
        } => {
            let mut system = lattice_system(particles, cell_side)?;
            if let Some(temperature) = temperature {
                system.maxwellian(temperature, &mut rand::thread_rng());
            }
            drive(
                RandomWalkBackend::new(system, step_size),
                &file.simulation,
                args.progress,
            )
        }
    }
}

fn apply_overrides(config: &mut SimulationConfig, args: &RunArgs) {
    if let Some(output) = &args.output {
        config.output_path = Some(output.clone());
    }
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if args.restart {
        config.restart = true;
    }
}

fn drive<B: Backend + 'static>(backend: B, config: &SimulationConfig, progress: bool) -> Result<()> {
    let mut simulation = workflows::prepare(backend, config);
    if progress {
        simulation.add(
            "progress-bar",
            Role::Ordinary,
            Scheduler::spread(100),
            Box::new(ProgressObserver::new()),
        );
    }

    let report = simulation.run(None)?;
    match &report.termination {
        Termination::Target(reason) => info!("Run finished: {}", reason),
        Termination::Cancelled => info!("Run cancelled at step {}.", report.steps),
    }
    Ok(())
}
