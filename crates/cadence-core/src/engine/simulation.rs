use super::backend::Backend;
use super::config::SimulationConfig;
use super::context::RunContext;
use super::error::EngineError;
use super::observer::{Control, Observer, Role};
use super::observers::speedometer::Speedometer;
use super::observers::targeters::TargetSteps;
use super::registry::{CallbackId, CallbackRegistry};
use super::scheduler::{self, Scheduler};
use super::sync::{Barrier, CancelToken, NoOpBarrier};
use super::timing;
use crate::core::models::system::System;
use crate::core::utils::mkdir;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// A targeter reached its condition; carries the reason it reported.
    Target(String),
    /// The run was cancelled through its [`CancelToken`].
    Cancelled,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub steps: u64,
    pub elapsed: Duration,
    pub termination: Termination,
}

/// Drives a step-based simulation.
///
/// The simulation owns its backend exclusively for the duration of a run and
/// repeatedly: computes the next trigger step across all registered observer
/// schedules and the checkpoint schedule, advances the backend to that step,
/// notifies exactly the observers due at that step, and checkpoints when
/// due. It ends on a targeter's terminate signal, on cancellation, or on the
/// first unexpected error.
pub struct Simulation<B: Backend> {
    backend: B,
    registry: CallbackRegistry<B>,
    checkpoint: Scheduler,
    output_path: Option<PathBuf>,
    restart: bool,
    max_steps: u64,
    steps: u64,
    initial_steps: u64,
    start_time: Instant,
    barrier: Box<dyn Barrier>,
    cancel: CancelToken,
    targeter: Option<CallbackId>,
}

impl<B: Backend + 'static> Simulation<B> {
    /// Creates a simulation around `backend` with the given run
    /// configuration.
    pub fn new(backend: B, config: SimulationConfig) -> Self {
        let mut simulation = Self {
            backend,
            registry: CallbackRegistry::new(),
            checkpoint: Scheduler::every(config.checkpoint_interval),
            output_path: config.output_path.clone(),
            restart: config.restart,
            max_steps: config.steps,
            steps: 0,
            initial_steps: 0,
            start_time: Instant::now(),
            barrier: Box::new(NoOpBarrier),
            cancel: CancelToken::new(),
            targeter: None,
        };
        if config.enable_speedometer {
            simulation.add(
                "speedometer",
                Role::Ordinary,
                Scheduler::spread(20),
                Box::new(Speedometer::new()),
            );
        }
        simulation
    }

    /// Registers an observer. Re-using a label replaces the previous
    /// registration and re-evaluates its position in the notification order.
    pub fn add(
        &mut self,
        label: impl Into<String>,
        role: Role,
        scheduler: impl Into<Scheduler>,
        observer: Box<dyn Observer<B>>,
    ) -> CallbackId {
        self.registry.add(label, role, scheduler, observer)
    }

    /// Removes an observer registration; stale handles are ignored.
    pub fn remove(&mut self, id: CallbackId) {
        self.registry.remove(id);
    }

    /// A token that cancels the run cleanly between loop iterations.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Replaces the pre-run synchronization barrier.
    pub fn set_barrier(&mut self, barrier: Box<dyn Barrier>) {
        self.barrier = barrier;
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The backend's physical system, if it carries one.
    pub fn system(&self) -> Option<&System> {
        self.backend.system()
    }

    /// The backend-owned trajectory handle, read-only.
    pub fn trajectory(&self) -> Option<&crate::core::io::xyz::XyzTrajectory> {
        self.backend.trajectory()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn initial_steps(&self) -> u64 {
        self.initial_steps
    }

    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
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
            self.backend.system().map(|s| s.particle.len()),
        )
    }

    /// Runs the simulation.
    ///
    /// A fresh run resets both step counters to zero and, when `steps` is
    /// given, adopts it as the new target. Resuming a run that already made
    /// progress keeps its original target; changing it mid-flight would make
    /// output cadences inconsistent.
    pub fn run(&mut self, steps: Option<u64>) -> Result<RunReport, EngineError> {
        if !self.restart || self.steps == 0 {
            if let Some(target) = steps {
                self.max_steps = target;
            }
            self.steps = 0;
            self.backend.set_steps(0);
        }

        // Bind the step targeter to the current target, replacing the one
        // from any previous run.
        if let Some(id) = self.targeter.take() {
            self.registry.remove(id);
        }
        let target = self.max_steps;
        let id = self.registry.add(
            "target-steps",
            Role::Targeter,
            Scheduler::every(target),
            Box::new(TargetSteps::new(target)),
        );
        self.targeter = Some(id);

        self.report_header();
        let result = self.drive();
        if let Err(err) = &result {
            error!("simulation failed: {}", err);
        }
        info!("goodbye");
        result
    }

    fn drive(&mut self) -> Result<RunReport, EngineError> {
        self.run_pre()?;
        self.initial_steps = self.steps;
        self.report_observers();

        self.registry
            .for_each_mut(|reg| reg.observer.on_run_start());

        // Before entering the loop, check whether we can quit right away.
        let targeters = self.registry.targeter_ids();
        if let Control::Terminate(reason) = self.notify(&targeters)? {
            return self.finish(reason);
        }
        // Fresh runs notify every ordinary observer once at the initial
        // step; resumed runs only re-notify rate reporters, so one-shot
        // observers do not fire twice.
        let initial = if self.steps == 0 {
            self.registry.ordinary_ids()
        } else {
            self.registry.rate_reporter_ids()
        };
        if let Control::Terminate(reason) = self.notify(&initial)? {
            return self.finish(reason);
        }

        info!(step = self.steps, "starting");
        loop {
            if self.cancel.is_cancelled() {
                info!(step = self.steps, "run cancelled");
                return Ok(RunReport {
                    steps: self.steps,
                    elapsed: self.start_time.elapsed(),
                    termination: Termination::Cancelled,
                });
            }

            // Run the simulation until any of the observers needs to be
            // called.
            let triggers: Vec<(CallbackId, u64)> = self
                .registry
                .iter()
                .map(|(id, reg)| (id, reg.scheduler.next_after(self.steps, self.max_steps)))
                .collect();
            let next_checkpoint = self.checkpoint.next_after(self.steps, self.max_steps);
            let next_step = triggers
                .iter()
                .map(|&(_, step)| step)
                .chain(std::iter::once(next_checkpoint))
                .min()
                .unwrap_or(scheduler::NEVER);

            self.advance(next_step)?;

            // Everything whose trigger landed on this exact step is due;
            // registry order keeps targeters last so output files are
            // complete before a targeter can end the run.
            let due: Vec<CallbackId> = triggers
                .iter()
                .filter(|&&(_, step)| step == next_step)
                .map(|&(id, _)| id)
                .collect();
            match self.notify(&due)? {
                Control::Terminate(reason) => return self.finish(reason),
                Control::Continue => {
                    if self.steps == next_checkpoint {
                        self.write_checkpoint()?;
                    }
                }
            }
        }
    }

    /// Preliminary step before the loop to deal with restart conditions.
    fn run_pre(&mut self) -> Result<(), EngineError> {
        self.start_time = Instant::now();
        if let Some(path) = self.output_path.clone() {
            if let Some(parent) = path.parent() {
                mkdir(parent)?;
            }
            self.backend.set_output_path(&path);
            if !self.restart {
                self.clear_observers()?;
            }
        }
        self.backend.run_pre(self.restart)?;
        // The backend may have reset its counter because of the restart;
        // adopt it as the engine's current step.
        if self.restart {
            self.steps = self.backend.steps();
        }
        self.barrier.wait();
        Ok(())
    }

    /// Advances the backend to an absolute step and synchronizes both step
    /// counters.
    fn advance(&mut self, step: u64) -> Result<(), EngineError> {
        self.backend.run_until(step)?;
        self.backend.set_steps(step);
        self.steps = step;
        Ok(())
    }

    /// Notifies the given registrations in order, stopping at the first
    /// terminate signal.
    pub fn notify(&mut self, ids: &[CallbackId]) -> Result<Control, EngineError> {
        for &id in ids {
            let steps = self.steps;
            let Some(reg) = self.registry.get_mut(id) else {
                continue;
            };
            debug!(label = %reg.label, step = steps, "notify");
            let mut run = RunContext {
                backend: &mut self.backend,
                steps,
                initial_steps: self.initial_steps,
                max_steps: self.max_steps,
                start_time: self.start_time,
                output_path: self.output_path.as_deref(),
            };
            match reg.observer.notify(&mut run) {
                Ok(Control::Continue) => {}
                Ok(Control::Terminate(reason)) => return Ok(Control::Terminate(reason)),
                Err(err) => {
                    return Err(EngineError::Observer {
                        label: reg.label.clone(),
                        step: steps,
                        source: Box::new(err),
                    });
                }
            }
        }
        Ok(Control::Continue)
    }

    fn clear_observers(&mut self) -> Result<(), EngineError> {
        for id in self.registry.ids() {
            let steps = self.steps;
            let Some(reg) = self.registry.get_mut(id) else {
                continue;
            };
            let mut run = RunContext {
                backend: &mut self.backend,
                steps,
                initial_steps: self.initial_steps,
                max_steps: self.max_steps,
                start_time: self.start_time,
                output_path: self.output_path.as_deref(),
            };
            if let Err(err) = reg.observer.clear(&mut run) {
                return Err(EngineError::Observer {
                    label: reg.label.clone(),
                    step: steps,
                    source: Box::new(err),
                });
            }
        }
        Ok(())
    }

    fn write_checkpoint(&mut self) -> Result<(), EngineError> {
        debug!(step = self.steps, "writing checkpoint");
        self.backend
            .write_checkpoint()
            .map_err(|err| EngineError::Checkpoint {
                step: self.steps,
                source: Box::new(err),
            })
    }

    /// Normal end of the run: final checkpoint, then the footer report.
    fn finish(&mut self, reason: String) -> Result<RunReport, EngineError> {
        info!(step = self.steps, "{}", reason);
        self.write_checkpoint()?;
        self.report_end();
        Ok(RunReport {
            steps: self.steps,
            elapsed: self.start_time.elapsed(),
            termination: Termination::Target(reason),
        })
    }

    fn report_header(&self) {
        info!("cadence {}", env!("CARGO_PKG_VERSION"));
        if let Some(version) = self.backend.version() {
            info!("backend version: {}", version);
        }
        info!("simulation starts");
        match &self.output_path {
            Some(path) => info!("output path: {}", path.display()),
            None => info!("output path: none"),
        }
    }

    fn report_observers(&self) {
        for (_, reg) in self.registry.iter() {
            match reg.role {
                Role::Targeter => info!("targeter {}: {}", reg.label, reg.scheduler),
                Role::Ordinary => info!("writer {}: {}", reg.label, reg.scheduler),
            }
        }
    }

    fn report_end(&self) {
        info!("simulation ended");
        info!("final steps: {}", self.steps);
        info!("final rmsd: {:.2}", self.backend.rmsd().unwrap_or(0.0));
        info!(
            "wall time [s]: {:.1}",
            self.elapsed_wall_time().as_secs_f64()
        );
        // Per-step figures are undefined on a zero-step run; skip them
        // rather than report nonsense.
        if self.wall_time_per_step().is_some() {
            info!(
                "average TSP [s/step/particle]: {:.2e}",
                self.wall_time_per_step_particle()
            );
        }
    }
}
