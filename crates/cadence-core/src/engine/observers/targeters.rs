use crate::engine::backend::Backend;
use crate::engine::context::RunContext;
use crate::engine::error::EngineError;
use crate::engine::observer::{Control, Observer};
use std::time::Duration;
use tracing::debug;

/// Ends the run once the step counter reaches a target.
///
/// The engine registers one of these automatically, bound to the run's
/// `max_steps`.
#[derive(Debug, Clone, Copy)]
pub struct TargetSteps {
    target: u64,
}

impl TargetSteps {
    pub fn new(target: u64) -> Self {
        Self { target }
    }

    pub fn target(&self) -> u64 {
        self.target
    }
}

impl<B: Backend> Observer<B> for TargetSteps {
    fn notify(&mut self, run: &mut RunContext<'_, B>) -> Result<Control, EngineError> {
        if run.steps >= self.target {
            Ok(Control::Terminate(format!(
                "reached target steps {}",
                self.target
            )))
        } else {
            Ok(Control::Continue)
        }
    }
}

/// Ends the run once the root mean square displacement reaches a target.
#[derive(Debug, Clone, Copy)]
pub struct TargetRmsd {
    target: f64,
}

impl TargetRmsd {
    pub fn new(target: f64) -> Self {
        Self { target }
    }
}

impl<B: Backend> Observer<B> for TargetRmsd {
    fn notify(&mut self, run: &mut RunContext<'_, B>) -> Result<Control, EngineError> {
        let rmsd = run.rmsd();
        if self.target > 0.0 {
            debug!(
                rmsd,
                progress = (rmsd / self.target * 100.0) as i64,
                "target rmsd"
            );
        }
        if rmsd >= self.target {
            Ok(Control::Terminate(format!(
                "reached target rmsd {:.4}",
                self.target
            )))
        } else {
            Ok(Control::Continue)
        }
    }
}

/// Ends the run once the elapsed wall time exceeds a limit.
///
/// Useful for self-restarting jobs in a queueing system with time limits.
#[derive(Debug, Clone, Copy)]
pub struct TargetWallTime {
    limit: Duration,
}

impl TargetWallTime {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }
}

impl<B: Backend> Observer<B> for TargetWallTime {
    fn notify(&mut self, run: &mut RunContext<'_, B>) -> Result<Control, EngineError> {
        let elapsed = run.elapsed_wall_time();
        if elapsed > self.limit {
            Ok(Control::Terminate("target wall time reached".to_string()))
        } else {
            debug!(
                elapsed_s = elapsed.as_secs_f64(),
                remaining_s = (self.limit - elapsed).as_secs_f64(),
                "target wall time"
            );
            Ok(Control::Continue)
        }
    }
}

/// Ends the run smoothly when a `STOP` file appears near the output path.
///
/// The file is probed at this observer's cadence and is not deleted, so all
/// processes of a parallel job see it and exit together.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopFile;

impl StopFile {
    pub fn new() -> Self {
        Self
    }
}

impl<B: Backend> Observer<B> for StopFile {
    fn notify(&mut self, run: &mut RunContext<'_, B>) -> Result<Control, EngineError> {
        let Some(output) = run.output_path else {
            return Ok(Control::Continue);
        };
        let stop = if output.is_dir() {
            output.join("STOP")
        } else {
            match output.parent() {
                Some(parent) => parent.join("STOP"),
                None => return Ok(Control::Continue),
            }
        };
        if stop.exists() {
            Ok(Control::Terminate(
                "user has stopped the simulation".to_string(),
            ))
        } else {
            Ok(Control::Continue)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::dryrun::DryRunBackend;
    use std::time::Instant;

    fn context<'a>(
        backend: &'a mut DryRunBackend,
        steps: u64,
        output_path: Option<&'a std::path::Path>,
    ) -> RunContext<'a, DryRunBackend> {
        RunContext {
            backend,
            steps,
            initial_steps: 0,
            max_steps: 100,
            start_time: Instant::now(),
            output_path,
        }
    }

    #[test]
    fn target_steps_fires_at_and_past_target() {
        let mut backend = DryRunBackend::new();
        let mut targeter = TargetSteps::new(10);

        let mut run = context(&mut backend, 9, None);
        assert_eq!(targeter.notify(&mut run).unwrap(), Control::Continue);

        let mut run = context(&mut backend, 10, None);
        assert!(matches!(
            targeter.notify(&mut run).unwrap(),
            Control::Terminate(_)
        ));

        let mut run = context(&mut backend, 11, None);
        assert!(matches!(
            targeter.notify(&mut run).unwrap(),
            Control::Terminate(_)
        ));
    }

    #[test]
    fn target_rmsd_defaults_to_zero_without_backend_support() {
        let mut backend = DryRunBackend::new();
        let mut targeter = TargetRmsd::new(2.5);
        let mut run = context(&mut backend, 5, None);
        // DryRunBackend reports no rmsd, so the default 0.0 never reaches 2.5.
        assert_eq!(targeter.notify(&mut run).unwrap(), Control::Continue);
    }

    #[test]
    fn wall_time_limit_trips_after_deadline() {
        let mut backend = DryRunBackend::new();
        let mut targeter = TargetWallTime::new(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        let mut run = context(&mut backend, 5, None);
        assert!(matches!(
            targeter.notify(&mut run).unwrap(),
            Control::Terminate(_)
        ));
    }

    #[test]
    fn stop_file_next_to_output_ends_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("run.xyz");
        let mut backend = DryRunBackend::new();
        let mut probe = StopFile::new();

        let mut run = context(&mut backend, 5, Some(&output));
        assert_eq!(probe.notify(&mut run).unwrap(), Control::Continue);

        std::fs::write(dir.path().join("STOP"), "").unwrap();
        let mut run = context(&mut backend, 6, Some(&output));
        assert!(matches!(
            probe.notify(&mut run).unwrap(),
            Control::Terminate(_)
        ));
    }
}
