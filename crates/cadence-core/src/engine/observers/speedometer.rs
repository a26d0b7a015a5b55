use crate::core::utils::format_duration;
use crate::engine::backend::Backend;
use crate::engine::context::RunContext;
use crate::engine::error::EngineError;
use crate::engine::observer::{Control, Observer};
use std::time::Instant;
use tracing::info;

/// Reports the speed of the simulation and the remaining time to target.
///
/// The first notification of a run only takes a measurement; subsequent ones
/// log progress, the stepping rate, the estimated time of completion, and
/// the per-step-per-particle cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct Speedometer {
    last: Option<(Instant, u64)>,
}

impl Speedometer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: Backend> Observer<B> for Speedometer {
    fn notify(&mut self, run: &mut RunContext<'_, B>) -> Result<Control, EngineError> {
        let now = Instant::now();
        let Some((t_last, x_last)) = self.last.replace((now, run.steps)) else {
            return Ok(Control::Continue);
        };

        let dt = now.duration_since(t_last).as_secs_f64();
        if dt <= 0.0 || run.max_steps == 0 {
            return Ok(Control::Continue);
        }
        let speed = run.steps.saturating_sub(x_last) as f64 / dt;
        if speed <= 0.0 {
            return Ok(Control::Continue);
        }
        let fraction = run.steps as f64 / run.max_steps as f64;
        let eta = run.max_steps.saturating_sub(run.steps) as f64 / speed;
        info!(
            "steps: {:3.0}% {}/{} eta: {} rate: {:.2e} steps/s tsp: {:.2e} s/step/particle",
            fraction * 100.0,
            run.steps,
            run.max_steps,
            format_duration(eta),
            speed,
            run.wall_time_per_step_particle(),
        );
        Ok(Control::Continue)
    }

    fn on_run_start(&mut self) {
        self.last = None;
    }

    fn rate_reporter(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::dryrun::DryRunBackend;

    fn context<'a>(backend: &'a mut DryRunBackend, steps: u64) -> RunContext<'a, DryRunBackend> {
        RunContext {
            backend,
            steps,
            initial_steps: 0,
            max_steps: 100,
            start_time: Instant::now(),
            output_path: None,
        }
    }

    #[test]
    fn first_call_only_measures() {
        let mut backend = DryRunBackend::new();
        let mut meter = Speedometer::new();
        let mut run = context(&mut backend, 10);
        assert_eq!(meter.notify(&mut run).unwrap(), Control::Continue);
        assert!(meter.last.is_some());
    }

    #[test]
    fn run_start_resets_measurement() {
        let mut backend = DryRunBackend::new();
        let mut meter = Speedometer::new();
        let mut run = context(&mut backend, 10);
        meter.notify(&mut run).unwrap();
        Observer::<DryRunBackend>::on_run_start(&mut meter);
        assert!(meter.last.is_none());
    }

    #[test]
    fn speedometer_is_a_rate_reporter() {
        let meter = Speedometer::new();
        assert!(Observer::<DryRunBackend>::rate_reporter(&meter));
    }
}
