use cadence::engine::backend::Backend;
use cadence::engine::context::RunContext;
use cadence::engine::error::EngineError;
use cadence::engine::observer::{Control, Observer};
use indicatif::{ProgressBar, ProgressState, ProgressStyle};

/// An engine observer that mirrors stepping progress onto an indicatif bar.
///
/// Registered as a rate reporter so it keeps updating when a run resumes
/// from a checkpoint.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0).with_style(Self::bar_style());
        bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        Self { bar }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("stepping [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .expect("Failed to create bar style template")
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Observer<B> for ProgressObserver {
    fn notify(&mut self, run: &mut RunContext<'_, B>) -> Result<Control, EngineError> {
        if self.bar.length() != Some(run.max_steps) {
            self.bar.set_length(run.max_steps);
        }
        self.bar.set_position(run.steps);
        if run.steps >= run.max_steps {
            self.bar.finish();
        }
        Ok(Control::Continue)
    }

    fn on_run_start(&mut self) {
        self.bar.reset();
    }

    fn rate_reporter(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence::backends::dryrun::DryRunBackend;
    use std::time::Instant;

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
    fn bar_follows_engine_steps() {
        let mut observer = ProgressObserver::new();
        observer.bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        let mut backend = DryRunBackend::new();

        let mut run = context(&mut backend, 30);
        observer.notify(&mut run).unwrap();
        assert_eq!(observer.bar.length(), Some(100));
        assert_eq!(observer.bar.position(), 30);

        let mut run = context(&mut backend, 100);
        observer.notify(&mut run).unwrap();
        assert!(observer.bar.is_finished());
    }

    #[test]
    fn progress_observer_is_a_rate_reporter() {
        let observer = ProgressObserver::new();
        assert!(Observer::<DryRunBackend>::rate_reporter(&observer));
    }
}
