use super::backend::Backend;
use super::context::RunContext;
use super::error::EngineError;

/// The role of a registered callback.
///
/// Targeters are always notified after every ordinary observer at a given
/// step, so output written for a step is complete before a targeter can end
/// the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Periodic work: writers, reporters, probes.
    Ordinary,
    /// Ends the run once its condition holds.
    Targeter,
}

/// The outcome of a notification, threaded back into the run loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Keep stepping.
    Continue,
    /// End the run normally, with a human-readable reason.
    Terminate(String),
}

/// A unit of periodic work registered with the engine.
///
/// Observers are invoked with a [`RunContext`] view of the engine state at
/// the step their scheduler selected. All hooks other than
/// [`notify`](Observer::notify) have tolerant defaults; implementing them is
/// a capability, not an obligation.
pub trait Observer<B: Backend> {
    /// Performs the observer's work at the current step.
    fn notify(&mut self, run: &mut RunContext<'_, B>) -> Result<Control, EngineError>;

    /// Discards output left over from a previous run.
    ///
    /// Invoked only on fresh (non-restart) runs, before stepping starts.
    fn clear(&mut self, run: &mut RunContext<'_, B>) -> Result<(), EngineError> {
        let _ = run;
        Ok(())
    }

    /// Resets per-run state. Invoked at the start of every run.
    fn on_run_start(&mut self) {}

    /// Whether this observer only reports rates and may safely be
    /// re-notified when resuming a run.
    fn rate_reporter(&self) -> bool {
        false
    }
}

/// Adapts a closure or function into an [`Observer`].
pub struct FnObserver<F>(F);

impl<F> FnObserver<F> {
    pub fn new(func: F) -> Self {
        Self(func)
    }
}

impl<B, F> Observer<B> for FnObserver<F>
where
    B: Backend,
    F: FnMut(&mut RunContext<'_, B>) -> Result<Control, EngineError>,
{
    fn notify(&mut self, run: &mut RunContext<'_, B>) -> Result<Control, EngineError> {
        (self.0)(run)
    }
}

/// Wraps a function-style callback as a boxed observer.
pub fn from_fn<B, F>(func: F) -> Box<dyn Observer<B>>
where
    B: Backend + 'static,
    F: FnMut(&mut RunContext<'_, B>) -> Result<Control, EngineError> + 'static,
{
    Box::new(FnObserver::new(func))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::dryrun::DryRunBackend;
    use std::time::Instant;

    fn count_up(run: &mut RunContext<'_, DryRunBackend>) -> Result<Control, EngineError> {
        if run.steps >= run.max_steps {
            Ok(Control::Terminate("done".to_string()))
        } else {
            Ok(Control::Continue)
        }
    }

    #[test]
    fn function_callbacks_adapt_into_observers() {
        let mut observer = FnObserver::new(count_up);
        let mut backend = DryRunBackend::new();

        let mut run = RunContext {
            backend: &mut backend,
            steps: 5,
            initial_steps: 0,
            max_steps: 10,
            start_time: Instant::now(),
            output_path: None,
        };
        assert_eq!(observer.notify(&mut run).unwrap(), Control::Continue);

        let mut run = RunContext {
            backend: &mut backend,
            steps: 10,
            initial_steps: 0,
            max_steps: 10,
            start_time: Instant::now(),
            output_path: None,
        };
        assert!(matches!(
            observer.notify(&mut run).unwrap(),
            Control::Terminate(_)
        ));
    }

    #[test]
    fn default_hooks_are_tolerant() {
        let mut observer = FnObserver::new(count_up);
        let mut backend = DryRunBackend::new();
        let mut run = RunContext {
            backend: &mut backend,
            steps: 0,
            initial_steps: 0,
            max_steps: 10,
            start_time: Instant::now(),
            output_path: None,
        };
        // clear and on_run_start default to no-ops; rate_reporter to false.
        observer.clear(&mut run).unwrap();
        observer.on_run_start();
        assert!(!Observer::<DryRunBackend>::rate_reporter(&observer));
    }
}
