use crate::engine::backend::Backend;
use crate::engine::error::EngineError;

/// A backend that advances nothing.
///
/// Used as the default stand-in when no real backend is supplied: the engine
/// still schedules, notifies, and checkpoints, but no physical state exists
/// and step advancement is instantaneous.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunBackend {
    steps: u64,
}

impl DryRunBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for DryRunBackend {
    fn run_until(&mut self, _step: u64) -> Result<(), EngineError> {
        Ok(())
    }

    fn steps(&self) -> u64 {
        self.steps
    }

    fn set_steps(&mut self, steps: u64) {
        self.steps = steps;
    }

    fn version(&self) -> Option<&str> {
        Some("dryrun")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advancing_is_instantaneous_and_capability_free() {
        let mut backend = DryRunBackend::new();
        backend.run_until(1_000_000).unwrap();
        backend.set_steps(1_000_000);
        assert_eq!(backend.steps(), 1_000_000);
        assert!(backend.system().is_none());
        assert!(backend.rmsd().is_none());
        assert!(backend.trajectory().is_none());
        backend.write_checkpoint().unwrap();
    }
}
