use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A synchronization point for cooperating processes.
///
/// The engine waits on the barrier exactly once per run, after pre-run setup
/// and before stepping starts. Single-process runs use [`NoOpBarrier`];
/// multi-process jobs supply an implementation backed by their own
/// communication layer.
pub trait Barrier {
    fn wait(&self);
}

/// The default barrier: returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpBarrier;

impl Barrier for NoOpBarrier {
    fn wait(&self) {}
}

/// A cloneable cancellation flag.
///
/// Cancelling ends the run cleanly at the next loop iteration: no error, no
/// final report. The token is cheap to clone and safe to trip from another
/// thread or a signal handler.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the run.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_trips_once_for_all_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
