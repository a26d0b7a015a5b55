//! # Reference Backends
//!
//! Minimal [`Backend`](crate::engine::backend::Backend) implementations used
//! by the workflows layer, the CLI, and the test suite:
//!
//! - **[`dryrun`]** - Advances nothing; useful to exercise scheduling and
//!   observer plumbing without any physical state.
//! - **[`random_walk`]** - Particles take uncorrelated random displacement
//!   steps; carries a real system, rmsd tracking, and checkpoint support.
//!
//! Production integrators are expected to live outside this crate and
//! implement the same contract.

pub mod dryrun;
pub mod random_walk;

pub use dryrun::DryRunBackend;
pub use random_walk::RandomWalkBackend;
