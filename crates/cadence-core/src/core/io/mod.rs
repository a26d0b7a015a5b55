//! # File I/O Module
//!
//! Trajectory file formats. Only the XYZ format is built in; it is the
//! format used by the bundled trajectory writer, the reference backends'
//! checkpoints, and the test suite.

pub mod xyz;
