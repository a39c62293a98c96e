//! CircleCI report wiring.
//!
//! When a build runs inside CircleCI, the runner provides a test-report
//! directory and an artifact directory through the environment. This
//! crate detects them once at activation, ensures both exist, and
//! registers the listeners that route test, checkstyle, javac, and
//! profile output into the locations CircleCI ingests. Outside CI the
//! wiring is a silent no-op.

pub mod env;
pub mod error;
pub mod wiring;

pub use env::{parse_node_index, CircleEnv};
pub use error::CircleError;
pub use wiring::{apply, Applied, FinalizerTarget, TestRedirect, Wiring};
