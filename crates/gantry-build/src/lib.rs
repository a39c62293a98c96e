//! Build model and lifecycle event bus for Gantry.
//!
//! Hosts construct a [`Build`] (directly or from a `gantry.toml`
//! manifest), let interested components register listeners on its event
//! bus, then feed task results through it as the build runs. Dispatch is
//! single-threaded and host-ordered; listeners accumulate state through
//! interior mutability only.

pub mod build;
pub mod events;
pub mod manifest;
pub mod task;
pub mod timer;

pub use build::Build;
pub use events::{
    BuildFinishedAction, BuildProfile, BuildResult, EventBus, ProfileListener, TaskListener,
    TaskOutcome, TaskState,
};
pub use manifest::BuildManifest;
pub use task::{Project, ReportConfig, Task, TaskKind, TaskPath, TestReports};
pub use timer::TaskTimer;
