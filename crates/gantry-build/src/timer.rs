//! Build-wide task timing.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use crate::events::{TaskListener, TaskState};
use crate::task::TaskPath;

/// Accumulates per-task wall-clock durations as tasks finish.
///
/// One instance is registered on the bus per build and shared (via `Rc`)
/// with every finalizer that needs timing data.
#[derive(Default)]
pub struct TaskTimer {
    elapsed: RefCell<HashMap<TaskPath, Duration>>,
}

impl TaskTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded duration for a task, if it has finished.
    pub fn elapsed(&self, path: &TaskPath) -> Option<Duration> {
        self.elapsed.borrow().get(path).copied()
    }
}

impl TaskListener for TaskTimer {
    fn task_finished(&self, path: &TaskPath, state: &TaskState) {
        self.elapsed.borrow_mut().insert(path.clone(), state.duration);
    }
}
