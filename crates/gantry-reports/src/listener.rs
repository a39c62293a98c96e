//! Build-wide failure observation and the end-of-build report action.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use gantry_build::{BuildFinishedAction, BuildResult, TaskListener, TaskPath, TaskState};

use crate::report;

/// A failed task observed during the build.
#[derive(Debug, Clone)]
pub struct TaskFailure {
    pub task: TaskPath,
    pub message: String,
}

/// Accumulates every failed task as the build runs.
///
/// Registered once per build; the single build-finished action holds the
/// other reference and drains the state when the build ends. Interior
/// mutability is safe under the bus's single-threaded dispatch contract.
#[derive(Default)]
pub struct BuildFailureListener {
    failures: RefCell<Vec<TaskFailure>>,
}

impl BuildFailureListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the failures observed so far.
    pub fn failures(&self) -> Vec<TaskFailure> {
        self.failures.borrow().clone()
    }
}

impl TaskListener for BuildFailureListener {
    fn task_finished(&self, path: &TaskPath, state: &TaskState) {
        if let Some(message) = state.failure_message() {
            self.failures.borrow_mut().push(TaskFailure {
                task: path.clone(),
                message: message.to_owned(),
            });
        }
    }
}

/// Writes the aggregate failure report when the build finishes.
///
/// Holds the probed target file (chosen at registration so reruns never
/// overwrite earlier reports), the optional CI container index, and the
/// listener whose accumulated failures it renders. A write problem is
/// reported on stderr; it never aborts the finishing build.
pub struct FailureReportAction {
    container: Option<u32>,
    target: PathBuf,
    listener: Rc<BuildFailureListener>,
}

impl FailureReportAction {
    pub fn new(
        container: Option<u32>,
        target: PathBuf,
        listener: Rc<BuildFailureListener>,
    ) -> Self {
        Self {
            container,
            target,
            listener,
        }
    }

    /// The probed destination file this action will write.
    pub fn target(&self) -> &std::path::Path {
        &self.target
    }
}

impl BuildFinishedAction for FailureReportAction {
    fn build_finished(&self, result: &BuildResult) {
        let failures = self.listener.failures();
        if let Err(e) =
            report::write_build_report(&self.target, self.container, result.total, &failures)
        {
            eprintln!("warning: cannot write build failure report: {e}");
        }
    }
}
