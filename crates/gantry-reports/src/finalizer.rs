//! Per-task report finalizers.

use std::path::PathBuf;
use std::rc::Rc;

use gantry_build::{Build, TaskListener, TaskPath, TaskState, TaskTimer};

use crate::failure::FailuresSupplier;
use crate::report;

/// A finalizer scoped to one task: when that task fails, gather its
/// failures through the tool-specific supplier and write a report named
/// after the task's leaf component under the destination directory.
///
/// Successful completions and other tasks are ignored, and a supplier or
/// write problem only warns on stderr: the finalizer routes failure
/// information, it never produces new task failures.
pub struct TaskFinalizer {
    task: TaskPath,
    timer: Rc<TaskTimer>,
    supplier: Box<dyn FailuresSupplier>,
    dest_dir: PathBuf,
}

impl TaskFinalizer {
    pub fn new(
        task: TaskPath,
        timer: Rc<TaskTimer>,
        supplier: Box<dyn FailuresSupplier>,
        dest_dir: PathBuf,
    ) -> Self {
        Self {
            task,
            timer,
            supplier,
            dest_dir,
        }
    }

    /// Register a finalizer on the build's bus.
    ///
    /// The shared timer must already be registered so its reading for
    /// the task is in place by the time the finalizer fires.
    pub fn register(
        build: &mut Build,
        task: TaskPath,
        timer: Rc<TaskTimer>,
        supplier: Box<dyn FailuresSupplier>,
        dest_dir: PathBuf,
    ) {
        let finalizer = Rc::new(Self::new(task, timer, supplier, dest_dir));
        build.events_mut().add_task_listener(finalizer);
    }
}

impl TaskListener for TaskFinalizer {
    fn task_finished(&self, path: &TaskPath, state: &TaskState) {
        if *path != self.task || !state.failed() {
            return;
        }

        let failures = match self.supplier.failures(state) {
            Ok(failures) => failures,
            Err(e) => {
                eprintln!("warning: cannot gather failures for {path}: {e}");
                return;
            }
        };

        let dest = self.dest_dir.join(format!("{}.xml", self.task.leaf()));
        let elapsed = self.timer.elapsed(path);
        if let Err(e) = report::write_failures_report(&dest, self.task.as_str(), elapsed, &failures)
        {
            eprintln!("warning: cannot write failure report for {path}: {e}");
        }
    }
}
