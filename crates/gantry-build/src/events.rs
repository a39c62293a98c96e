//! Lifecycle events and the listener bus.
//!
//! The host owns call order and thread: every dispatch happens on the
//! host's build thread, in registration order. Listeners that need to
//! accumulate state across invocations do so with interior mutability
//! behind a shared `Rc`.

use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::task::TaskPath;

/// How a task finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed { message: String },
}

/// The completed state of a task, handed to task listeners.
#[derive(Debug, Clone)]
pub struct TaskState {
    pub outcome: TaskOutcome,
    /// Raw tool output captured while the task ran (compiler stderr for
    /// javac tasks). Empty when the host captured nothing.
    pub output: String,
    /// Wall-clock time the task took.
    pub duration: Duration,
}

impl TaskState {
    pub fn failed(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Failed { .. })
    }

    /// The failure message, if the task failed.
    pub fn failure_message(&self) -> Option<&str> {
        match &self.outcome {
            TaskOutcome::Failed { message } => Some(message),
            TaskOutcome::Success => None,
        }
    }
}

/// The final state of the whole build, handed to finished-actions.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub success: bool,
    /// Sum of all recorded task durations.
    pub total: Duration,
}

/// Timing data for a profiled build, handed to profile listeners once
/// the build finishes.
#[derive(Debug, Clone)]
pub struct BuildProfile {
    pub started_at: DateTime<Local>,
    /// Per-task durations in completion order.
    pub tasks: Vec<(TaskPath, Duration)>,
}

/// Observes individual task completions.
pub trait TaskListener {
    fn task_finished(&self, path: &TaskPath, state: &TaskState);
}

/// Runs exactly once, after the last task, when the build ends.
pub trait BuildFinishedAction {
    fn build_finished(&self, result: &BuildResult);
}

/// Observes the profile report of a profiled build.
pub trait ProfileListener {
    fn report_ready(&self, profile: &BuildProfile);
}

/// Listener registry for one build.
#[derive(Default)]
pub struct EventBus {
    task_listeners: Vec<Rc<dyn TaskListener>>,
    finished_actions: Vec<Rc<dyn BuildFinishedAction>>,
    profile_listeners: Vec<Rc<dyn ProfileListener>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("task_listeners", &self.task_listeners.len())
            .field("finished_actions", &self.finished_actions.len())
            .field("profile_listeners", &self.profile_listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn add_task_listener(&mut self, listener: Rc<dyn TaskListener>) {
        self.task_listeners.push(listener);
    }

    pub fn add_finished_action(&mut self, action: Rc<dyn BuildFinishedAction>) {
        self.finished_actions.push(action);
    }

    pub fn add_profile_listener(&mut self, listener: Rc<dyn ProfileListener>) {
        self.profile_listeners.push(listener);
    }

    /// True if nothing has been registered on any extension point.
    pub fn is_empty(&self) -> bool {
        self.task_listeners.is_empty()
            && self.finished_actions.is_empty()
            && self.profile_listeners.is_empty()
    }

    pub fn task_listener_count(&self) -> usize {
        self.task_listeners.len()
    }

    pub fn finished_action_count(&self) -> usize {
        self.finished_actions.len()
    }

    pub fn profile_listener_count(&self) -> usize {
        self.profile_listeners.len()
    }

    pub(crate) fn fire_task_finished(&self, path: &TaskPath, state: &TaskState) {
        for listener in &self.task_listeners {
            listener.task_finished(path, state);
        }
    }

    pub(crate) fn fire_build_finished(&self, result: &BuildResult) {
        for action in &self.finished_actions {
            action.build_finished(result);
        }
    }

    pub(crate) fn fire_profile_ready(&self, profile: &BuildProfile) {
        for listener in &self.profile_listeners {
            listener.report_ready(profile);
        }
    }
}
