//! The build tree and its lifecycle.

use std::time::Duration;

use chrono::{DateTime, Local};

use crate::events::{BuildProfile, BuildResult, EventBus, TaskState};
use crate::task::{Project, TaskPath};

/// One build invocation: the project tree, the profiling flag, and the
/// event bus the host dispatches through.
///
/// The lifecycle is linear: construct, register listeners, feed task
/// completions through [`Build::finish_task`], then consume the build
/// with [`Build::finish`], which fires the finished-actions exactly once
/// and, for profiled builds, the profile listeners.
#[derive(Debug)]
pub struct Build {
    projects: Vec<Project>,
    profile: bool,
    started_at: DateTime<Local>,
    events: EventBus,
    timeline: Vec<(TaskPath, Duration)>,
    failed_tasks: usize,
}

impl Build {
    /// Create an empty build starting now.
    pub fn new(profile: bool) -> Self {
        Self::with_start_time(profile, Local::now())
    }

    /// Create an empty build with an explicit start time. Hosts replaying
    /// a recorded build use this to keep profile timestamps faithful.
    pub fn with_start_time(profile: bool, started_at: DateTime<Local>) -> Self {
        Self {
            projects: Vec::new(),
            profile,
            started_at,
            events: EventBus::default(),
            timeline: Vec::new(),
            failed_tasks: 0,
        }
    }

    pub fn add_project(&mut self, project: Project) {
        self.projects.push(project);
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn projects_mut(&mut self) -> &mut [Project] {
        &mut self.projects
    }

    /// Whether the build was invoked with profiling enabled.
    pub fn profile_enabled(&self) -> bool {
        self.profile
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Record a task completion and dispatch it to task listeners.
    pub fn finish_task(&mut self, path: &TaskPath, state: &TaskState) {
        if state.failed() {
            self.failed_tasks += 1;
        }
        self.timeline.push((path.clone(), state.duration));
        self.events.fire_task_finished(path, state);
    }

    /// End the build: fire the finished-actions once, then the profile
    /// listeners when profiling is enabled. Consuming `self` makes a
    /// second finish unrepresentable.
    pub fn finish(self) -> BuildResult {
        let total: Duration = self.timeline.iter().map(|(_, d)| *d).sum();
        let result = BuildResult {
            success: self.failed_tasks == 0,
            total,
        };
        self.events.fire_build_finished(&result);

        if self.profile {
            let profile = BuildProfile {
                started_at: self.started_at,
                tasks: self.timeline,
            };
            self.events.fire_profile_ready(&profile);
        }

        result
    }
}
