//! Tasks, task paths, and per-task report configuration.

use std::fmt;
use std::path::PathBuf;

/// The colon-delimited hierarchical identifier of a task within a
/// multi-project build, e.g. `:services:api:test`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskPath(String);

impl TaskPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The path components with the leading delimiter stripped.
    ///
    /// `:a:b:c` yields `a`, `b`, `c`. Empty components (from doubled or
    /// trailing delimiters) are skipped.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0
            .strip_prefix(':')
            .unwrap_or(&self.0)
            .split(':')
            .filter(|c| !c.is_empty())
    }

    /// The final path component, or the empty string for a bare path.
    pub fn leaf(&self) -> &str {
        self.components().last().unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration for one output report of a test task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportConfig {
    pub enabled: bool,
    pub destination: Option<PathBuf>,
}

/// The two reports a test task can produce. Both start disabled with no
/// destination; wiring enables and redirects them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestReports {
    /// Human-readable HTML report.
    pub html: ReportConfig,
    /// Machine-readable JUnit XML report.
    pub junit_xml: ReportConfig,
}

/// What kind of work a task performs. Kinds not listed here do not
/// participate in report wiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// A test-execution task with redirectable reports.
    Test { reports: TestReports },
    /// A checkstyle run; `report_xml` is where the tool writes its own
    /// native XML report.
    Checkstyle { report_xml: PathBuf },
    /// A javac compilation; diagnostics are captured in the task's
    /// output at completion time.
    JavaCompile,
}

/// A single task in the build tree.
#[derive(Debug, Clone)]
pub struct Task {
    pub path: TaskPath,
    pub kind: TaskKind,
}

/// A project grouping tasks within the build tree.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub tasks: Vec<Task>,
}
