//! The structured failure model shared by all suppliers.

use std::fmt;

use gantry_build::TaskState;

use crate::error::ReportError;

/// Severity of a reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        };
        f.write_str(label)
    }
}

/// One structured failure from a tool run.
#[derive(Debug, Clone)]
pub struct Failure {
    pub severity: Severity,
    /// Source file the failure points at, as written by the tool.
    pub file: Option<String>,
    pub line: Option<u32>,
    pub message: String,
    /// Tool-specific rule identifier (e.g. a checkstyle check name).
    pub rule: Option<String>,
}

impl Failure {
    /// A `file:line` location label, falling back through partial data.
    pub fn location(&self) -> String {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => format!("{file}:{line}"),
            (Some(file), None) => file.clone(),
            _ => "(unknown location)".to_owned(),
        }
    }
}

/// Yields the structured failures of a completed task.
///
/// Implementations are tool-specific: they know where the tool left its
/// findings (a native report file, captured compiler output) and how to
/// decode them. The wiring treats them as opaque.
pub trait FailuresSupplier {
    /// Gather the failures for a finished task.
    ///
    /// # Errors
    /// Returns an error if the tool's output cannot be read or decoded.
    fn failures(&self, state: &TaskState) -> Result<Vec<Failure>, ReportError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn location_prefers_file_and_line() {
        let failure = Failure {
            severity: Severity::Error,
            file: Some("src/Foo.java".to_owned()),
            line: Some(12),
            message: "bad".to_owned(),
            rule: None,
        };
        assert_eq!(failure.location(), "src/Foo.java:12");
    }

    #[test]
    fn location_degrades_gracefully() {
        let failure = Failure {
            severity: Severity::Warning,
            file: None,
            line: None,
            message: "bad".to_owned(),
            rule: None,
        };
        assert_eq!(failure.location(), "(unknown location)");
    }
}
