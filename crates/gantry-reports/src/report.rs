//! JUnit-style XML report writing.
//!
//! CI runners ingest JUnit XML from the reports directory, so both the
//! per-task failure reports and the aggregate build report are rendered
//! as a `<testsuite>` with one `<testcase>` per failure.

use std::path::Path;
use std::time::Duration;

use crate::error::ReportError;
use crate::failure::Failure;
use crate::listener::TaskFailure;

/// Write a per-task failure report for `suite` (the task path).
///
/// The parent directory is created on demand. An empty failure set still
/// produces a report file recording a clean (but failed) run.
///
/// # Errors
/// Returns an error if the destination cannot be created or written.
pub fn write_failures_report(
    dest: &Path,
    suite: &str,
    elapsed: Option<Duration>,
    failures: &[Failure],
) -> Result<(), ReportError> {
    let mut cases = String::new();
    for failure in failures {
        let name = failure
            .rule
            .clone()
            .unwrap_or_else(|| failure.severity.to_string());
        push_case(
            &mut cases,
            &name,
            suite,
            &failure.message,
            &format!("{}: {}", failure.location(), failure.message),
        );
    }
    write_suite(dest, suite, failures.len(), elapsed, &cases)
}

/// Write the aggregate build report: one case per failed task.
///
/// `container` is the CI container index, recorded as the suite
/// hostname when present.
///
/// # Errors
/// Returns an error if the destination cannot be created or written.
pub fn write_build_report(
    dest: &Path,
    container: Option<u32>,
    total: Duration,
    failures: &[TaskFailure],
) -> Result<(), ReportError> {
    let mut cases = String::new();
    for failure in failures {
        push_case(
            &mut cases,
            failure.task.as_str(),
            "gradle",
            &failure.message,
            &failure.message,
        );
    }
    write_suite_with_host(dest, "gradle", container, failures.len(), Some(total), &cases)
}

fn push_case(out: &mut String, name: &str, classname: &str, message: &str, body: &str) {
    out.push_str(&format!(
        "  <testcase name=\"{}\" classname=\"{}\">\n    <failure message=\"{}\">{}</failure>\n  </testcase>\n",
        escape_xml(name),
        escape_xml(classname),
        escape_xml(message),
        escape_xml(body),
    ));
}

fn write_suite(
    dest: &Path,
    name: &str,
    failures: usize,
    elapsed: Option<Duration>,
    cases: &str,
) -> Result<(), ReportError> {
    write_suite_with_host(dest, name, None, failures, elapsed, cases)
}

fn write_suite_with_host(
    dest: &Path,
    name: &str,
    container: Option<u32>,
    failures: usize,
    elapsed: Option<Duration>,
    cases: &str,
) -> Result<(), ReportError> {
    if let Some(parent) = dest.parent() {
        gantry_util::fs::ensure_dir_rwx(parent)?;
    }

    let hostname = container
        .map(|c| format!(" hostname=\"container-{c}\""))
        .unwrap_or_default();
    let time = elapsed
        .map(|d| format!(" time=\"{:.3}\"", d.as_secs_f64()))
        .unwrap_or_default();

    let content = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{}\" tests=\"{failures}\" failures=\"{failures}\"{hostname}{time}>\n{cases}</testsuite>\n",
        escape_xml(name),
    );

    std::fs::write(dest, content).map_err(|source| ReportError::Io {
        path: dest.display().to_string(),
        source,
    })
}

/// Escape text for use in XML attribute values and element content.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
