//! Failure gathering from captured javac output.

use gantry_build::TaskState;

use crate::error::ReportError;
use crate::failure::{Failure, FailuresSupplier, Severity};

/// Parses the compiler output captured in a failed compile task's state.
///
/// javac writes diagnostics as `<file>:<line>: error: <message>` with
/// the offending source line and a caret marker on the lines that
/// follow. Errors are kept with their detail lines folded into the
/// message; warnings, notes, and the trailing `N errors` summary are
/// skipped.
#[derive(Debug, Default)]
pub struct JavacFailuresSupplier;

impl JavacFailuresSupplier {
    pub fn new() -> Self {
        Self
    }
}

impl FailuresSupplier for JavacFailuresSupplier {
    fn failures(&self, state: &TaskState) -> Result<Vec<Failure>, ReportError> {
        Ok(parse_javac_output(&state.output))
    }
}

/// Parse javac diagnostic output into failures.
pub fn parse_javac_output(output: &str) -> Vec<Failure> {
    let mut failures: Vec<Failure> = Vec::new();
    // Detail lines attach to the previous error, not to skipped
    // warnings, so track whether the last diagnostic was kept.
    let mut attach_details = false;

    for line in output.lines() {
        if line.trim().is_empty() || is_summary_line(line) {
            attach_details = false;
            continue;
        }

        match parse_diagnostic_line(line) {
            Some((Severity::Error, failure)) => {
                failures.push(failure);
                attach_details = true;
            }
            Some(_) => {
                attach_details = false;
            }
            None => {
                if attach_details {
                    if let Some(last) = failures.last_mut() {
                        last.message.push('\n');
                        last.message.push_str(line);
                    }
                }
            }
        }
    }

    failures
}

/// Try `<file>:<line>: <level>: <message>`.
fn parse_diagnostic_line(line: &str) -> Option<(Severity, Failure)> {
    let (file, rest) = line.split_once(':')?;
    let (line_no, rest) = rest.split_once(':')?;
    let line_no: u32 = line_no.trim().parse().ok()?;

    let rest = rest.trim_start();
    let (severity, message) = if let Some(msg) = rest.strip_prefix("error:") {
        (Severity::Error, msg)
    } else if let Some(msg) = rest.strip_prefix("warning:") {
        (Severity::Warning, msg)
    } else {
        return None;
    };

    let failure = Failure {
        severity,
        file: Some(file.to_owned()),
        line: Some(line_no),
        message: message.trim().to_owned(),
        rule: None,
    };
    Some((severity, failure))
}

/// `1 error`, `3 errors`, `2 warnings` and the like.
fn is_summary_line(line: &str) -> bool {
    let mut words = line.trim().split_whitespace();
    let (Some(count), Some(label), None) = (words.next(), words.next(), words.next()) else {
        return false;
    };
    count.parse::<u64>().is_ok()
        && matches!(label, "error" | "errors" | "warning" | "warnings")
}
