//! Build profile rendering.

use std::path::Path;

use chrono::{DateTime, Local};
use gantry_build::BuildProfile;

use crate::error::ReportError;
use crate::report::escape_xml;

/// The profile report file name for a build started at `started_at`.
///
/// Pure function of the timestamp; the format is fixed at
/// `profile-<yyyy-MM-dd-HH-mm-ss>.html`.
pub fn profile_file_name(started_at: DateTime<Local>) -> String {
    format!("profile-{}.html", started_at.format("%Y-%m-%d-%H-%M-%S"))
}

/// Render a profiled build as a minimal HTML table of task durations,
/// slowest first.
///
/// # Errors
/// Returns an error if the destination cannot be created or written.
pub fn render_profile(profile: &BuildProfile, dest: &Path) -> Result<(), ReportError> {
    if let Some(parent) = dest.parent() {
        gantry_util::fs::ensure_dir_rwx(parent)?;
    }

    let mut tasks = profile.tasks.clone();
    tasks.sort_by(|a, b| b.1.cmp(&a.1));

    let mut rows = String::new();
    for (path, duration) in &tasks {
        rows.push_str(&format!(
            "      <tr><td>{}</td><td>{:.3}s</td></tr>\n",
            escape_xml(path.as_str()),
            duration.as_secs_f64()
        ));
    }

    let content = format!(
        "<!DOCTYPE html>\n<html>\n  <head><title>Build profile</title></head>\n  <body>\n    <h1>Build profile</h1>\n    <p>Started {}</p>\n    <table>\n      <tr><th>Task</th><th>Duration</th></tr>\n{rows}    </table>\n  </body>\n</html>\n",
        profile.started_at.format("%Y-%m-%d %H:%M:%S"),
    );

    std::fs::write(dest, content).map_err(|source| ReportError::Io {
        path: dest.display().to_string(),
        source,
    })
}
