#![forbid(unsafe_code)]

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use gantry_build::{BuildManifest, TaskOutcome, TaskPath, TaskState};
use gantry_circle::{Applied, CircleEnv, Wiring};
use serde::Deserialize;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "gantry", about = "CircleCI report wiring for recorded builds")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a recorded build through the CircleCI wiring
    Replay {
        /// Build manifest describing projects and tasks
        #[arg(long, default_value = "gantry.toml")]
        manifest: PathBuf,
        /// Recorded task results (JSON array)
        #[arg(long)]
        results: PathBuf,
    },
    /// Show where the wiring would route reports
    Layout {
        /// Build manifest describing projects and tasks
        #[arg(long, default_value = "gantry.toml")]
        manifest: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Replay { manifest, results } => cmd_replay(&manifest, &results),
        Command::Layout { manifest } => cmd_layout(&manifest),
    };

    if let Err(msg) = result {
        eprintln!("error: {msg}");
        process::exit(1);
    }
}

/// One task result in the recorded build log.
#[derive(Debug, Deserialize)]
struct TaskRecord {
    task: String,
    outcome: RecordedOutcome,
    #[serde(default)]
    message: Option<String>,
    /// Raw tool output captured while the task ran.
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RecordedOutcome {
    Success,
    Failed,
}

impl TaskRecord {
    fn into_state(self) -> (TaskPath, TaskState) {
        let outcome = match self.outcome {
            RecordedOutcome::Success => TaskOutcome::Success,
            RecordedOutcome::Failed => TaskOutcome::Failed {
                message: self.message.unwrap_or_else(|| "task failed".to_owned()),
            },
        };
        let state = TaskState {
            outcome,
            output: self.output.unwrap_or_default(),
            duration: Duration::from_millis(self.duration_ms.unwrap_or(0)),
        };
        (TaskPath::new(self.task), state)
    }
}

fn load_records(path: &Path) -> Result<Vec<TaskRecord>, Box<dyn Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let records: Vec<TaskRecord> = serde_json::from_str(&content)
        .map_err(|e| format!("invalid results log {}: {e}", path.display()))?;
    Ok(records)
}

fn wire(manifest: &Path) -> Result<Option<(gantry_build::Build, Wiring)>, Box<dyn Error>> {
    let mut build = BuildManifest::from_path(manifest)?.into_build()?;
    let env = CircleEnv::from_env();
    match gantry_circle::apply(&mut build, &env)? {
        Applied::NotCi => Ok(None),
        Applied::Wired(wiring) => Ok(Some((build, wiring))),
    }
}

fn cmd_replay(manifest: &Path, results: &Path) -> CliResult {
    let Some((mut build, wiring)) = wire(manifest)? else {
        eprintln!("not a CircleCI environment (CIRCLE_TEST_REPORTS / CIRCLE_ARTIFACTS unset) — nothing to do");
        return Ok(());
    };

    let records = load_records(results)?;
    let count = records.len();
    for record in records {
        let (path, state) = record.into_state();
        build.finish_task(&path, &state);
    }
    let result = build.finish();

    let status = if result.success { "succeeded" } else { "failed" };
    eprintln!("    Replayed {count} task(s); build {status}");
    eprintln!(
        "    Aggregate report: {}",
        wiring.failure_report.display()
    );
    Ok(())
}

fn cmd_layout(manifest: &Path) -> CliResult {
    let Some((_build, wiring)) = wire(manifest)? else {
        return Err(
            "not a CircleCI environment — set CIRCLE_TEST_REPORTS and CIRCLE_ARTIFACTS".into(),
        );
    };

    eprintln!("reports root:    {}", wiring.reports_dir.display());
    eprintln!("artifacts root:  {}", wiring.artifacts_dir.display());
    eprintln!("failure report:  {}", wiring.failure_report.display());

    for redirect in &wiring.redirects {
        eprintln!(
            "test {}: html -> {}, xml -> {}",
            redirect.task,
            redirect.html_dir.display(),
            redirect.junit_xml_dir.display()
        );
    }
    for finalizer in &wiring.finalizers {
        eprintln!(
            "finalizer {}: -> {}",
            finalizer.task,
            finalizer.dest_dir.display()
        );
    }
    if let Some(profile_dir) = &wiring.profile_dir {
        eprintln!("profile reports: -> {}", profile_dir.display());
    }
    Ok(())
}
