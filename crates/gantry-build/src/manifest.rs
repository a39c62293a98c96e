//! The `gantry.toml` build manifest.
//!
//! Describes a build tree so a host can construct a [`Build`] from a
//! file instead of a live build system:
//!
//! ```toml
//! [build]
//! profile = false
//!
//! [[project]]
//! name = "core"
//!
//! [[project.task]]
//! name = "test"
//! kind = "test"
//!
//! [[project.task]]
//! name = "checkstyleMain"
//! kind = "checkstyle"
//! report = "build/reports/checkstyle/main.xml"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::build::Build;
use crate::task::{Project, Task, TaskKind, TaskPath, TestReports};

#[derive(Debug, Clone, Deserialize)]
pub struct BuildManifest {
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default, rename = "project")]
    pub projects: Vec<ProjectSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildSettings {
    /// Whether the build runs with profiling enabled.
    #[serde(default)]
    pub profile: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSpec {
    /// Project name; may itself be colon-delimited for nested projects
    /// (`services:api`).
    pub name: String,
    #[serde(default, rename = "task")]
    pub tasks: Vec<TaskSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskSpec {
    pub name: String,
    pub kind: TaskKindSpec,
    /// For checkstyle tasks: where the tool writes its native XML report.
    pub report: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKindSpec {
    Test,
    Checkstyle,
    Javac,
}

impl BuildManifest {
    /// Read and parse a `gantry.toml` from the given path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or contains invalid
    /// TOML.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content, &path.display().to_string())
    }

    /// Parse manifest TOML; `origin` labels errors.
    ///
    /// # Errors
    /// Returns an error on invalid TOML.
    pub fn from_toml(content: &str, origin: &str) -> Result<Self, ManifestError> {
        toml::from_str(content).map_err(|e| ManifestError::Parse {
            path: origin.to_owned(),
            source: e,
        })
    }

    /// Construct the build tree this manifest describes.
    ///
    /// Task paths are derived as `:<project>:<task>`.
    ///
    /// # Errors
    /// Returns an error if a checkstyle task has no `report` path.
    pub fn into_build(self) -> Result<Build, ManifestError> {
        let mut build = Build::new(self.build.profile);
        for project in self.projects {
            let mut tasks = Vec::with_capacity(project.tasks.len());
            for spec in project.tasks {
                let path = TaskPath::new(format!(":{}:{}", project.name, spec.name));
                let kind = match spec.kind {
                    TaskKindSpec::Test => TaskKind::Test {
                        reports: TestReports::default(),
                    },
                    TaskKindSpec::Checkstyle => {
                        let Some(report_xml) = spec.report else {
                            return Err(ManifestError::MissingReport {
                                task: path.to_string(),
                            });
                        };
                        TaskKind::Checkstyle { report_xml }
                    }
                    TaskKindSpec::Javac => TaskKind::JavaCompile,
                };
                tasks.push(Task { path, kind });
            }
            build.add_project(Project {
                name: project.name,
                tasks,
            });
        }
        Ok(build)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid gantry.toml at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("checkstyle task {task} has no `report` path")]
    MissingReport { task: String },
}
