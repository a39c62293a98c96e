//! Activation: directory setup and listener registration.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use gantry_build::{Build, BuildProfile, ProfileListener, TaskKind, TaskPath, TaskTimer};
use gantry_reports::checkstyle::CheckstyleReportSupplier;
use gantry_reports::failure::FailuresSupplier;
use gantry_reports::javac::JavacFailuresSupplier;
use gantry_reports::listener::{BuildFailureListener, FailureReportAction};
use gantry_reports::profile::{profile_file_name, render_profile};
use gantry_reports::TaskFinalizer;
use gantry_util::fs;

use crate::env::{parse_node_index, CircleEnv};
use crate::error::CircleError;

/// A test task whose reports were redirected.
#[derive(Debug, Clone)]
pub struct TestRedirect {
    pub task: TaskPath,
    pub html_dir: PathBuf,
    pub junit_xml_dir: PathBuf,
}

/// A task that got a failure-report finalizer.
#[derive(Debug, Clone)]
pub struct FinalizerTarget {
    pub task: TaskPath,
    pub dest_dir: PathBuf,
}

/// What activation wired up, for hosts that want to display it.
#[derive(Debug, Clone)]
pub struct Wiring {
    pub reports_dir: PathBuf,
    pub artifacts_dir: PathBuf,
    /// Probed target of the aggregate failure report.
    pub failure_report: PathBuf,
    pub redirects: Vec<TestRedirect>,
    pub finalizers: Vec<FinalizerTarget>,
    /// Set when profiling is enabled.
    pub profile_dir: Option<PathBuf>,
}

/// Outcome of [`apply`].
#[derive(Debug)]
pub enum Applied {
    /// Not a CircleCI environment; nothing was touched.
    NotCi,
    Wired(Wiring),
}

/// Activate the CircleCI wiring on a build.
///
/// Outside CI (either directory variable absent) this returns
/// [`Applied::NotCi`] without writing to the filesystem or registering
/// anything. Inside CI it creates both output roots, registers the
/// build-failure listener and its end-of-build report action, the
/// shared task timer, a finalizer per checkstyle and javac task, the
/// junit report redirects, and, for profiled builds, the profile report
/// writer.
///
/// # Errors
/// Returns an error only when an output root cannot be created.
pub fn apply(build: &mut Build, env: &CircleEnv) -> Result<Applied, CircleError> {
    let (Some(reports_dir), Some(artifacts_dir)) = (&env.reports_dir, &env.artifacts_dir) else {
        return Ok(Applied::NotCi);
    };
    let reports_dir = reports_dir.clone();
    let artifacts_dir = artifacts_dir.clone();

    fs::ensure_dir_rwx(&reports_dir)?;
    fs::ensure_dir_rwx(&artifacts_dir)?;

    let failure_report = register_failure_report(build, &reports_dir, env);

    // The timer goes on the bus before any finalizer: dispatch runs in
    // registration order, so its reading for a task exists by the time
    // that task's finalizer fires.
    let timer = Rc::new(TaskTimer::new());
    build.events_mut().add_task_listener(timer.clone());

    let mut redirects = Vec::new();
    let mut pending: Vec<(TaskPath, Box<dyn FailuresSupplier>, PathBuf)> = Vec::new();

    for project in build.projects_mut() {
        for task in &mut project.tasks {
            match &mut task.kind {
                TaskKind::Test { reports } => {
                    let html_dir = junit_destination(&artifacts_dir, &task.path);
                    let junit_xml_dir = junit_destination(&reports_dir, &task.path);
                    reports.html.enabled = true;
                    reports.html.destination = Some(html_dir.clone());
                    reports.junit_xml.enabled = true;
                    reports.junit_xml.destination = Some(junit_xml_dir.clone());
                    redirects.push(TestRedirect {
                        task: task.path.clone(),
                        html_dir,
                        junit_xml_dir,
                    });
                }
                TaskKind::Checkstyle { report_xml } => pending.push((
                    task.path.clone(),
                    Box::new(CheckstyleReportSupplier::new(report_xml.clone())),
                    reports_dir.join("checkstyle"),
                )),
                TaskKind::JavaCompile => pending.push((
                    task.path.clone(),
                    Box::new(JavacFailuresSupplier::new()),
                    reports_dir.join("javac"),
                )),
            }
        }
    }

    let mut finalizers = Vec::new();
    for (task, supplier, dest_dir) in pending {
        finalizers.push(FinalizerTarget {
            task: task.clone(),
            dest_dir: dest_dir.clone(),
        });
        TaskFinalizer::register(build, task, timer.clone(), supplier, dest_dir);
    }

    let profile_dir = if build.profile_enabled() {
        let dir = artifacts_dir.join("profile");
        build
            .events_mut()
            .add_profile_listener(Rc::new(ProfileReportWriter {
                dest_dir: dir.clone(),
            }));
        Some(dir)
    } else {
        None
    };

    Ok(Applied::Wired(Wiring {
        reports_dir,
        artifacts_dir,
        failure_report,
        redirects,
        finalizers,
        profile_dir,
    }))
}

/// Probe the aggregate report target and register the failure listener
/// with its end-of-build action.
fn register_failure_report(build: &mut Build, reports_dir: &Path, env: &CircleEnv) -> PathBuf {
    let target = fs::next_numbered(&reports_dir.join("gradle"), "build", "xml");
    let container = parse_node_index(env.node_index.as_deref());

    let listener = Rc::new(BuildFailureListener::new());
    build.events_mut().add_task_listener(listener.clone());
    build
        .events_mut()
        .add_finished_action(Rc::new(FailureReportAction::new(
            container,
            target.clone(),
            listener,
        )));
    target
}

/// Resolve each component of the task path under `<base>/junit/`.
fn junit_destination(base: &Path, task: &TaskPath) -> PathBuf {
    let mut dir = base.join("junit");
    for component in task.components() {
        dir.push(component);
    }
    dir
}

/// Writes `profile-<timestamp>.html` into the artifact profile
/// directory when the profile report becomes available.
struct ProfileReportWriter {
    dest_dir: PathBuf,
}

impl ProfileListener for ProfileReportWriter {
    fn report_ready(&self, profile: &BuildProfile) {
        let dest = self.dest_dir.join(profile_file_name(profile.started_at));
        if let Err(e) = render_profile(profile, &dest) {
            eprintln!("warning: cannot write profile report: {e}");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use gantry_build::{Project, Task, TaskOutcome, TaskState, TestReports};

    use super::*;

    fn test_env(tmp: &Path) -> CircleEnv {
        CircleEnv {
            reports_dir: Some(tmp.join("reports")),
            artifacts_dir: Some(tmp.join("artifacts")),
            node_index: None,
        }
    }

    fn test_build() -> Build {
        let mut build = Build::new(false);
        build.add_project(Project {
            name: "core".to_owned(),
            tasks: vec![
                Task {
                    path: TaskPath::new(":a:b:c"),
                    kind: TaskKind::Test {
                        reports: TestReports::default(),
                    },
                },
                Task {
                    path: TaskPath::new(":core:checkstyleMain"),
                    kind: TaskKind::Checkstyle {
                        report_xml: PathBuf::from("build/reports/checkstyle/main.xml"),
                    },
                },
                Task {
                    path: TaskPath::new(":core:compileJava"),
                    kind: TaskKind::JavaCompile,
                },
            ],
        });
        build
    }

    #[test]
    fn missing_env_is_a_silent_noop() {
        let mut build = test_build();
        let applied = apply(&mut build, &CircleEnv::default()).unwrap();

        assert!(matches!(applied, Applied::NotCi));
        assert!(build.events().is_empty());
    }

    #[test]
    fn one_variable_alone_is_not_ci() {
        let tmp = tempfile::tempdir().unwrap();
        let env = CircleEnv {
            reports_dir: Some(tmp.path().join("reports")),
            artifacts_dir: None,
            node_index: None,
        };

        let mut build = test_build();
        let applied = apply(&mut build, &env).unwrap();

        assert!(matches!(applied, Applied::NotCi));
        assert!(build.events().is_empty());
        assert!(!tmp.path().join("reports").exists());
    }

    #[test]
    fn activation_creates_both_roots() {
        let tmp = tempfile::tempdir().unwrap();
        let env = test_env(tmp.path());

        let mut build = test_build();
        apply(&mut build, &env).unwrap();

        assert!(tmp.path().join("reports").is_dir());
        assert!(tmp.path().join("artifacts").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn created_roots_are_rwxr_xr_x() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let env = test_env(tmp.path());
        apply(&mut test_build(), &env).unwrap();

        let mode = std::fs::metadata(tmp.path().join("reports"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn unwritable_root_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        // A file where the reports directory should go.
        let blocked = tmp.path().join("reports");
        std::fs::write(&blocked, b"not a directory").unwrap();

        let env = test_env(tmp.path());
        let err = apply(&mut test_build(), &env).unwrap_err();
        assert!(matches!(err, CircleError::CreateDirs { .. }));
    }

    #[test]
    fn junit_destinations_follow_task_path_components() {
        let tmp = tempfile::tempdir().unwrap();
        let env = test_env(tmp.path());

        let mut build = test_build();
        let Applied::Wired(wiring) = apply(&mut build, &env).unwrap() else {
            unreachable!("env has both directories");
        };

        let redirect = wiring.redirects.first().unwrap();
        assert_eq!(
            redirect.html_dir,
            tmp.path().join("artifacts/junit/a/b/c")
        );
        assert_eq!(
            redirect.junit_xml_dir,
            tmp.path().join("reports/junit/a/b/c")
        );

        // The task itself now carries the enabled, redirected reports.
        let project = build.projects().first().unwrap();
        let Some(TaskKind::Test { reports }) =
            project.tasks.first().map(|t| t.kind.clone())
        else {
            unreachable!("first task is the test task");
        };
        assert!(reports.html.enabled);
        assert_eq!(reports.html.destination, Some(redirect.html_dir.clone()));
        assert!(reports.junit_xml.enabled);
        assert_eq!(
            reports.junit_xml.destination,
            Some(redirect.junit_xml_dir.clone())
        );
    }

    #[test]
    fn failure_report_probe_skips_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let gradle = tmp.path().join("reports").join("gradle");
        std::fs::create_dir_all(&gradle).unwrap();
        std::fs::write(gradle.join("build.xml"), b"").unwrap();
        std::fs::write(gradle.join("build2.xml"), b"").unwrap();

        let env = test_env(tmp.path());
        let Applied::Wired(wiring) = apply(&mut test_build(), &env).unwrap() else {
            unreachable!("env has both directories");
        };
        assert_eq!(wiring.failure_report, gradle.join("build3.xml"));
    }

    #[test]
    fn finalizers_target_per_tool_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let env = test_env(tmp.path());

        let Applied::Wired(wiring) = apply(&mut test_build(), &env).unwrap() else {
            unreachable!("env has both directories");
        };

        let dirs: Vec<PathBuf> = wiring.finalizers.iter().map(|f| f.dest_dir.clone()).collect();
        assert_eq!(
            dirs,
            vec![
                tmp.path().join("reports/checkstyle"),
                tmp.path().join("reports/javac"),
            ]
        );
    }

    #[test]
    fn profile_listener_only_when_profiling() {
        let tmp = tempfile::tempdir().unwrap();
        let env = test_env(tmp.path());

        let mut plain = test_build();
        apply(&mut plain, &env).unwrap();
        assert_eq!(plain.events().profile_listener_count(), 0);

        let mut profiled = Build::new(true);
        let Applied::Wired(wiring) = apply(&mut profiled, &env).unwrap() else {
            unreachable!("env has both directories");
        };
        assert_eq!(profiled.events().profile_listener_count(), 1);
        assert_eq!(
            wiring.profile_dir,
            Some(tmp.path().join("artifacts/profile"))
        );
    }

    #[test]
    fn profile_report_lands_under_artifacts_with_timestamped_name() {
        use chrono::TimeZone;

        let tmp = tempfile::tempdir().unwrap();
        let env = test_env(tmp.path());

        let started = chrono::Local.with_ymd_and_hms(2023, 4, 5, 6, 7, 8).unwrap();
        let mut build = Build::with_start_time(true, started);
        apply(&mut build, &env).unwrap();

        build.finish_task(
            &TaskPath::new(":core:test"),
            &TaskState {
                outcome: TaskOutcome::Success,
                output: String::new(),
                duration: Duration::from_secs(2),
            },
        );
        build.finish();

        let report = tmp
            .path()
            .join("artifacts/profile/profile-2023-04-05-06-07-08.html");
        assert!(report.is_file());
    }

    #[test]
    fn end_to_end_failed_build_writes_all_reports() {
        let tmp = tempfile::tempdir().unwrap();
        let env = test_env(tmp.path());

        let mut build = test_build();
        apply(&mut build, &env).unwrap();

        build.finish_task(
            &TaskPath::new(":core:compileJava"),
            &TaskState {
                outcome: TaskOutcome::Failed {
                    message: "Compilation failed".to_owned(),
                },
                output: "A.java:1: error: cannot find symbol\n1 error\n".to_owned(),
                duration: Duration::from_secs(3),
            },
        );
        let result = build.finish();
        assert!(!result.success);

        let javac_report = tmp.path().join("reports/javac/compileJava.xml");
        let content = std::fs::read_to_string(&javac_report).unwrap();
        assert!(content.contains("cannot find symbol"));

        let aggregate = tmp.path().join("reports/gradle/build.xml");
        let content = std::fs::read_to_string(&aggregate).unwrap();
        assert!(content.contains(":core:compileJava"));
        assert!(content.contains("Compilation failed"));
    }

    #[test]
    fn node_index_threads_into_aggregate_report() {
        let tmp = tempfile::tempdir().unwrap();
        let mut env = test_env(tmp.path());
        env.node_index = Some("2".to_owned());

        let mut build = test_build();
        apply(&mut build, &env).unwrap();
        build.finish();

        let aggregate = tmp.path().join("reports/gradle/build.xml");
        let content = std::fs::read_to_string(&aggregate).unwrap();
        assert!(content.contains("hostname=\"container-2\""));
    }

    #[test]
    fn malformed_node_index_is_tolerated() {
        let tmp = tempfile::tempdir().unwrap();
        let mut env = test_env(tmp.path());
        env.node_index = Some("abc".to_owned());

        let mut build = test_build();
        apply(&mut build, &env).unwrap();
        build.finish();

        let content =
            std::fs::read_to_string(tmp.path().join("reports/gradle/build.xml")).unwrap();
        assert!(!content.contains("hostname"));
    }
}
