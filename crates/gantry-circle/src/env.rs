//! The CircleCI environment snapshot.

use std::path::PathBuf;

/// Environment variable naming the report output root.
pub const REPORTS_VAR: &str = "CIRCLE_TEST_REPORTS";
/// Environment variable naming the artifact output root.
pub const ARTIFACTS_VAR: &str = "CIRCLE_ARTIFACTS";
/// Environment variable carrying the container index, when parallelism
/// is in play.
pub const NODE_INDEX_VAR: &str = "CIRCLE_NODE_INDEX";

/// The ambient CircleCI variables, read once and never refreshed.
///
/// Both directory variables absent (or either of them) means the build
/// is not running under CircleCI; that is an expected state, not an
/// error. Tests construct this directly instead of touching the process
/// environment.
#[derive(Debug, Clone, Default)]
pub struct CircleEnv {
    pub reports_dir: Option<PathBuf>,
    pub artifacts_dir: Option<PathBuf>,
    pub node_index: Option<String>,
}

impl CircleEnv {
    /// Snapshot the ambient environment. Unset and non-unicode values
    /// read as absent.
    pub fn from_env() -> Self {
        Self {
            reports_dir: std::env::var(REPORTS_VAR).ok().map(PathBuf::from),
            artifacts_dir: std::env::var(ARTIFACTS_VAR).ok().map(PathBuf::from),
            node_index: std::env::var(NODE_INDEX_VAR).ok(),
        }
    }

    /// True when both required directories are present.
    pub fn is_ci(&self) -> bool {
        self.reports_dir.is_some() && self.artifacts_dir.is_some()
    }
}

/// Parse the optional container index. Missing, empty, or malformed
/// values are absent, never an error.
pub fn parse_node_index(raw: Option<&str>) -> Option<u32> {
    raw?.trim().parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn node_index_parses_digits() {
        assert_eq!(parse_node_index(Some("3")), Some(3));
        assert_eq!(parse_node_index(Some(" 12 ")), Some(12));
    }

    #[test]
    fn malformed_node_index_is_absent() {
        assert_eq!(parse_node_index(Some("abc")), None);
        assert_eq!(parse_node_index(Some("")), None);
        assert_eq!(parse_node_index(Some("-1")), None);
        assert_eq!(parse_node_index(None), None);
    }

    #[test]
    fn is_ci_needs_both_directories() {
        let mut env = CircleEnv {
            reports_dir: Some(PathBuf::from("/tmp/reports")),
            ..CircleEnv::default()
        };
        assert!(!env.is_ci());

        env.artifacts_dir = Some(PathBuf::from("/tmp/artifacts"));
        assert!(env.is_ci());
    }
}
