//! Filesystem utilities for Gantry.

use std::path::{Path, PathBuf};

use crate::error::UtilError;

fn io_err(path: &Path, source: std::io::Error) -> UtilError {
    UtilError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Create a directory and all parent directories if they do not exist.
///
/// On Unix the created directories carry mode `rwxr-xr-x` (0o755), the
/// layout CI runners expect for report and artifact roots. Directories
/// that already exist keep their permissions.
///
/// # Errors
/// Returns an error if the directory cannot be created or its mode
/// cannot be set.
pub fn ensure_dir_rwx(path: &Path) -> Result<(), UtilError> {
    let existed = path.is_dir();
    std::fs::create_dir_all(path).map_err(|source| io_err(path, source))?;

    #[cfg(unix)]
    if !existed {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o755);
        std::fs::set_permissions(path, perms).map_err(|source| io_err(path, source))?;
    }
    #[cfg(not(unix))]
    let _ = existed;

    Ok(())
}

/// Find the first unused numbered file name under `dir`.
///
/// Candidate 1 is `<stem>.<ext>`; candidate N for N > 1 is `<stem><N>.<ext>`.
/// Probing stops at the first candidate with no file present and returns
/// its full path. The file is not created.
///
/// The probe is synchronous against the live filesystem, so two processes
/// probing the same directory concurrently can pick the same name. That
/// race is inherited from the original wiring and is not resolved here.
pub fn next_numbered(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let mut attempt: u64 = 1;
    let mut candidate = dir.join(format!("{stem}.{ext}"));
    while candidate.exists() {
        attempt += 1;
        candidate = dir.join(format!("{stem}{attempt}.{ext}"));
    }
    candidate
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn ensure_dir_rwx_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b").join("c");
        ensure_dir_rwx(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn ensure_dir_rwx_existing_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        ensure_dir_rwx(tmp.path()).unwrap(); // already exists
    }

    #[cfg(unix)]
    #[test]
    fn ensure_dir_rwx_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("reports");
        ensure_dir_rwx(&dir).unwrap();

        let mode = fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn next_numbered_empty_dir_picks_first() {
        let tmp = tempfile::tempdir().unwrap();
        let picked = next_numbered(tmp.path(), "build", "xml");
        assert_eq!(picked, tmp.path().join("build.xml"));
    }

    #[test]
    fn next_numbered_skips_existing() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("build.xml"), b"").unwrap();
        fs::write(tmp.path().join("build2.xml"), b"").unwrap();

        let picked = next_numbered(tmp.path(), "build", "xml");
        assert_eq!(picked, tmp.path().join("build3.xml"));
    }

    #[test]
    fn next_numbered_fills_gap() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("build.xml"), b"").unwrap();
        fs::write(tmp.path().join("build3.xml"), b"").unwrap();

        // Probing is linear, so the gap at 2 is taken before 3 matters.
        let picked = next_numbered(tmp.path(), "build", "xml");
        assert_eq!(picked, tmp.path().join("build2.xml"));
    }

    #[test]
    fn next_numbered_missing_dir_picks_first() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("gradle");
        let picked = next_numbered(&dir, "build", "xml");
        assert_eq!(picked, dir.join("build.xml"));
    }
}
