//! Error types for gantry-circle.

/// Errors produced during activation.
#[derive(Debug, thiserror::Error)]
pub enum CircleError {
    /// The report or artifact root could not be created. Fatal: a CI
    /// build without its output directories is misconfigured.
    #[error("cannot create CircleCI output directories: {source}")]
    CreateDirs {
        #[from]
        source: gantry_util::UtilError,
    },
}
