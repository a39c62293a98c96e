//! Error types for gantry-reports.

/// Errors produced while gathering failures or writing reports.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// A report file could not be read or written.
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A tool's native XML report was malformed.
    #[error("invalid XML report at {path}: {message}")]
    Xml { path: String, message: String },

    /// A utility operation failed.
    #[error("{0}")]
    Util(#[from] gantry_util::UtilError),
}
