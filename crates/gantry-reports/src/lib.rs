//! Report collaborators: failure gathering and report writing.
//!
//! Everything here observes an already-finished build or task and turns
//! it into files a CI runner can ingest. Nothing in this crate ever
//! fails a task or a build; write and parse problems surface as stderr
//! warnings from the listeners that hit them.

pub mod checkstyle;
pub mod error;
pub mod failure;
pub mod finalizer;
pub mod javac;
pub mod listener;
pub mod profile;
pub mod report;

pub use checkstyle::CheckstyleReportSupplier;
pub use error::ReportError;
pub use failure::{Failure, FailuresSupplier, Severity};
pub use finalizer::TaskFinalizer;
pub use javac::JavacFailuresSupplier;
pub use listener::{BuildFailureListener, FailureReportAction, TaskFailure};
