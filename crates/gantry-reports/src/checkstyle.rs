//! Failure gathering from checkstyle's native XML report.

use std::path::PathBuf;

use gantry_build::TaskState;

use crate::error::ReportError;
use crate::failure::{Failure, FailuresSupplier, Severity};

/// Reads the XML report a checkstyle task wrote and turns its `<error>`
/// entries into structured failures.
///
/// The report path is captured when the finalizer is registered; a
/// report that was never written (the tool can fail before producing
/// one) yields an empty failure set rather than an error.
pub struct CheckstyleReportSupplier {
    report_xml: PathBuf,
}

impl CheckstyleReportSupplier {
    pub fn new(report_xml: PathBuf) -> Self {
        Self { report_xml }
    }
}

impl FailuresSupplier for CheckstyleReportSupplier {
    fn failures(&self, _state: &TaskState) -> Result<Vec<Failure>, ReportError> {
        if !self.report_xml.exists() {
            return Ok(Vec::new());
        }
        let path = self.report_xml.display().to_string();
        let content =
            std::fs::read_to_string(&self.report_xml).map_err(|source| ReportError::Io {
                path: path.clone(),
                source,
            })?;
        parse_checkstyle_xml(&content).map_err(|message| ReportError::Xml { path, message })
    }
}

/// Parse checkstyle report XML into failures.
///
/// Expected shape:
/// `<checkstyle><file name="..."><error line=".." severity=".."
/// message=".." source=".."/></file></checkstyle>`
///
/// # Errors
/// Returns the parser's message if the document is not well-formed.
pub fn parse_checkstyle_xml(xml: &str) -> Result<Vec<Failure>, String> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| e.to_string())?;

    let mut failures = Vec::new();
    for file in doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name("file"))
    {
        let file_name = file.attribute("name").map(str::to_owned);
        for error in file.children().filter(|n| n.has_tag_name("error")) {
            failures.push(Failure {
                severity: parse_severity(error.attribute("severity")),
                file: file_name.clone(),
                line: error.attribute("line").and_then(|l| l.parse().ok()),
                message: error.attribute("message").unwrap_or_default().to_owned(),
                rule: error.attribute("source").map(str::to_owned),
            });
        }
    }
    Ok(failures)
}

fn parse_severity(attr: Option<&str>) -> Severity {
    match attr {
        Some("warning") => Severity::Warning,
        Some("info") => Severity::Info,
        // Checkstyle defaults unlisted severities to error.
        _ => Severity::Error,
    }
}
