//! Report export functions for Markdown, JSON and workflow commands.
//!
//! This module handles writing a rendered `TestReport` to files and to the
//! CI log.

use super::types::TestReport;
use log::debug;
use serde_json::json;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write the assembled Markdown document.
///
/// # Arguments
/// * `report` - The rendered report
/// * `output_path` - Path to write the Markdown file
pub fn write_markdown(report: &TestReport, output_path: &Path) -> std::io::Result<()> {
    let mut file = File::create(output_path)?;
    file.write_all(report.to_markdown().as_bytes())?;
    debug!("Wrote Markdown report to {:?}", output_path);
    Ok(())
}

/// Export status and annotations as JSON.
///
/// The file holds `{ "status": ..., "annotations": [...] }`, pretty-printed.
pub fn write_annotations_json(report: &TestReport, output_path: &Path) -> std::io::Result<()> {
    let document = json!({
        "status": report.status,
        "annotations": report.annotations,
    });

    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(file, &document)?;
    debug!("Wrote {} annotations to {:?}", report.annotations.len(), output_path);
    Ok(())
}

/// Emit one `::error` workflow command per annotation on stdout.
pub fn print_workflow_commands(report: &TestReport, out: &mut impl Write) -> std::io::Result<()> {
    for annotation in &report.annotations {
        writeln!(out, "{}", annotation.workflow_command())?;
    }
    Ok(())
}
