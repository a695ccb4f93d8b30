/// Failure extraction module for test failure summaries
///
/// This module turns raw failure summaries into structured `FailureDetail`s,
/// normalizes file paths against the workspace, renders the textual failure
/// dump and derives file annotations.
use crate::record::{CallStackFrame, FailureSummaryRecord};
use crate::types::{Annotation, CallFrame, FailureDetail};
use std::path::Path;

/// Strips the workspace directory from absolute source paths.
#[derive(Debug, Clone, Default)]
pub struct PathNormalizer {
    prefix: Option<String>,
}

impl PathNormalizer {
    /// `workspace_path` is the workspace *file* (e.g. `/src/App/App.xcworkspace`);
    /// paths are made relative to its parent directory.
    pub fn new(workspace_path: Option<&str>) -> Self {
        let prefix = workspace_path
            .and_then(|p| Path::new(p).parent())
            .map(|dir| dir.to_string_lossy().trim_end_matches('/').to_string())
            .filter(|dir| !dir.is_empty())
            .map(|dir| format!("{}/", dir));
        Self { prefix }
    }

    /// Best effort: a path outside the workspace is returned unchanged.
    pub fn normalize(&self, path: &str) -> String {
        match &self.prefix {
            Some(prefix) => path.strip_prefix(prefix.as_str()).unwrap_or(path).to_string(),
            None => path.to_string(),
        }
    }
}

/// Extract one `FailureDetail` per failure summary, in order.
pub fn collect_failures(summaries: &[FailureSummaryRecord], paths: &PathNormalizer) -> Vec<FailureDetail> {
    summaries.iter().map(|summary| extract_failure(summary, paths)).collect()
}

fn extract_failure(summary: &FailureSummaryRecord, paths: &PathNormalizer) -> FailureDetail {
    let context = summary.source_code_context.as_ref();
    let location = context.and_then(|c| c.location.as_ref());

    // Fall back to the bare file name when no location metadata is attached
    let file_path = location
        .and_then(|l| l.file_path.as_deref())
        .or(summary.file_name.as_deref())
        .map(|p| paths.normalize(p));

    let call_stack = context
        .map(|c| c.call_stack.iter().map(|frame| extract_frame(frame, summary.file_name.as_deref())).collect())
        .unwrap_or_default();

    FailureDetail {
        file_name: summary.file_name.clone(),
        file_path,
        line: location.and_then(|l| l.line_number),
        issue_type: summary.issue_type.clone(),
        message: summary.message.clone(),
        call_stack,
    }
}

fn extract_frame(frame: &CallStackFrame, fallback_file: Option<&str>) -> CallFrame {
    let symbol = frame.symbol_info.as_ref();
    let location = symbol.and_then(|s| s.location.as_ref());
    CallFrame {
        image_name: symbol.and_then(|s| s.image_name.clone()).unwrap_or_default(),
        address: frame.address_string.clone().unwrap_or_default(),
        symbol: symbol.and_then(|s| s.symbol_name.clone()).unwrap_or_default(),
        file: location.and_then(|l| l.file_path.as_deref()).or(fallback_file).unwrap_or_default().to_string(),
        line: location.and_then(|l| l.line_number),
    }
}

/// Annotation for a failure with path, line and message; `None` otherwise.
pub fn annotation_for(failure: &FailureDetail) -> Option<Annotation> {
    let path = failure.file_path.as_deref().filter(|p| !p.is_empty())?;
    let line = failure.line?;
    let message = failure.message.as_deref().filter(|m| !m.is_empty())?;

    Some(Annotation {
        path: path.to_string(),
        start_line: line,
        end_line: line,
        severity: "failure".to_string(),
        message: message.to_string(),
        category: failure.issue_type.clone().unwrap_or_default(),
    })
}

impl FailureDetail {
    /// `file:line`, the bare file name, or empty.
    pub fn file_location(&self) -> String {
        match (&self.file_name, self.line) {
            (Some(name), Some(line)) => format!("{}:{}", name, line),
            (Some(name), None) => name.clone(),
            (None, _) => String::new(),
        }
    }

    /// Textual failure dump: the File / Issue Type / Message table, followed
    /// by the call stack when one was recorded.
    pub fn render(&self) -> String {
        let title_attr = r#"align="right" width="100px""#;
        let detail_width = r#"width="668px""#;

        let mut out = String::new();
        out.push_str(r#"<table id="detail-table">"#);
        out.push_str(&format!("<tr><td {}><b>File</b><td {}>{}", title_attr, detail_width, self.file_location()));
        out.push_str(&format!(
            "<tr><td {}><b>Issue Type</b><td {}>{}",
            title_attr,
            detail_width,
            self.issue_type.as_deref().unwrap_or_default()
        ));
        out.push_str(&format!(
            "<tr><td {}><b>Message</b><td {}>{}",
            title_attr,
            detail_width,
            self.message.as_deref().unwrap_or_default()
        ));
        out.push_str("</table>\n");

        if !self.call_stack.is_empty() {
            out.push_str("<details><summary>Call stack</summary>\n\n```\n");
            out.push_str(&self.stack_trace());
            out.push_str("\n```\n\n</details>\n");
        }
        out
    }

    /// One line per frame: `seq image address symbol file:line`.
    pub fn stack_trace(&self) -> String {
        self.call_stack
            .iter()
            .enumerate()
            .map(|(index, frame)| {
                let line = frame.line.map(|l| l.to_string()).unwrap_or_default();
                format!("{:<2} {} {} {} {}:{}", index, frame.image_name, frame.address, frame.symbol, frame.file, line)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
