/// Core data structures for the report model
///
/// This module defines the normalized run record built from the raw input
/// records: chapters own sections, sections own flattened leaf results.
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Status of one executed test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestStatus {
    Success,
    Failure,
    Skipped,
    ExpectedFailure,
}

impl TestStatus {
    /// Parse the status text used by result bundles. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Success" => Some(TestStatus::Success),
            "Failure" => Some(TestStatus::Failure),
            "Skipped" => Some(TestStatus::Skipped),
            "Expected Failure" | "ExpectedFailure" => Some(TestStatus::ExpectedFailure),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Success => "Success",
            TestStatus::Failure => "Failure",
            TestStatus::Skipped => "Skipped",
            TestStatus::ExpectedFailure => "Expected Failure",
        }
    }
}

/// Status shown for a row or variant; adds the two mixed outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayStatus {
    Success,
    Failure,
    Skipped,
    ExpectedFailure,
    MixedFailure,
    MixedSuccess,
}

impl DisplayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayStatus::Success => "Success",
            DisplayStatus::Failure => "Failure",
            DisplayStatus::Skipped => "Skipped",
            DisplayStatus::ExpectedFailure => "Expected Failure",
            DisplayStatus::MixedFailure => "Mixed Failure",
            DisplayStatus::MixedSuccess => "Mixed Success",
        }
    }

    /// Any failure flavour (plain, expected or mixed).
    pub fn is_failure_like(&self) -> bool {
        matches!(self, DisplayStatus::Failure | DisplayStatus::ExpectedFailure | DisplayStatus::MixedFailure)
    }
}

impl From<TestStatus> for DisplayStatus {
    fn from(status: TestStatus) -> Self {
        match status {
            TestStatus::Success => DisplayStatus::Success,
            TestStatus::Failure => DisplayStatus::Failure,
            TestStatus::Skipped => DisplayStatus::Skipped,
            TestStatus::ExpectedFailure => DisplayStatus::ExpectedFailure,
        }
    }
}

/// Overall outcome of a run or chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Success,
    Failure,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Success => "success",
            OverallStatus::Failure => "failure",
        }
    }

    /// `failure` if anything failed, `success` if anything passed, otherwise unset.
    pub fn from_statuses<'a>(statuses: impl IntoIterator<Item = &'a TestStatus>) -> Option<Self> {
        let mut passed = false;
        for status in statuses {
            match status {
                TestStatus::Failure => return Some(OverallStatus::Failure),
                TestStatus::Success => passed = true,
                _ => {}
            }
        }
        passed.then_some(OverallStatus::Success)
    }
}

/// The whole formatting input after flattening and resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunRecord {
    pub display_name: Option<String>,
    pub workspace_path: Option<String>,
    pub chapters: Vec<Chapter>,
}

impl RunRecord {
    pub fn status(&self) -> Option<OverallStatus> {
        OverallStatus::from_statuses(self.chapters.iter().flat_map(|c| c.leaves()).map(|l| &l.status))
    }
}

/// Device and SDK a chapter ran against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Destination {
    pub display_name: String,
    pub device_model: String,
    pub device_os: String,
    pub sdk_name: String,
    pub sdk_version: String,
}

/// One executed test action (scheme + destination).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chapter {
    pub scheme_command_name: String,
    pub title: Option<String>,
    pub destination: Destination,
    pub started: Option<DateTime<FixedOffset>>,
    pub ended: Option<DateTime<FixedOffset>>,
    pub sections: IndexMap<String, Section>,
}

impl Chapter {
    /// Human-readable chapter name, used in headings and error context.
    pub fn label(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("{} {}", self.scheme_command_name, self.destination.display_name).trim().to_string(),
        }
    }

    pub fn leaves(&self) -> impl Iterator<Item = &LeafResult> {
        self.sections.values().flat_map(|s| s.leaves.iter())
    }

    pub fn status(&self) -> Option<OverallStatus> {
        OverallStatus::from_statuses(self.leaves().map(|l| &l.status))
    }

    /// Wall-clock run time when both timestamps are known.
    pub fn elapsed_seconds(&self) -> Option<f64> {
        match (self.started, self.ended) {
            (Some(start), Some(end)) if end >= start => {
                Some((end - start).num_milliseconds() as f64 / 1000.0)
            }
            _ => None,
        }
    }
}

/// One testable unit (test bundle / target).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub name: String,
    pub leaves: Vec<LeafResult>,
}

/// One concrete executed test, tagged with its owning group.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafResult {
    pub identifier: Option<String>,
    pub name: String,
    pub status: TestStatus,
    pub duration: Option<f64>,
    pub group: String,
    pub configuration: Option<Configuration>,
    pub failures: Vec<FailureDetail>,
    pub activities: Vec<Activity>,
}

impl LeafResult {
    pub fn new(name: impl Into<String>, group: impl Into<String>, status: TestStatus) -> Self {
        Self {
            identifier: None,
            name: name.into(),
            status,
            duration: None,
            group: group.into(),
            configuration: None,
            failures: Vec::new(),
            activities: Vec::new(),
        }
    }
}

/// Execution parameters of one configuration run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    pub name: Option<String>,
    pub values: Vec<(String, String)>,
}

impl Configuration {
    /// `key: value, key: value` listing.
    pub fn describe(&self) -> String {
        self.values.iter().map(|(k, v)| format!("{}: {}", k, v)).collect::<Vec<_>>().join(", ")
    }
}

/// Structured facts about one failure of one test.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailureDetail {
    pub file_name: Option<String>,
    /// Workspace-relative when the workspace prefix matched.
    pub file_path: Option<String>,
    pub line: Option<u32>,
    pub issue_type: Option<String>,
    pub message: Option<String>,
    pub call_stack: Vec<CallFrame>,
}

/// One call-stack entry. Unresolved symbol info leaves fields empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallFrame {
    pub image_name: String,
    pub address: String,
    pub symbol: String,
    pub file: String,
    pub line: Option<u32>,
}

/// A file annotation for the CI check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub severity: String,
    pub message: String,
    pub category: String,
}

impl Annotation {
    /// GitHub Actions workflow command, e.g. `::error file=a.swift,line=3::boom`.
    pub fn workflow_command(&self) -> String {
        let title = if self.category.is_empty() {
            String::new()
        } else {
            format!(",title={}", escape_workflow_property(&self.category))
        };
        format!(
            "::error file={},line={},endLine={}{}::{}",
            escape_workflow_property(&self.path),
            self.start_line,
            self.end_line,
            title,
            escape_workflow_data(&self.message)
        )
    }
}

fn escape_workflow_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

fn escape_workflow_property(s: &str) -> String {
    escape_workflow_data(s).replace(':', "%3A").replace(',', "%2C")
}

/// One step of a test's activity trace, flattened with its nesting depth.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Activity {
    pub title: String,
    pub indent: usize,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attachment {
    pub name: Option<String>,
    pub filename: Option<String>,
    pub payload_id: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub orientation: Option<u32>,
    pub scale: Option<u32>,
    /// Only attachments with pixel dimensions are rendered as images.
    pub is_image: bool,
}
