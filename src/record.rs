//! Input boundary: typed test-run records and the source that resolves them.
//!
//! A run is described by an [`InvocationRecord`] whose actions point at
//! sub-records through opaque [`Reference`]s. The records are produced by an
//! external result-bundle parser; this crate consumes them as JSON through
//! [`JsonRecordSource`], or through any other [`RecordSource`].

use crate::error::SourceError;
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Opaque identifier of a sub-record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reference(pub String);

impl Reference {
    pub fn new(id: impl Into<String>) -> Self {
        Reference(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Root of a run: metadata plus one action per executed scheme/destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationRecord {
    #[serde(default)]
    pub metadata: RunMetadata,
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Path of the workspace file that produced the run (e.g. `/src/App/App.xcworkspace`)
    #[serde(default)]
    pub workspace_path: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// One executed action. Actions without `tests_ref` carry no test results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub scheme_command_name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub run_destination: RunDestination,
    #[serde(default)]
    pub started_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub ended_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub tests_ref: Option<Reference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunDestination {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub target_device: DeviceRecord,
    #[serde(default)]
    pub target_sdk: SdkRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub os_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SdkRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub os_version: String,
}

/// What a [`Reference`] dereferences to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedRecord {
    PlanRunSummaries(PlanRunSummaries),
    TestSummary(TestSummaryRecord),
}

impl ResolvedRecord {
    fn kind_name(&self) -> &'static str {
        match self {
            ResolvedRecord::PlanRunSummaries(_) => "plan run summaries",
            ResolvedRecord::TestSummary(_) => "test summary",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanRunSummaries {
    #[serde(default)]
    pub summaries: Vec<PlanRunSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanRunSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub testable_summaries: Vec<TestableSummary>,
}

/// One testable unit (test bundle / target) and its nested test tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestableSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target_name: Option<String>,
    #[serde(default)]
    pub tests: Vec<TestNode>,
}

/// A node of the nested test tree.
///
/// Nodes carrying `subtests` are groups; everything else is a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestNode {
    Group(TestGroupNode),
    Leaf(TestMetadata),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestGroupNode {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    pub subtests: Vec<TestNode>,
}

/// Leaf entry of the test tree: one executed test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestMetadata {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Raw status text; validated when the leaf is built.
    pub test_status: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub summary_ref: Option<Reference>,
}

/// Detailed record of a single test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSummaryRecord {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub test_status: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub configuration: Option<ConfigurationRecord>,
    #[serde(default)]
    pub failure_summaries: Vec<FailureSummaryRecord>,
    #[serde(default)]
    pub activity_summaries: Vec<ActivityRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationRecord {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub values: Vec<KeyValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FailureSummaryRecord {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub source_code_context: Option<SourceCodeContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceCodeContext {
    #[serde(default)]
    pub location: Option<SourceLocation>,
    #[serde(default)]
    pub call_stack: Vec<CallStackFrame>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceLocation {
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub line_number: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallStackFrame {
    #[serde(default)]
    pub address_string: Option<String>,
    #[serde(default)]
    pub symbol_info: Option<SymbolInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    #[serde(default)]
    pub image_name: Option<String>,
    #[serde(default)]
    pub symbol_name: Option<String>,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub title: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentRecord>,
    #[serde(default)]
    pub subactivities: Vec<ActivityRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub uniform_type_identifier: Option<String>,
    #[serde(default)]
    pub payload_ref: Option<Reference>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub user_info: Vec<KeyValue>,
}

/// Pixel dimensions of an image attachment. Orientation follows EXIF (5-8 are rotated).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub orientation: Option<u32>,
}

/// Supplies the root record and resolves references on demand.
///
/// Implementations must be repeatable: resolving the same reference twice
/// within one pass yields the same record.
pub trait RecordSource {
    fn root(&self) -> Result<InvocationRecord, SourceError>;

    fn resolve(&self, reference: &Reference) -> Result<ResolvedRecord, SourceError>;

    /// Resolve a reference that must point at a nested suite tree.
    fn resolve_plan_run(&self, reference: &Reference) -> Result<PlanRunSummaries, SourceError> {
        match self.resolve(reference)? {
            ResolvedRecord::PlanRunSummaries(summaries) => Ok(summaries),
            other => Err(SourceError::WrongKind {
                id: reference.id().to_string(),
                found: other.kind_name(),
                expected: "plan run summaries",
            }),
        }
    }

    /// Resolve a reference that must point at one test's detailed record.
    fn resolve_test_summary(&self, reference: &Reference) -> Result<TestSummaryRecord, SourceError> {
        match self.resolve(reference)? {
            ResolvedRecord::TestSummary(summary) => Ok(summary),
            other => Err(SourceError::WrongKind {
                id: reference.id().to_string(),
                found: other.kind_name(),
                expected: "test summary",
            }),
        }
    }
}

/// On-disk layout read by [`JsonRecordSource`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordBundle {
    pub root: InvocationRecord,
    #[serde(default)]
    pub records: IndexMap<String, ResolvedRecord>,
}

/// Record source backed by a JSON bundle exported from a result archive.
#[derive(Debug, Clone, Default)]
pub struct JsonRecordSource {
    bundle: RecordBundle,
}

impl RecordBundle {
    /// Parse a bundle without serde_json's fixed nesting limit.
    ///
    /// Test trees may nest deeper than 128 levels; the depth bound is enforced
    /// when the tree is flattened. The parser grows its stack on demand.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let mut de = serde_json::Deserializer::from_str(text);
        de.disable_recursion_limit();
        let bundle = RecordBundle::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Ok(bundle)
    }
}

impl JsonRecordSource {
    pub fn new(bundle: RecordBundle) -> Self {
        Self { bundle }
    }

    /// Read and parse a bundle file.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        debug!("Reading record bundle {:?}", path);
        let text = std::fs::read_to_string(path)
            .map_err(|source| SourceError::Io { path: path.to_path_buf(), source })?;
        let bundle = RecordBundle::from_json(&text)
            .map_err(|source| SourceError::Json { path: path.to_path_buf(), source })?;
        debug!("Bundle holds {} actions and {} records", bundle.root.actions.len(), bundle.records.len());
        Ok(Self { bundle })
    }
}

impl RecordSource for JsonRecordSource {
    fn root(&self) -> Result<InvocationRecord, SourceError> {
        Ok(self.bundle.root.clone())
    }

    fn resolve(&self, reference: &Reference) -> Result<ResolvedRecord, SourceError> {
        self.bundle
            .records
            .get(reference.id())
            .cloned()
            .ok_or_else(|| SourceError::Missing(reference.id().to_string()))
    }
}
