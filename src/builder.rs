/// Run record construction
///
/// This module drives a `RecordSource`: it walks every action, resolves the
/// nested suite tree, flattens it, and resolves each leaf's detailed record,
/// always in traversal order. Any resolution failure aborts the whole pass so
/// no partial chapter is ever produced.
use crate::error::{Location, ReportError};
use crate::failure_extract::{PathNormalizer, collect_failures};
use crate::flatten::{DEFAULT_MAX_DEPTH, FlatLeaf, flatten_tests};
use crate::record::{ActionRecord, ActivityRecord, AttachmentRecord, RecordSource, Reference};
use crate::types::*;
use log::{debug, warn};

/// Section name used when a testable unit carries no name.
pub const UNNAMED_SECTION: &str = "(unnamed target)";

/// Knobs for the build pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub max_depth: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

/// Build the complete run record from `source`.
pub fn build_run_record(source: &dyn RecordSource, options: &BuildOptions) -> Result<RunRecord, ReportError> {
    let root = source.root()?;
    let paths = PathNormalizer::new(root.metadata.workspace_path.as_deref());

    let mut record = RunRecord {
        display_name: root.metadata.display_name.clone(),
        workspace_path: root.metadata.workspace_path.clone(),
        chapters: Vec::new(),
    };

    for action in &root.actions {
        let Some(tests_ref) = &action.tests_ref else {
            debug!("Skipping action {:?}: no test results", action.title);
            continue;
        };
        let chapter = build_chapter(source, action, tests_ref, &paths, options)?;
        record.chapters.push(chapter);
    }

    debug!("Built run record with {} chapters", record.chapters.len());
    Ok(record)
}

fn build_chapter(
    source: &dyn RecordSource,
    action: &ActionRecord,
    tests_ref: &Reference,
    paths: &PathNormalizer,
    options: &BuildOptions,
) -> Result<Chapter, ReportError> {
    let destination = &action.run_destination;
    let mut chapter = Chapter {
        scheme_command_name: action.scheme_command_name.clone(),
        title: action.title.clone(),
        destination: Destination {
            display_name: destination.display_name.clone(),
            device_model: destination.target_device.model_name.clone(),
            device_os: destination.target_device.os_version.clone(),
            sdk_name: destination.target_sdk.name.clone(),
            sdk_version: destination.target_sdk.os_version.clone(),
        },
        started: action.started_time,
        ended: action.ended_time,
        sections: Default::default(),
    };
    let location = Location::chapter(chapter.label());

    debug!("Resolving test plan runs {} for {}", tests_ref.id(), location);
    let plan = source.resolve_plan_run(tests_ref).map_err(|source| ReportError::Unresolved {
        id: tests_ref.id().to_string(),
        location: location.clone(),
        source,
    })?;

    for summary in &plan.summaries {
        for testable in &summary.testable_summaries {
            let name = testable.name.as_deref().or(testable.target_name.as_deref()).unwrap_or(UNNAMED_SECTION);
            let section_location = location.with_section(name);

            let flat = flatten_tests(name, &testable.tests, options.max_depth, &section_location)?;
            let mut leaves = Vec::with_capacity(flat.len());
            for entry in &flat {
                leaves.push(build_leaf(source, entry, paths, &section_location)?);
            }

            // The same target shows up once per test-plan configuration; its
            // runs belong to one section.
            let section = chapter
                .sections
                .entry(name.to_string())
                .or_insert_with(|| Section { name: name.to_string(), leaves: Vec::new() });
            if !section.leaves.is_empty() {
                debug!("Merging {} more leaves into section {}", leaves.len(), name);
            }
            section.leaves.extend(leaves);
        }
    }

    debug!("Chapter {}: {} sections", chapter.label(), chapter.sections.len());
    Ok(chapter)
}

fn build_leaf(
    source: &dyn RecordSource,
    entry: &FlatLeaf<'_>,
    paths: &PathNormalizer,
    location: &Location,
) -> Result<LeafResult, ReportError> {
    let meta = entry.leaf;
    let label = meta.identifier.as_deref().or(meta.name.as_deref()).unwrap_or("(unnamed test)");
    let location = location.with_group(entry.group).with_leaf(label);

    let status = TestStatus::parse(&meta.test_status)
        .ok_or_else(|| ReportError::MalformedStatus { value: meta.test_status.clone(), location: location.clone() })?;

    if meta.identifier.is_none() {
        warn!("Test without identifier ({}); it is reported as its own variant", location);
    }

    let mut leaf = LeafResult::new(meta.name.as_deref().unwrap_or(label), entry.group, status);
    leaf.identifier = meta.identifier.clone();
    leaf.duration = meta.duration;

    if let Some(summary_ref) = &meta.summary_ref {
        let summary = source.resolve_test_summary(summary_ref).map_err(|source| ReportError::Unresolved {
            id: summary_ref.id().to_string(),
            location: location.clone(),
            source,
        })?;

        if leaf.duration.is_none() {
            leaf.duration = summary.duration;
        }
        leaf.configuration = summary.configuration.map(|c| Configuration {
            name: c.name,
            values: c.values.into_iter().map(|kv| (kv.key, kv.value)).collect(),
        });
        leaf.failures = collect_failures(&summary.failure_summaries, paths);
        leaf.activities = flatten_activities(&summary.activity_summaries);
    }

    Ok(leaf)
}

/// Pre-order flattening of an activity tree, recording each activity's depth.
pub fn flatten_activities(records: &[ActivityRecord]) -> Vec<Activity> {
    let mut activities = Vec::new();
    let mut stack: Vec<(&ActivityRecord, usize)> = records.iter().rev().map(|r| (r, 0)).collect();

    while let Some((record, indent)) = stack.pop() {
        activities.push(Activity {
            title: record.title.clone(),
            indent,
            attachments: record.attachments.iter().map(convert_attachment).collect(),
        });
        stack.extend(record.subactivities.iter().rev().map(|r| (r, indent + 1)));
    }
    activities
}

fn convert_attachment(record: &AttachmentRecord) -> Attachment {
    let dimensions = record.dimensions.unwrap_or_default();
    let scale = record
        .user_info
        .iter()
        .find(|kv| kv.key == "Scale")
        .and_then(|kv| kv.value.trim().parse::<u32>().ok())
        .filter(|scale| *scale > 0);

    Attachment {
        name: record.name.clone(),
        filename: record.filename.clone(),
        payload_id: record.payload_ref.as_ref().map(|r| r.id().to_string()),
        width: dimensions.width,
        height: dimensions.height,
        orientation: dimensions.orientation,
        scale,
        is_image: record.dimensions.is_some(),
    }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod builder_test;
