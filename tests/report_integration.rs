/// End-to-end tests for xcreport
///
/// These tests run the full pipeline (bundle -> run record -> rendered
/// report) against the JSON fixtures in tests/fixtures.
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use xcreport::anchor::{AnchorScope, anchor};
use xcreport::builder::{BuildOptions, build_run_record};
use xcreport::error::ReportError;
use xcreport::record::{JsonRecordSource, RecordBundle, ResolvedRecord, TestNode};
use xcreport::report::{self, BaseUrlLinker, EmojiGlyphs, RenderOptions, TestReport};
use xcreport::types::OverallStatus;

// Helper to get the test fixtures directory
fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_bundle(name: &str) -> RecordBundle {
    let text = std::fs::read_to_string(fixtures_dir().join(name)).expect("fixture should exist");
    serde_json::from_str(&text).expect("fixture should parse")
}

fn render(bundle: RecordBundle, failures_only: bool) -> TestReport {
    let source = JsonRecordSource::new(bundle);
    let record = build_run_record(&source, &BuildOptions::default()).expect("build should succeed");
    report::render_report(&record, &RenderOptions { failures_only }, &EmojiGlyphs, &BaseUrlLinker::new("attachments"))
}

// Extract every `<a name="...">` declaration from a block of markup
fn declarations(text: &str) -> Vec<String> {
    text.match_indices(r#"<a name=""#)
        .map(|(start, _)| {
            let rest = &text[start + 9..];
            let end = rest.find('"').unwrap();
            rest[..end].to_string()
        })
        .collect()
}

// A bundle whose only test sits below `levels` nested groups
fn deep_bundle(levels: usize) -> String {
    let leaf = r#"{"identifier": "Deep/testLeaf()", "name": "testLeaf()", "test_status": "Success"}"#;
    let tree = format!("{}{}{}", r#"{"name": "Deep", "subtests": ["#.repeat(levels), leaf, "]}".repeat(levels));
    format!(
        r#"{{"root": {{"actions": [{{"scheme_command_name": "Test", "title": "Deep", "tests_ref": "plan"}}]}},
            "records": {{"plan": {{"kind": "plan_run_summaries",
                "summaries": [{{"testable_summaries": [{{"name": "DeepTests", "tests": [{}]}}]}}]}}}}}}"#,
        tree
    )
}

// Extract every `href="#..."` target from a block of markup
fn link_targets(text: &str) -> Vec<String> {
    text.match_indices(r##"href="#"##)
        .map(|(start, _)| {
            let rest = &text[start + 7..];
            let end = rest.find('"').unwrap();
            rest[..end].to_string()
        })
        .collect()
}

#[test]
fn test_basic_run_totals_and_status() {
    let report = render(load_bundle("basic_run.json"), false);

    assert_eq!(report.status, Some(OverallStatus::Failure));
    assert_eq!(report.chapters.len(), 1, "the build action carries no tests");

    let summary = &report.chapters[0].summary;
    // Total, Passed, Failed (bold), Skipped, Expected Failure
    assert!(summary.contains(concat!(
        r#"<td align="right" width="118px">3"#,
        r#"<td align="right" width="118px">1"#,
        r#"<td align="right" width="118px"><b>1</b>"#,
        r#"<td align="right" width="118px">1"#,
        r#"<td align="right" width="158px">0"#,
    )));
    // Group durations: A keeps its last duration (1.25), B has none
    assert!(summary.contains(r#"<td align="right" width="138px">1.25s"#));
}

#[test]
fn test_basic_run_blocks() {
    let report = render(load_bundle("basic_run.json"), false);
    let chapter = &report.chapters[0];

    assert!(chapter.heading.starts_with("## Test App"));
    assert!(chapter.heading.contains("- **Device:** iPhone 15, 17.2 (21C62)"));
    assert!(chapter.heading.contains("(12.00s)"));

    assert_eq!(chapter.failures.matches("<h4>").count(), 1);
    assert!(chapter.failures.contains("A/testFails()"));
    assert!(chapter.failures.contains("FooTests.swift:42"));
    assert!(!chapter.failures.contains("All tests passed"));

    assert_eq!(chapter.details.matches(r#"<table id="details">"#).count(), 2);
    assert_eq!(chapter.details.matches(r#"width="716px""#).count(), 3);
    assert!(chapter.details.contains(r#"<img width="390px" src="attachments/payload-1">"#));
    assert!(chapter.details.contains("- Take screenshot &#35;1"));
}

#[test]
fn test_annotations_are_workspace_relative() {
    let report = render(load_bundle("basic_run.json"), false);

    assert_eq!(report.annotations.len(), 1);
    let annotation = &report.annotations[0];
    assert_eq!(annotation.path, "Tests/FooTests.swift");
    assert_eq!(annotation.start_line, 42);
    assert_eq!(annotation.end_line, 42);
    assert_eq!(annotation.message, "expected true, got false");
    assert_eq!(annotation.category, "Assertion Failure");
}

#[test]
fn test_every_link_has_a_declaration() {
    let report = render(load_bundle("basic_run.json"), false);
    let markdown = report.to_markdown();

    let targets = link_targets(&markdown);
    assert!(!targets.is_empty());
    for target in targets {
        assert!(
            markdown.contains(&format!(r#"<a name="{}"></a>"#, target)),
            "link #{} has no anchor declaration",
            target
        );
    }

    let summary_row = anchor(AnchorScope::Summary, &["1", "AppTests", "A", "A/testFails()"]);
    let detail_row = anchor(AnchorScope::Detail, &["1", "AppTests", "A", "A/testFails()"]);
    assert!(report.chapters[0].summary.contains(&summary_row.declaration()));
    assert!(report.chapters[0].summary.contains(&format!(r#"href="{}""#, detail_row.link_target())));
    assert!(report.chapters[0].details.contains(&detail_row.declaration()));
}

#[test]
fn test_rendering_is_idempotent() {
    let first = render(load_bundle("basic_run.json"), false).to_markdown();
    let second = render(load_bundle("basic_run.json"), false).to_markdown();
    assert_eq!(first, second);
}

#[test]
fn test_failures_only_keeps_totals() {
    let full = render(load_bundle("basic_run.json"), false);
    let filtered = render(load_bundle("basic_run.json"), true);

    let totals = |report: &TestReport| report.chapters[0].summary.split("---").next().unwrap().to_string();
    assert_eq!(totals(&full), totals(&filtered));

    let chapter = &filtered.chapters[0];
    assert!(!chapter.summary.contains("### Test Summary"));
    assert_eq!(chapter.details.matches(r#"<table id="details">"#).count(), 1);
    assert_eq!(chapter.details.matches(r#"width="716px""#).count(), 1);
    assert!(!chapter.details.contains("testSkipped()"));
    assert_eq!(filtered.annotations, full.annotations);
}

#[test]
fn test_all_passing_run() {
    let mut bundle = load_bundle("basic_run.json");
    if let Some(ResolvedRecord::PlanRunSummaries(plan)) = bundle.records.get_mut("plan-1") {
        let testable = &mut plan.summaries[0].testable_summaries[0];
        testable.tests = vec![serde_json::from_str::<TestNode>(
            r#"{"identifier": "A/testPasses()", "name": "testPasses()", "test_status": "Success"}"#,
        )
        .unwrap()];
    }

    let report = render(bundle, false);
    assert_eq!(report.status, Some(OverallStatus::Success));
    assert!(report.chapters[0].failures.contains("All tests passed :tada:"));
    assert!(report.annotations.is_empty());
}

#[test]
fn test_unresolved_summary_reference_fails_the_pass() {
    let mut bundle = load_bundle("basic_run.json");
    bundle.records.shift_remove("summary-fail");

    let source = JsonRecordSource::new(bundle);
    let err = build_run_record(&source, &BuildOptions::default()).unwrap_err();
    match err {
        ReportError::Unresolved { ref id, ref location, .. } => {
            assert_eq!(id, "summary-fail");
            assert_eq!(location.leaf.as_deref(), Some("A/testFails()"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_malformed_status_fails_the_pass() {
    let text = std::fs::read_to_string(fixtures_dir().join("basic_run.json"))
        .unwrap()
        .replace(r#""test_status": "Skipped""#, r#""test_status": "Flaky""#);
    let bundle: RecordBundle = serde_json::from_str(&text).unwrap();

    let err = build_run_record(&JsonRecordSource::new(bundle), &BuildOptions::default()).unwrap_err();
    assert!(matches!(err, ReportError::MalformedStatus { ref value, .. } if value == "Flaky"));
}

#[test]
fn test_open_reads_bundle_and_writes_outputs() {
    let source = JsonRecordSource::open(&fixtures_dir().join("basic_run.json")).unwrap();
    let record = build_run_record(&source, &BuildOptions::default()).unwrap();
    let report = report::render_report(&record, &RenderOptions::default(), &EmojiGlyphs, &BaseUrlLinker::default());

    let dir = TempDir::new().unwrap();
    let markdown = dir.path().join("report.md");
    let annotations = dir.path().join("annotations.json");
    report::write_markdown(&report, &markdown).unwrap();
    report::write_annotations_json(&report, &annotations).unwrap();

    assert_eq!(std::fs::read_to_string(&markdown).unwrap(), report.to_markdown());
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&annotations).unwrap()).unwrap();
    assert_eq!(json["status"], "failure");
    assert_eq!(json["annotations"].as_array().unwrap().len(), 1);
}

#[test]
fn test_missing_bundle_file() {
    assert!(JsonRecordSource::open(&fixtures_dir().join("does-not-exist.json")).is_err());
}

#[test]
fn test_unresolved_plan_reference_names_the_chapter() {
    let mut bundle = load_bundle("basic_run.json");
    bundle.records.shift_remove("plan-1");

    let err = build_run_record(&JsonRecordSource::new(bundle), &BuildOptions::default()).unwrap_err();
    match err {
        ReportError::Unresolved { ref id, ref location, .. } => {
            assert_eq!(id, "plan-1");
            assert_eq!(location.chapter.as_deref(), Some("Test App"));
            assert_eq!(location.section, None);
            assert_eq!(location.leaf, None);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_anchors_are_unique_across_chapters() {
    let mut bundle = load_bundle("basic_run.json");
    let mut ipad = bundle.root.actions[1].clone();
    ipad.title = Some("Test App on iPad".to_string());
    bundle.root.actions.push(ipad);

    let report = render(bundle, false);
    assert_eq!(report.chapters.len(), 2);

    let all = declarations(&report.to_markdown());
    let unique: HashSet<&String> = all.iter().collect();
    assert_eq!(unique.len(), all.len(), "an anchor is declared twice");

    // Each chapter's links stay within that chapter
    for chapter in &report.chapters {
        let text = [&chapter.heading, &chapter.summary, &chapter.failures, &chapter.details]
            .iter()
            .map(|block| block.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let own: HashSet<String> = declarations(&text).into_iter().collect();
        for target in link_targets(&text) {
            assert!(own.contains(&target), "link #{} leaves its chapter", target);
        }
    }
}

#[test]
fn test_deep_tree_parses_and_depth_bound_applies() {
    let bundle = RecordBundle::from_json(&deep_bundle(80)).expect("80 levels should parse");

    let record = build_run_record(&JsonRecordSource::new(bundle.clone()), &BuildOptions::default()).unwrap();
    assert_eq!(record.chapters[0].leaves().count(), 1);

    let err = build_run_record(&JsonRecordSource::new(bundle), &BuildOptions { max_depth: 50 }).unwrap_err();
    assert!(matches!(err, ReportError::NestingTooDeep { limit: 50, .. }));
}
