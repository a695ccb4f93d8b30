/// Tests for run record construction
#[cfg(test)]
mod tests {
    use crate::builder::*;
    use crate::error::{ReportError, SourceError};
    use crate::record::*;
    use crate::types::TestStatus;
    use std::cell::RefCell;

    fn test_leaf(id: &str, status: &str, summary_ref: Option<&str>) -> TestNode {
        TestNode::Leaf(TestMetadata {
            identifier: Some(id.to_string()),
            name: Some(id.rsplit('/').next().unwrap_or(id).to_string()),
            test_status: status.to_string(),
            duration: Some(0.25),
            summary_ref: summary_ref.map(Reference::new),
        })
    }

    fn test_group(name: &str, subtests: Vec<TestNode>) -> TestNode {
        TestNode::Group(TestGroupNode { name: Some(name.to_string()), subtests, ..TestGroupNode::default() })
    }

    fn action(title: &str, tests_ref: Option<&str>) -> ActionRecord {
        ActionRecord {
            scheme_command_name: "Test".to_string(),
            title: Some(title.to_string()),
            run_destination: RunDestination::default(),
            started_time: None,
            ended_time: None,
            tests_ref: tests_ref.map(Reference::new),
        }
    }

    fn plan(section: &str, tests: Vec<TestNode>) -> ResolvedRecord {
        ResolvedRecord::PlanRunSummaries(PlanRunSummaries {
            summaries: vec![PlanRunSummary {
                name: None,
                testable_summaries: vec![TestableSummary { name: Some(section.to_string()), target_name: None, tests }],
            }],
        })
    }

    /// Wraps a bundle and records the order in which references are resolved.
    struct TracingSource {
        inner: JsonRecordSource,
        resolved: RefCell<Vec<String>>,
    }

    impl RecordSource for TracingSource {
        fn root(&self) -> Result<InvocationRecord, SourceError> {
            self.inner.root()
        }

        fn resolve(&self, reference: &Reference) -> Result<ResolvedRecord, SourceError> {
            self.resolved.borrow_mut().push(reference.id().to_string());
            self.inner.resolve(reference)
        }
    }

    fn bundle(actions: Vec<ActionRecord>, records: Vec<(&str, ResolvedRecord)>) -> RecordBundle {
        RecordBundle {
            root: InvocationRecord {
                metadata: RunMetadata { workspace_path: Some("/w/App.xcworkspace".to_string()), display_name: None },
                actions,
            },
            records: records.into_iter().map(|(id, r)| (id.to_string(), r)).collect(),
        }
    }

    #[test]
    fn test_builds_sections_and_resolves_in_order() {
        let failing = TestSummaryRecord {
            failure_summaries: vec![FailureSummaryRecord {
                file_name: Some("FooTests.swift".to_string()),
                message: Some("boom".to_string()),
                source_code_context: Some(SourceCodeContext {
                    location: Some(SourceLocation {
                        file_path: Some("/w/Tests/FooTests.swift".to_string()),
                        line_number: Some(7),
                    }),
                    call_stack: vec![],
                }),
                ..FailureSummaryRecord::default()
            }],
            ..TestSummaryRecord::default()
        };
        let source = TracingSource {
            inner: JsonRecordSource::new(bundle(
                vec![action("Test App", Some("plan"))],
                vec![
                    (
                        "plan",
                        plan(
                            "AppTests",
                            vec![test_group(
                                "FooTests",
                                vec![
                                    test_leaf("FooTests/testA()", "Success", Some("s1")),
                                    test_leaf("FooTests/testB()", "Failure", Some("s2")),
                                ],
                            )],
                        ),
                    ),
                    ("s1", ResolvedRecord::TestSummary(TestSummaryRecord::default())),
                    ("s2", ResolvedRecord::TestSummary(failing)),
                ],
            )),
            resolved: RefCell::new(Vec::new()),
        };

        let record = build_run_record(&source, &BuildOptions::default()).unwrap();
        assert_eq!(*source.resolved.borrow(), vec!["plan", "s1", "s2"]);

        assert_eq!(record.chapters.len(), 1);
        let section = &record.chapters[0].sections["AppTests"];
        assert_eq!(section.leaves.len(), 2);
        assert_eq!(section.leaves[0].group, "FooTests");
        assert_eq!(section.leaves[1].status, TestStatus::Failure);
        assert_eq!(section.leaves[1].failures[0].file_path.as_deref(), Some("Tests/FooTests.swift"));
    }

    #[test]
    fn test_actions_without_tests_are_skipped() {
        let source = JsonRecordSource::new(bundle(
            vec![action("Build", None), action("Test", Some("plan"))],
            vec![("plan", plan("AppTests", vec![test_leaf("t", "Success", None)]))],
        ));
        let record = build_run_record(&source, &BuildOptions::default()).unwrap();
        assert_eq!(record.chapters.len(), 1);
        assert_eq!(record.chapters[0].label(), "Test");
    }

    #[test]
    fn test_unresolved_reference_aborts_with_context() {
        let source = JsonRecordSource::new(bundle(
            vec![action("Test App", Some("plan"))],
            vec![("plan", plan("AppTests", vec![test_group("FooTests", vec![test_leaf("FooTests/testA()", "Success", Some("gone"))])]))],
        ));

        let err = build_run_record(&source, &BuildOptions::default()).unwrap_err();
        match err {
            ReportError::Unresolved { id, location, .. } => {
                assert_eq!(id, "gone");
                assert_eq!(location.chapter.as_deref(), Some("Test App"));
                assert_eq!(location.section.as_deref(), Some("AppTests"));
                assert_eq!(location.group.as_deref(), Some("FooTests"));
                assert_eq!(location.leaf.as_deref(), Some("FooTests/testA()"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_plan_reference_names_chapter() {
        let source = JsonRecordSource::new(bundle(vec![action("Test App", Some("missing"))], vec![]));
        let err = build_run_record(&source, &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, ReportError::Unresolved { ref id, .. } if id == "missing"));
        assert!(err.to_string().contains("Test App"));
    }

    #[test]
    fn test_malformed_status_is_rejected() {
        let source = JsonRecordSource::new(bundle(
            vec![action("Test App", Some("plan"))],
            vec![("plan", plan("AppTests", vec![test_leaf("FooTests/testA()", "Flaky", None)]))],
        ));
        let err = build_run_record(&source, &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, ReportError::MalformedStatus { ref value, .. } if value == "Flaky"));
    }

    #[test]
    fn test_repeated_target_merges_into_one_section() {
        let plan = ResolvedRecord::PlanRunSummaries(PlanRunSummaries {
            summaries: vec![
                PlanRunSummary {
                    name: Some("English".to_string()),
                    testable_summaries: vec![TestableSummary {
                        name: Some("AppTests".to_string()),
                        target_name: None,
                        tests: vec![test_leaf("t", "Success", None)],
                    }],
                },
                PlanRunSummary {
                    name: Some("German".to_string()),
                    testable_summaries: vec![TestableSummary {
                        name: None,
                        target_name: Some("AppTests".to_string()),
                        tests: vec![test_leaf("t", "Failure", None)],
                    }],
                },
            ],
        });
        let source = JsonRecordSource::new(bundle(vec![action("Test", Some("plan"))], vec![("plan", plan)]));

        let record = build_run_record(&source, &BuildOptions::default()).unwrap();
        let chapter = &record.chapters[0];
        assert_eq!(chapter.sections.len(), 1);
        assert_eq!(chapter.sections["AppTests"].leaves.len(), 2);
    }

    #[test]
    fn test_activities_flatten_with_depth_and_attachments() {
        let activities = vec![
            ActivityRecord {
                title: "Start Test".to_string(),
                attachments: vec![],
                subactivities: vec![ActivityRecord {
                    title: "Tap button".to_string(),
                    attachments: vec![AttachmentRecord {
                        name: Some("Screenshot".to_string()),
                        payload_ref: Some(Reference::new("p1")),
                        dimensions: Some(Dimensions { width: Some(750), height: Some(1334), orientation: Some(1) }),
                        user_info: vec![KeyValue { key: "Scale".to_string(), value: "2".to_string() }],
                        ..AttachmentRecord::default()
                    }],
                    subactivities: vec![],
                }],
            },
            ActivityRecord { title: "Tear down".to_string(), ..ActivityRecord::default() },
        ];

        let flat = flatten_activities(&activities);
        let outline: Vec<(&str, usize)> = flat.iter().map(|a| (a.title.as_str(), a.indent)).collect();
        assert_eq!(outline, vec![("Start Test", 0), ("Tap button", 1), ("Tear down", 0)]);

        let attachment = &flat[1].attachments[0];
        assert!(attachment.is_image);
        assert_eq!(attachment.scale, Some(2));
        assert_eq!(attachment.payload_id.as_deref(), Some("p1"));
    }
}
