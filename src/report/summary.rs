//! Chapter heading and summary block rendering.

use super::types::{Glyphs, Icon, RenderOptions};
use crate::anchor::AnchorScope;
use crate::report::stats::{ChapterRollup, GroupStats};
use crate::types::{Chapter, DisplayStatus};

/// `## <label>` followed by device, SDK and timing lines when known.
pub fn render_heading(chapter: &Chapter) -> String {
    let mut lines = vec![format!("## {}", chapter.label()), String::new()];

    let destination = &chapter.destination;
    if !destination.device_model.is_empty() {
        lines.push(format!("- **Device:** {}, {}", destination.device_model, destination.device_os));
    }
    if !destination.sdk_name.is_empty() {
        lines.push(format!("- **SDK:** {}, {}", destination.sdk_name, destination.sdk_version));
    }
    if let (Some(started), Some(elapsed)) = (chapter.started, chapter.elapsed_seconds()) {
        lines.push(format!("- **Started:** {} ({:.2}s)", started.format("%Y-%m-%d %H:%M:%S %:z"), elapsed));
    }
    lines.join("\n")
}

fn failed_count(stats: &GroupStats) -> String {
    if stats.has_failures() { format!("<b>{}</b>", stats.failed) } else { stats.failed.to_string() }
}

/// Totals table, then the per-section/group/variant summary unless only
/// failures are requested.
pub fn render_summary(rollup: &ChapterRollup<'_>, options: &RenderOptions, glyphs: &dyn Glyphs) -> String {
    let totals = &rollup.totals;
    let mut lines: Vec<String> = Vec::new();

    lines.push("### Summary".to_string());
    lines.push(r#"<table id="summary">"#.to_string());
    lines.push("<tr>".to_string());
    lines.push(format!(
        "<th>Total<th>{}&nbsp;Passed<th>{}&nbsp;Failed<th>{}&nbsp;Skipped<th>{}&nbsp;Expected Failure<th>{}&nbsp;Time",
        glyphs.status(DisplayStatus::Success),
        glyphs.status(DisplayStatus::Failure),
        glyphs.status(DisplayStatus::Skipped),
        glyphs.status(DisplayStatus::ExpectedFailure),
        glyphs.icon(Icon::Stopwatch),
    ));
    lines.push("<tr>".to_string());
    lines.push(format!(
        concat!(
            r#"<td align="right" width="118px">{}"#,
            r#"<td align="right" width="118px">{}"#,
            r#"<td align="right" width="118px">{}"#,
            r#"<td align="right" width="118px">{}"#,
            r#"<td align="right" width="158px">{}"#,
            r#"<td align="right" width="138px">{:.2}s"#,
        ),
        totals.total,
        totals.passed,
        failed_count(totals),
        totals.skipped,
        totals.expected_failure,
        totals.duration_secs(),
    ));
    lines.push("</table>\n".to_string());
    lines.push("---\n".to_string());

    if options.failures_only {
        return lines.join("\n");
    }

    lines.push("### Test Summary".to_string());
    for section in &rollup.sections {
        let section_anchor = rollup.anchor(AnchorScope::Summary, &[section.name]);
        let section_target = rollup.anchor(AnchorScope::Detail, &[section.name]);
        lines.push(format!(
            "#### {}[{}]({})\n",
            section_anchor.declaration(),
            section.name,
            section_target.link_target()
        ));

        for group in section.groups.values() {
            let group_anchor = rollup.anchor(AnchorScope::Summary, &[section.name, group.name]);
            let group_target = rollup.anchor(AnchorScope::Detail, &[section.name, group.name]);
            lines.push(format!(
                "<h5>{}{}</h5>\n",
                group_anchor.declaration(),
                group_target.link(&format!("{}&nbsp;{}", glyphs.icon(Icon::TestClass), group.name))
            ));

            lines.push(r#"<table id="test-table-summary">"#.to_string());
            lines.push("<tr>".to_string());
            lines.push(format!(
                "<th>Test<th>Total<th>{}<th>{}<th>{}<th>{}",
                glyphs.status(DisplayStatus::Success),
                glyphs.status(DisplayStatus::Failure),
                glyphs.status(DisplayStatus::Skipped),
                glyphs.status(DisplayStatus::ExpectedFailure),
            ));

            for variant in group.variants.values() {
                let key = variant.key.to_string();
                let row_anchor = rollup.anchor(AnchorScope::Summary, &[section.name, group.name, key.as_str()]);
                let row_target = rollup.anchor(AnchorScope::Detail, &[section.name, group.name, key.as_str()]);
                let stats = &variant.stats;
                lines.push(format!(
                    concat!(
                        r#"<tr><td align="left" width="368px">{}{}"#,
                        r#"<td align="right" width="80px">{}"#,
                        r#"<td align="right" width="80px">{}"#,
                        r#"<td align="right" width="80px">{}"#,
                        r#"<td align="right" width="80px">{}"#,
                        r#"<td align="right" width="80px">{}"#,
                    ),
                    row_anchor.declaration(),
                    row_target.link(&format!("{}&nbsp;{}", glyphs.icon(Icon::TestMethod), variant.name())),
                    stats.total,
                    stats.passed,
                    failed_count(stats),
                    stats.skipped,
                    stats.expected_failure,
                ));
            }
            lines.push("</table>\n".to_string());
        }
    }
    lines.push("---\n".to_string());

    lines.join("\n")
}
