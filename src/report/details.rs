//! Details block: per-group statistics and one row per executed test.
//!
//! Rows of a multi-configuration test share one status cell (`rowspan`) that
//! shows the classified variant status. In failures-only mode rows are
//! filtered before any table is opened, so no empty table is ever emitted.

use super::types::{AttachmentLinker, Glyphs, Icon, RenderOptions};
use crate::anchor::AnchorScope;
use crate::report::stats::{ChapterRollup, GroupRollup, GroupStats, SectionRollup, VariantRollup, percent};
use crate::types::{Activity, Attachment, DisplayStatus, LeafResult, TestStatus};

const STATUS_CELL: &str = r#"valign="top" width="52px""#;
const DETAIL_CELL: &str = r#"valign="top" width="716px""#;

/// Shared rendering state for one chapter.
struct DetailRenderer<'r> {
    rollup: &'r ChapterRollup<'r>,
    options: &'r RenderOptions,
    glyphs: &'r dyn Glyphs,
    linker: &'r dyn AttachmentLinker,
}

pub fn render_details(
    rollup: &ChapterRollup<'_>,
    options: &RenderOptions,
    glyphs: &dyn Glyphs,
    linker: &dyn AttachmentLinker,
) -> String {
    let renderer = DetailRenderer { rollup, options, glyphs, linker };
    let mut lines = vec!["### Test Details".to_string()];
    for section in &renderer.rollup.sections {
        renderer.section(section, &mut lines);
    }
    lines.join("\n")
}

impl DetailRenderer<'_> {
    fn back_link(&self, scope_parts: &[&str]) -> String {
        // The summary views are not rendered in failures-only mode
        if self.options.failures_only {
            return String::new();
        }
        self.rollup.anchor(AnchorScope::Summary, scope_parts).link(&self.glyphs.icon(Icon::Back))
    }

    fn section(&self, section: &SectionRollup<'_>, lines: &mut Vec<String>) {
        if self.options.failures_only && !section.stats.has_failures() {
            return;
        }

        lines.push(format!(
            "#### {}{}{}",
            self.rollup.anchor(AnchorScope::Detail, &[section.name]).declaration(),
            section.name,
            self.back_link(&[section.name])
        ));
        lines.push(String::new());

        for group in section.groups.values() {
            if self.options.failures_only && !group.stats.has_failures() {
                continue;
            }
            self.group(section.name, group, lines);
        }
    }

    fn group(&self, section: &str, group: &GroupRollup<'_>, lines: &mut Vec<String>) {
        lines.push(format!(
            "{}<h5>{}&nbsp;{}</h5>",
            self.rollup.anchor(AnchorScope::Detail, &[section, group.name]).declaration(),
            group.name,
            self.back_link(&[section, group.name])
        ));
        lines.push(self.stats_table(&group.stats));

        let mut rows = Vec::new();
        for variant in group.variants.values() {
            self.variant_rows(section, group.name, variant, &mut rows);
        }
        if rows.is_empty() {
            return;
        }

        lines.push(r#"<table id="details">"#.to_string());
        lines.extend(rows);
        lines.push("</table>".to_string());
        lines.push(String::new());
    }

    fn stats_table(&self, stats: &GroupStats) -> String {
        let failed = format!("{} ({}%)", stats.failed, percent(stats.failed, stats.total));
        let failed = if stats.has_failures() { format!("<b>{}</b>", failed) } else { failed };

        let lines = [
            r#"<table id="test-summary-table">"#.to_string(),
            "<tr>".to_string(),
            format!(
                "<th>{}<th>{}<th>{}<th>{}<th>{}",
                self.glyphs.status(DisplayStatus::Success),
                self.glyphs.status(DisplayStatus::Failure),
                self.glyphs.status(DisplayStatus::Skipped),
                self.glyphs.status(DisplayStatus::ExpectedFailure),
                self.glyphs.icon(Icon::Stopwatch),
            ),
            "<tr>".to_string(),
            format!(
                concat!(
                    r#"<td align="right" width="154px">{} ({}%)"#,
                    r#"<td align="right" width="154px">{}"#,
                    r#"<td align="right" width="154px">{} ({}%)"#,
                    r#"<td align="right" width="154px">{} ({}%)"#,
                    r#"<td align="right" width="154px">{:.2}s"#,
                ),
                stats.passed,
                percent(stats.passed, stats.total),
                failed,
                stats.skipped,
                percent(stats.skipped, stats.total),
                stats.expected_failure,
                percent(stats.expected_failure, stats.total),
                stats.duration_secs(),
            ),
            "</table>\n".to_string(),
        ];
        lines.join("\n")
    }

    fn variant_rows(&self, section: &str, group: &str, variant: &VariantRollup<'_>, rows: &mut Vec<String>) {
        let visible: Vec<&LeafResult> = variant
            .leaves
            .iter()
            .copied()
            .filter(|leaf| !self.options.failures_only || leaf.status == TestStatus::Failure)
            .collect();
        if visible.is_empty() {
            return;
        }

        let key = variant.key.to_string();
        let parts = [section, group, key.as_str()];
        let shared_status = if variant.leaves.len() > 1 { variant.status() } else { None };

        for (index, leaf) in visible.iter().enumerate() {
            let mut content = String::new();
            if index == 0 {
                content.push_str(&self.rollup.anchor(AnchorScope::Detail, &parts).declaration());
            }
            content.push_str(&self.leaf_content(leaf, &parts));

            let row = match (shared_status, index) {
                (Some(status), 0) => format!(
                    r#"<tr><td align="center" rowspan="{}" {}>{}<td {}>{}"#,
                    visible.len(),
                    STATUS_CELL,
                    self.glyphs.status(status),
                    DETAIL_CELL,
                    content
                ),
                (Some(_), _) => format!("<tr><td {}>{}", DETAIL_CELL, content),
                (None, _) => format!(
                    r#"<tr><td align="center" {}>{}<td {}>{}"#,
                    STATUS_CELL,
                    self.glyphs.status(leaf.status.into()),
                    DETAIL_CELL,
                    content
                ),
            };
            rows.push(row);
        }
    }

    fn leaf_content(&self, leaf: &LeafResult, parts: &[&str]) -> String {
        let back = if leaf.status == TestStatus::Failure {
            self.rollup.anchor(AnchorScope::Failure, parts).link(&self.glyphs.icon(Icon::Back))
        } else {
            String::new()
        };
        let method = format!("{}&nbsp;<code>{}</code>{}", self.glyphs.icon(Icon::TestMethod), leaf.name, back);

        let mut content = match &leaf.configuration {
            Some(configuration) => format!(
                "{} {}<br><b>Configuration:</b><br><code>{}</code>",
                self.glyphs.status(leaf.status.into()),
                method,
                configuration.describe()
            ),
            None => method,
        };

        if !leaf.activities.is_empty() {
            let open = matches!(leaf.status, TestStatus::Failure | TestStatus::ExpectedFailure);
            let activities: Vec<String> =
                leaf.activities.iter().map(|activity| self.activity(activity, open)).collect();
            content.push_str(&format!("<br><b>Activities:</b>\n\n{}", activities.join("\n")));
        }
        content
    }

    fn activity(&self, activity: &Activity, open: bool) -> String {
        let item = format!("{}- {}", indentation(activity.indent), escape_hash_sign(&activity.title));

        let images: Vec<String> = activity
            .attachments
            .iter()
            .filter(|attachment| attachment.is_image)
            .map(|attachment| {
                format!(r#"<div><img width="{}" src="{}"></div>"#, image_width(attachment), self.linker.link(attachment))
            })
            .collect();
        if images.is_empty() {
            return item;
        }

        format!(
            "{}\n{}<details{}><summary>{}</summary>{}</details>\n",
            item,
            indentation(activity.indent + 1),
            if open { " open" } else { "" },
            self.glyphs.icon(Icon::Attachment),
            images.join("")
        )
    }
}

/// Two spaces per nesting level.
pub fn indentation(level: usize) -> String {
    "  ".repeat(level)
}

/// `#` would start a heading or issue reference in Markdown.
pub fn escape_hash_sign(text: &str) -> String {
    text.replace('#', "&#35;")
}

/// Display width of an image attachment.
///
/// Rotated orientations (EXIF 5-8) display the stored height as width. A
/// `Scale` factor shrinks pixel widths; without dimensions it shrinks the
/// default `100%`.
pub fn image_width(attachment: &Attachment) -> String {
    let rotated = attachment.orientation.is_some_and(|o| o >= 5);
    match (attachment.width, attachment.height, attachment.scale) {
        (Some(width), Some(height), scale) => {
            let pixels = if rotated { height } else { width };
            match scale {
                Some(scale) => format!("{}px", (pixels as f64 / scale as f64).round()),
                None => format!("{}px", pixels),
            }
        }
        (_, _, Some(scale)) => format!("{}%", (100.0 / scale as f64).round()),
        _ => "100%".to_string(),
    }
}

#[cfg(test)]
#[path = "details_test.rs"]
mod details_test;
