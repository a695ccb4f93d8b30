//! Failures block: one entry per test that failed in at least one configuration.

use super::details::{escape_hash_sign, indentation};
use super::types::{Glyphs, Icon};
use crate::anchor::AnchorScope;
use crate::report::stats::ChapterRollup;
use crate::types::{DisplayStatus, LeafResult};

pub fn render_failures(rollup: &ChapterRollup<'_>, glyphs: &dyn Glyphs) -> String {
    let mut lines = vec![format!("### {} Failures", glyphs.status(DisplayStatus::Failure))];
    let mut entries = 0;

    for section in &rollup.sections {
        for group in section.groups.values() {
            for variant in group.variants.values() {
                let mut failing = variant.failing_leaves().peekable();
                if failing.peek().is_none() {
                    continue;
                }

                let key = variant.key.to_string();
                let parts = [section.name, group.name, key.as_str()];
                let target = rollup.anchor(AnchorScope::Detail, &parts);
                lines.push(format!(
                    "<h4>{}{}</h4>",
                    rollup.anchor(AnchorScope::Failure, &parts).declaration(),
                    target.link(&format!("{}/{}", group.name, variant.name()))
                ));

                for leaf in failing {
                    if let Some(configuration) = &leaf.configuration
                        && variant.leaves.len() > 1
                    {
                        lines.push(format!("<b>Configuration:</b> <code>{}</code>\n", configuration.describe()));
                    }
                    for failure in &leaf.failures {
                        lines.push(failure.render());
                    }
                    lines.extend(attachment_notes(leaf, glyphs));
                }
                entries += 1;
            }
        }
    }

    if entries == 0 {
        lines.push("All tests passed :tada:".to_string());
    } else {
        lines.push(String::new());
    }
    lines.join("\n")
}

/// One list item per activity that carries attachments, so the evidence for a
/// failure can be found next to it.
fn attachment_notes(leaf: &LeafResult, glyphs: &dyn Glyphs) -> Vec<String> {
    leaf.activities
        .iter()
        .filter(|activity| !activity.attachments.is_empty())
        .map(|activity| {
            format!(
                "{}- {}&nbsp;{} ({})",
                indentation(activity.indent),
                glyphs.icon(Icon::Attachment),
                escape_hash_sign(&activity.title),
                activity.attachments.len()
            )
        })
        .collect()
}
