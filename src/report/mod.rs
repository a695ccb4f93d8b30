//! Report generation module - rollups, rendering and export.
//!
//! This module handles:
//! - Regrouping each chapter's leaves into group and variant rollups
//! - Rendering the summary, failures and details blocks
//! - Collecting file annotations for every recorded failure
//! - Export to Markdown, annotations JSON and workflow commands
//!
//! # Module Organization
//!
//! - `types` - Glyph and attachment collaborators, `TestReport`
//! - `stats` - `GroupStats` and the group/variant/chapter rollups
//! - `summary` - Chapter heading and summary block
//! - `failures` - Failures block
//! - `details` - Details block with per-test rows
//! - `export` - File and console output

mod details;
mod export;
mod failures;
mod stats;
mod summary;
mod types;

pub use types::{
    AttachmentLinker, BaseUrlLinker, ChapterReport, EmojiGlyphs, Glyphs, Icon, ImageGlyphs, RenderOptions, TestReport,
};

pub use stats::{ChapterRollup, GroupRollup, GroupStats, SectionRollup, VariantKey, VariantRollup, percent};

pub use details::{escape_hash_sign, image_width, indentation};

pub use export::{print_workflow_commands, write_annotations_json, write_markdown};

use crate::failure_extract::annotation_for;
use crate::types::{Chapter, RunRecord};
use log::debug;

/// Render every chapter of `record`.
///
/// Annotations cover every failure of every chapter, in order, whatever the
/// rendering filter.
pub fn render_report(
    record: &RunRecord,
    options: &RenderOptions,
    glyphs: &dyn Glyphs,
    linker: &dyn AttachmentLinker,
) -> TestReport {
    let chapters = record
        .chapters
        .iter()
        .enumerate()
        .map(|(index, chapter)| render_chapter(chapter, index + 1, options, glyphs, linker))
        .collect();

    let annotations = record
        .chapters
        .iter()
        .flat_map(|chapter| chapter.leaves())
        .flat_map(|leaf| leaf.failures.iter())
        .filter_map(annotation_for)
        .collect::<Vec<_>>();

    debug!("Rendered {} chapters, {} annotations", record.chapters.len(), annotations.len());
    TestReport { status: record.status(), annotations, chapters }
}

fn render_chapter(
    chapter: &Chapter,
    ordinal: usize,
    options: &RenderOptions,
    glyphs: &dyn Glyphs,
    linker: &dyn AttachmentLinker,
) -> ChapterReport {
    let rollup = ChapterRollup::new(chapter, ordinal);
    debug!(
        "Chapter {}: {} tests, {} failed",
        chapter.label(),
        rollup.totals.total,
        rollup.totals.failed
    );

    ChapterReport {
        heading: summary::render_heading(chapter),
        summary: summary::render_summary(&rollup, options, glyphs),
        failures: failures::render_failures(&rollup, glyphs),
        details: details::render_details(&rollup, options, glyphs, linker),
    }
}
