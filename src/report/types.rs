//! Report type definitions for the rendering model.
//!
//! This module defines the glyph and attachment collaborators injected into
//! the renderer, and the rendered report itself.

use crate::types::{Annotation, Attachment, DisplayStatus, OverallStatus};
use serde::Serialize;

/// Non-status icons used in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    /// Link back to the referring location
    Back,
    /// Test group (class) marker
    TestClass,
    /// Test method marker
    TestMethod,
    /// Attachment disclosure
    Attachment,
    /// Duration column header
    Stopwatch,
}

impl Icon {
    fn file_name(&self) -> &'static str {
        match self {
            Icon::Back => "back.png",
            Icon::TestClass => "test-class.png",
            Icon::TestMethod => "test-method.png",
            Icon::Attachment => "attachment.png",
            Icon::Stopwatch => "stopwatch.png",
        }
    }
}

/// Maps statuses and icons to inline markup.
pub trait Glyphs {
    fn status(&self, status: DisplayStatus) -> String;
    fn icon(&self, icon: Icon) -> String;
}

/// GitHub emoji shortcodes. Needs no hosting.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmojiGlyphs;

impl Glyphs for EmojiGlyphs {
    fn status(&self, status: DisplayStatus) -> String {
        match status {
            DisplayStatus::Success => ":white_check_mark:",
            DisplayStatus::Failure => ":x:",
            DisplayStatus::Skipped => ":leftwards_arrow_with_hook:",
            DisplayStatus::ExpectedFailure => ":warning:",
            DisplayStatus::MixedFailure => ":large_orange_diamond:",
            DisplayStatus::MixedSuccess => ":large_blue_diamond:",
        }
        .to_string()
    }

    fn icon(&self, icon: Icon) -> String {
        match icon {
            Icon::Back => ":top:",
            Icon::TestClass => ":package:",
            Icon::TestMethod => ":small_blue_diamond:",
            Icon::Attachment => ":paperclip:",
            Icon::Stopwatch => ":stopwatch:",
        }
        .to_string()
    }
}

/// `<img>` tags pointing at icon files hosted under `base_url`.
#[derive(Debug, Clone)]
pub struct ImageGlyphs {
    pub base_url: String,
}

impl ImageGlyphs {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }

    fn image(&self, file: &str, alt: &str, width: u32) -> String {
        format!(
            r#"<img src="{}/{}" alt="{}" title="{}" width="{}px" height="{}px">"#,
            self.base_url.trim_end_matches('/'),
            file,
            alt,
            alt,
            width,
            width
        )
    }
}

impl Glyphs for ImageGlyphs {
    fn status(&self, status: DisplayStatus) -> String {
        let file = match status {
            DisplayStatus::Success => "passed.png",
            DisplayStatus::Failure => "failure.png",
            DisplayStatus::Skipped => "skipped.png",
            DisplayStatus::ExpectedFailure => "expected-failure.png",
            DisplayStatus::MixedFailure => "mixed-failure.png",
            DisplayStatus::MixedSuccess => "mixed-success.png",
        };
        self.image(file, status.as_str(), 14)
    }

    fn icon(&self, icon: Icon) -> String {
        match icon {
            // No bitmap for the clock; the shortcode renders everywhere
            Icon::Stopwatch => ":stopwatch:".to_string(),
            other => self.image(other.file_name(), "", 14),
        }
    }
}

/// Turns an attachment into a URL or relative path for `<img src>`.
pub trait AttachmentLinker {
    fn link(&self, attachment: &Attachment) -> String;
}

/// Joins the attachment's payload id (or file name) onto a base URL.
///
/// With an empty base the bare name is returned, i.e. a path relative to the
/// report file.
#[derive(Debug, Clone, Default)]
pub struct BaseUrlLinker {
    pub base_url: String,
}

impl BaseUrlLinker {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

impl AttachmentLinker for BaseUrlLinker {
    fn link(&self, attachment: &Attachment) -> String {
        let name = attachment.payload_id.as_deref().or(attachment.filename.as_deref()).unwrap_or_default();
        let base = self.base_url.trim_end_matches('/');
        if base.is_empty() { name.to_string() } else { format!("{}/{}", base, name) }
    }
}

/// Rendering switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render only failing tests in the summary and detail views.
    pub failures_only: bool,
}

/// The rendered document blocks of one chapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChapterReport {
    pub heading: String,
    pub summary: String,
    pub failures: String,
    pub details: String,
}

/// Output of a formatting pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TestReport {
    pub status: Option<OverallStatus>,
    pub annotations: Vec<Annotation>,
    pub chapters: Vec<ChapterReport>,
}

impl TestReport {
    /// Assemble the complete Markdown document.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for chapter in &self.chapters {
            for block in [&chapter.heading, &chapter.summary, &chapter.failures, &chapter.details] {
                out.push_str(block);
                if !block.ends_with('\n') {
                    out.push('\n');
                }
                out.push('\n');
            }
        }
        out
    }

    pub fn failed(&self) -> bool {
        self.status == Some(OverallStatus::Failure)
    }
}
