/// Configuration resolution module
///
/// This module handles:
/// - Loading `ReportConfig` from an optional TOML file
/// - Overlaying command-line flags on top of the file values
/// - Validating the final settings
/// - Building the glyph and attachment collaborators from them
use crate::cli::CliArgs;
use crate::error::ConfigError;
use crate::flatten::DEFAULT_MAX_DEPTH;
use crate::report::{AttachmentLinker, BaseUrlLinker, EmojiGlyphs, Glyphs, ImageGlyphs, RenderOptions};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default Markdown output path.
pub const DEFAULT_OUTPUT: &str = "test-report.md";

/// How statuses and icons are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GlyphStyle {
    /// GitHub emoji shortcodes
    #[default]
    Emoji,
    /// Hosted icon images (requires `image_base_url`)
    Image,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub failures_only: bool,
    pub glyphs: GlyphStyle,
    pub image_base_url: Option<String>,
    pub attachment_base_url: Option<String>,
    pub max_depth: usize,
    pub output: PathBuf,
    pub annotations_output: Option<PathBuf>,
    pub workflow_commands: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            failures_only: false,
            glyphs: GlyphStyle::Emoji,
            image_base_url: None,
            attachment_base_url: None,
            max_depth: DEFAULT_MAX_DEPTH,
            output: PathBuf::from(DEFAULT_OUTPUT),
            annotations_output: None,
            workflow_commands: false,
        }
    }
}

impl ReportConfig {
    /// Read a TOML config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {:?}", path);
        let text =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Build the effective configuration: file (if any), then CLI flags, then validation.
    pub fn resolve(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_cli(args);
        config.validate()?;
        debug!("Effective config: {:?}", config);
        Ok(config)
    }

    /// Flags given on the command line win over file values.
    pub fn apply_cli(&mut self, args: &CliArgs) {
        if args.failures_only {
            self.failures_only = true;
        }
        if let Some(glyphs) = args.glyphs {
            self.glyphs = glyphs;
        }
        if let Some(ref url) = args.image_base_url {
            self.image_base_url = Some(url.clone());
        }
        if let Some(ref url) = args.attachment_base_url {
            self.attachment_base_url = Some(url.clone());
        }
        if let Some(depth) = args.max_depth {
            self.max_depth = depth;
        }
        if let Some(ref output) = args.output {
            self.output = output.clone();
        }
        if let Some(ref annotations) = args.annotations {
            self.annotations_output = Some(annotations.clone());
        }
        if args.workflow_commands {
            self.workflow_commands = true;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".to_string()));
        }
        if self.glyphs == GlyphStyle::Image && self.image_base_url.as_deref().is_none_or(|url| url.trim().is_empty()) {
            return Err(ConfigError::Invalid("glyphs = \"image\" requires image_base_url".to_string()));
        }
        Ok(())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions { failures_only: self.failures_only }
    }

    pub fn glyphs(&self) -> Box<dyn Glyphs> {
        match (self.glyphs, &self.image_base_url) {
            (GlyphStyle::Image, Some(url)) => Box::new(ImageGlyphs::new(url.clone())),
            _ => Box::new(EmojiGlyphs),
        }
    }

    pub fn attachment_linker(&self) -> Box<dyn AttachmentLinker> {
        Box::new(BaseUrlLinker::new(self.attachment_base_url.clone().unwrap_or_default()))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
