use crate::config::GlyphStyle;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "xcreport")]
#[command(about = "Render a test-run record bundle as a cross-linked Markdown report")]
#[command(version)]
pub struct CliArgs {
    /// JSON record bundle exported from a test result archive
    #[arg(value_name = "BUNDLE")]
    pub input: PathBuf,

    /// TOML config file; command-line flags override its values
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Markdown report output path (default: test-report.md)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Also write status and file annotations as JSON
    #[arg(long, value_name = "PATH")]
    pub annotations: Option<PathBuf>,

    /// Print a GitHub Actions `::error` command per annotation
    #[arg(long)]
    pub workflow_commands: bool,

    /// Only render failing tests in the summary and detail views
    #[arg(long)]
    pub failures_only: bool,

    /// Glyph style for statuses and icons
    #[arg(long, value_enum)]
    pub glyphs: Option<GlyphStyle>,

    /// Base URL of hosted icon images (for --glyphs image)
    #[arg(long, value_name = "URL")]
    pub image_base_url: Option<String>,

    /// Base URL (or directory) where attachment payloads are published
    #[arg(long, value_name = "URL")]
    pub attachment_base_url: Option<String>,

    /// Maximum nesting depth of the test tree
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        CliArgs::parse()
    }
}
