/// Tests for config module
#[cfg(test)]
mod tests {
    use crate::cli::CliArgs;
    use crate::config::{GlyphStyle, ReportConfig};
    use crate::error::ConfigError;
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["xcreport", "bundle.json"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ReportConfig::resolve(&args(&[])).expect("defaults should validate");
        assert!(!config.failures_only);
        assert_eq!(config.glyphs, GlyphStyle::Emoji);
        assert_eq!(config.max_depth, 256);
        assert_eq!(config.output, PathBuf::from("test-report.md"));
    }

    #[test]
    fn test_file_values_are_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("xcreport.toml");
        std::fs::write(
            &path,
            "failures_only = true\nglyphs = \"image\"\nimage_base_url = \"https://example.com/icons\"\nmax_depth = 32\n",
        )
        .unwrap();

        let config = ReportConfig::resolve(&args(&["--config", path.to_str().unwrap()])).unwrap();
        assert!(config.failures_only);
        assert_eq!(config.glyphs, GlyphStyle::Image);
        assert_eq!(config.max_depth, 32);
        assert!(config.glyphs().icon(crate::report::Icon::Back).contains("https://example.com/icons/back.png"));
    }

    #[test]
    fn test_cli_flags_override_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("xcreport.toml");
        std::fs::write(&path, "max_depth = 32\noutput = \"from-file.md\"\n").unwrap();

        let config = ReportConfig::resolve(&args(&[
            "--config",
            path.to_str().unwrap(),
            "--max-depth",
            "8",
            "--output",
            "from-cli.md",
        ]))
        .unwrap();
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.output, PathBuf::from("from-cli.md"));
    }

    #[test]
    fn test_image_glyphs_require_base_url() {
        let err = ReportConfig::resolve(&args(&["--glyphs", "image"])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let ok = ReportConfig::resolve(&args(&["--glyphs", "image", "--image-base-url", "https://x"]));
        assert!(ok.is_ok());
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let config = ReportConfig { max_depth: 0, ..ReportConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("xcreport.toml");
        std::fs::write(&path, "failure_only = true\n").unwrap();
        assert!(matches!(ReportConfig::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let err = ReportConfig::load(&PathBuf::from("/nonexistent/xcreport.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
