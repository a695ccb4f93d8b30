// Copyright 2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use log::debug;
use std::error::Error;
use xcreport::builder::{self, BuildOptions};
use xcreport::cli::CliArgs;
use xcreport::config::ReportConfig;
use xcreport::record::JsonRecordSource;
use xcreport::{report, ui};

fn main() {
    env_logger::init();

    // Parse CLI arguments
    let args = CliArgs::parse_args();

    // Resolve configuration (file + flags)
    let config = match ReportConfig::resolve(&args) {
        Ok(c) => c,
        Err(e) => {
            ui::print_error(&format!("Configuration error: {}", error_chain(&e)));
            std::process::exit(1);
        }
    };

    let failed = match run(&args, &config) {
        Ok(failed) => failed,
        Err(e) => {
            ui::print_error(&error_chain(&*e));
            std::process::exit(1);
        }
    };

    // 2 when any test failed; 1 is reserved for tool errors
    let exit_code = if failed { 2 } else { 0 };
    std::process::exit(exit_code);
}

/// Build, render and write the report. Returns whether any test failed.
fn run(args: &CliArgs, config: &ReportConfig) -> Result<bool, Box<dyn Error>> {
    let source = JsonRecordSource::open(&args.input)?;
    let record = builder::build_run_record(&source, &BuildOptions { max_depth: config.max_depth })?;

    let glyphs = config.glyphs();
    let linker = config.attachment_linker();
    let test_report = report::render_report(&record, &config.render_options(), glyphs.as_ref(), linker.as_ref());

    report::write_markdown(&test_report, &config.output)
        .map_err(|e| format!("failed to write {}: {}", config.output.display(), e))?;
    ui::status(&format!("Markdown report saved to: {}", config.output.display()));

    if let Some(ref path) = config.annotations_output {
        report::write_annotations_json(&test_report, path)
            .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;
        ui::status(&format!("Annotations saved to: {}", path.display()));
    }

    if config.workflow_commands {
        report::print_workflow_commands(&test_report, &mut std::io::stdout().lock())?;
    }

    ui::print_summary(&record, &test_report);
    debug!("Done; status {:?}", test_report.status);
    Ok(test_report.failed())
}

/// `error: cause: cause` rendering of an error and its sources.
fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {}", cause));
        source = cause.source();
    }
    message
}
