/// User interface and status output utilities
///
/// This module handles:
/// - Serialized console output
/// - Colored terminal text
/// - Status and summary message formatting
use crate::report::{GroupStats, TestReport};
use crate::types::{OverallStatus, RunRecord};
use lazy_static::lazy_static;
use std::io::Write;
use std::sync::Mutex;

/// Execute a function with exclusive access to console output
fn status_lock<F>(f: F)
where
    F: FnOnce(),
{
    lazy_static! {
        static ref LOCK: Mutex<()> = Mutex::new(());
    }
    let _guard = LOCK.lock();
    f();
}

/// Print the "xcreport: " prefix for status messages
fn print_status_header() {
    print!("xcreport: ");
}

/// Print colored text to terminal, with fallback to plain text
fn print_color(s: &str, fg: term::color::Color) {
    if !really_print_color(s, fg) {
        print!("{}", s);
    }

    fn really_print_color(s: &str, fg: term::color::Color) -> bool {
        if let Some(ref mut t) = term::stdout() {
            if t.fg(fg).is_err() {
                return false;
            }
            let _ = t.attr(term::Attr::Bold);
            if write!(t, "{}", s).is_err() {
                return false;
            }
            let _ = t.reset();
        }

        true
    }
}

/// Print a status message with "xcreport: " prefix
pub fn status(s: &str) {
    status_lock(|| {
        print_status_header();
        println!("{}", s);
    });
}

/// Print an error message with colored "error" prefix to stderr
///
/// Stdout carries workflow commands when they are requested.
pub fn print_error(msg: &str) {
    status_lock(|| {
        let colored = match term::stderr() {
            Some(mut t) => write_error_colored(t.as_mut(), msg).is_ok(),
            None => false,
        };
        if !colored {
            let _ = write_error(&mut std::io::stderr().lock(), msg);
        }
    });
}

fn write_error_colored<T: term::Terminal + ?Sized>(t: &mut T, msg: &str) -> term::Result<()> {
    writeln!(t)?;
    t.fg(term::color::BRIGHT_RED)?;
    let _ = t.attr(term::Attr::Bold);
    write!(t, "error")?;
    t.reset()?;
    writeln!(t, ": {}", msg)?;
    writeln!(t)?;
    Ok(())
}

/// Plain-text error block, used when stderr is not a terminal.
fn write_error<W: Write>(out: &mut W, msg: &str) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "error: {}", msg)?;
    writeln!(out)
}

/// One-line totals for the console, e.g. `3 tests: 1 passed, 1 failed, 1 skipped, 0 expected failures`.
pub fn format_totals(stats: &GroupStats) -> String {
    format!(
        "{} tests: {} passed, {} failed, {} skipped, {} expected failures ({:.2}s)",
        stats.total,
        stats.passed,
        stats.failed,
        stats.skipped,
        stats.expected_failure,
        stats.duration_secs()
    )
}

/// Print per-chapter totals and the overall status.
pub fn print_summary(record: &RunRecord, report: &TestReport) {
    status_lock(|| {
        for (index, chapter) in record.chapters.iter().enumerate() {
            let rollup = crate::report::ChapterRollup::new(chapter, index + 1);
            print_status_header();
            println!("{}: {}", chapter.label(), format_totals(&rollup.totals));
        }

        print_status_header();
        match report.status {
            Some(OverallStatus::Failure) => print_color("FAILURE", term::color::BRIGHT_RED),
            Some(OverallStatus::Success) => print_color("SUCCESS", term::color::BRIGHT_GREEN),
            None => print!("no tests passed or failed"),
        }
        println!(" ({} annotations)", report.annotations.len());
    });
}
