//! Turn nested test-run records into cross-linked Markdown reports.
//!
//! The pipeline is [`builder::build_run_record`] (resolve and flatten the
//! input tree) followed by [`report::render_report`] (roll up, classify and
//! render) and the writers in [`report`].

pub mod anchor;
pub mod builder;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod failure_extract;
pub mod flatten;
pub mod record;
pub mod report;
pub mod types;
pub mod ui;
