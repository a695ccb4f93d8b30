//! Error types for report construction.
//!
//! Every error that can abort a formatting pass carries a [`Location`] so the
//! offending input can be found without re-running with extra logging.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Where in the run record an error was raised.
///
/// Fields are filled in as the builder descends; unset fields are omitted from
/// the rendered message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub chapter: Option<String>,
    pub section: Option<String>,
    pub group: Option<String>,
    pub leaf: Option<String>,
}

impl Location {
    pub fn chapter(name: impl Into<String>) -> Self {
        Self { chapter: Some(name.into()), ..Self::default() }
    }

    pub fn with_section(&self, name: impl Into<String>) -> Self {
        Self { section: Some(name.into()), ..self.clone() }
    }

    pub fn with_group(&self, name: impl Into<String>) -> Self {
        Self { group: Some(name.into()), ..self.clone() }
    }

    pub fn with_leaf(&self, identifier: impl Into<String>) -> Self {
        Self { leaf: Some(identifier.into()), ..self.clone() }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            ("chapter", &self.chapter),
            ("section", &self.section),
            ("group", &self.group),
            ("test", &self.leaf),
        ]
        .iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| format!("{} `{}`", label, v)))
        .collect();

        if parts.is_empty() { write!(f, "run root") } else { write!(f, "{}", parts.join(", ")) }
    }
}

/// Failure to produce a record from a [`RecordSource`](crate::record::RecordSource).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no record with id `{0}`")]
    Missing(String),

    #[error("record `{id}` is a {found} record, expected {expected}")]
    WrongKind { id: String, found: &'static str, expected: &'static str },

    #[error("failed to read record bundle {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse record bundle {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Hard errors that abort a formatting pass.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to resolve reference `{id}` ({location})")]
    Unresolved {
        id: String,
        location: Location,
        #[source]
        source: SourceError,
    },

    #[error("unrecognized test status `{value}` ({location})")]
    MalformedStatus { value: String, location: Location },

    #[error("test tree nesting exceeds {limit} levels ({location})")]
    NestingTooDeep { limit: usize, location: Location },

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
