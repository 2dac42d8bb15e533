//! Error types for rule editing and rule-set files.

use crate::rule::RuleId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the page controller, the store and rule-set files.
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Failed to parse rule set: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Failed to serialize rule set: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported rule file {path}: expected .htkrules, .json or a rule-set MIME type")]
    UnsupportedFile { path: PathBuf },
    #[error("No rule with id {0}")]
    RuleNotFound(RuleId),
    #[error("Rule {rule} has no matcher at index {index}")]
    MatcherIndexOutOfRange { rule: RuleId, index: usize },
    #[error("Cannot move rule from {from} to {to}: only {len} rules")]
    InvalidMove { from: usize, to: usize, len: usize },
    #[error(transparent)]
    InvalidMatcherConfig(#[from] FormError),
}

/// Invalid input in a matcher configuration form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("A value is required")]
    Empty,
    #[error("Paths must start with '/'")]
    RelativePath,
    #[error("Invalid regular expression: {0}")]
    Regex(String),
    #[error("Expected 'name{separator}value', got '{line}'")]
    MalformedPair { line: String, separator: char },
    #[error("Invalid JSON: {0}")]
    Json(String),
    #[error("Unknown HTTP method '{0}'")]
    UnknownMethod(String),
    #[error("Invalid status code '{0}': expected 100-599")]
    InvalidStatus(String),
    #[error("This matcher cannot be configured here")]
    NotConfigurable,
}

pub type Result<T> = std::result::Result<T, RulesError>;
