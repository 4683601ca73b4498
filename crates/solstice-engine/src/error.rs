//! Error taxonomy for the engine.
//!
//! Configuration errors are fatal and reported once, before any analysis
//! starts. Anything encountered during analysis is converted to an issue by
//! the driver so the caller always receives a report for the files the tool
//! managed to touch.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration resolution failures. Analysis does not start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown preset `{0}`")]
    UnknownPreset(String),

    #[error("preset `extends` chain contains a cycle through `{0}`")]
    CyclicExtends(String),

    #[error("unknown rule `{0}` in configuration")]
    UnknownRule(String),

    #[error("bad severity `{value}` for `{key}`")]
    BadSeverity { key: String, value: String },

    #[error("bad options for `{rule_id}`: {reason}")]
    BadOptions { rule_id: String, reason: String },

    #[error("bad file glob `{pattern}`: {reason}")]
    BadGlob { pattern: String, reason: String },

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {reason}")]
    Syntax { path: PathBuf, reason: String },
}

/// Rule registration failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate rule id `{0}`")]
    DuplicateId(String),

    #[error("rule `{id}` declares category `{category}`, which does not match its id prefix")]
    CategoryMismatch { id: String, category: String },

    #[error("rule `{0}` uses a reserved category")]
    ReservedCategory(String),

    #[error("rule id `{0}` is not of the form `category/short-name`")]
    MalformedId(String),
}

/// A file failed to parse and the parser is not in tolerant mode.
#[derive(Debug, Error)]
#[error("{}: {message} (line {line})", file.display())]
pub struct ParseError {
    pub file: PathBuf,
    pub line: u32,
    pub message: String,
}

/// Per-file analysis failures surfaced to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("parser failure: {0}")]
    Parser(String),
}
