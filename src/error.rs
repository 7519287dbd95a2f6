use std::path::PathBuf;
use thiserror::Error;

/// Every failure the sync pipeline can hit. All of them end the run.
#[derive(Debug, Error)]
pub enum EnvconfError {
    #[error("'{}' does not exist", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("{} already exists, refusing to override", .0.display())]
    ConfigExists(PathBuf),

    #[error("Invalid toml in config file '{}': {message}", .path.display())]
    InvalidToml { path: PathBuf, message: String },

    #[error("Invalid config file '{}': {message}", .path.display())]
    InvalidSchema { path: PathBuf, message: String },

    #[error("Templates and outputs in the config file must be unique ({count} duplicate {kind} path(s): {})", .paths.join(", "))]
    DuplicateEntry {
        kind: &'static str,
        count: usize,
        paths: Vec<String>,
    },

    #[error("Template file '{}' does not exist", .0.display())]
    TemplateMissing(PathBuf),

    #[error("Failed to read '{}'", .path.display())]
    FileReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{}'", .path.display())]
    FileWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid env file '{}': {message}", .path.display())]
    InvalidEnvFile { path: PathBuf, message: String },

    #[error("Failed to read answer for {variable}: {message}")]
    PromptFailure { variable: String, message: String },
}

pub type Result<T> = std::result::Result<T, EnvconfError>;
