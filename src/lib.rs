// Public API
pub mod cli;
pub mod commands;
pub mod ui;

// Core domain types
pub mod config;
pub mod envfile;
pub mod error;
pub mod prompt;
pub mod reconcile;
pub mod sync;

// Re-export main types
pub use config::{Config, FileEntry};
pub use envfile::{EnvFile, EnvMap};
pub use error::EnvconfError;
pub use prompt::{LinePrompter, Prompter, TerminalPrompter};
pub use reconcile::{Answer, AnswerValue, PromptKind, PromptRequest};
pub use sync::{Outcome, Summary};
