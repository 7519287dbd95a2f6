use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;

/// Keep dotenv files in sync with their templates
///
/// envconf reads a config listing template/output pairs. Missing outputs are
/// created from their template, asking for every blank variable; existing
/// outputs are checked for variables the template defines but the output
/// lacks, and the missing values are asked for and appended.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML config file listing templates and outputs
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        env = "ENVCONF_CONFIG",
        default_value = DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a config file from a template
    ///
    /// Refuses to overwrite a config that already exists.
    Init,
}
