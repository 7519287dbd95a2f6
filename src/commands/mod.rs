use crate::cli::{Cli, Commands};
use anyhow::Result;

mod init;
mod sync;

pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Init) => init::execute(&cli.config),
        None => sync::execute(&cli.config),
    }
}
