use crate::{prompt, sync, ui, Config};
use anyhow::Result;
use std::path::Path;

pub fn execute(path: &Path) -> Result<()> {
    let config = Config::load(path)?;
    if config.entries().is_empty() {
        ui::info(format!(
            "{} lists no files to sync",
            ui::display_path(config.path())
        ));
        return Ok(());
    }

    let mut prompter = prompt::stdio();
    let summary = sync::sync_all(&config, &mut prompter)?;

    ui::success(
        "Finished",
        format!(
            "{} created, {} updated, {} already synced ({} variable(s) filled)",
            summary.created, summary.updated, summary.synced, summary.filled
        ),
    );
    Ok(())
}
