use crate::{config, ui};
use anyhow::Result;
use std::path::Path;

pub fn execute(path: &Path) -> Result<()> {
    config::write_template(path)?;
    ui::success(
        "Created",
        format!("{} from template", ui::display_path(path)),
    );
    Ok(())
}
