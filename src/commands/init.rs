//! `init` - write a sample desired-state file

use anyhow::Result;
use dialoguer::Confirm;

use crate::Context;
use crate::cli::InitArgs;
use crate::ui;
use crate::varfile;

pub fn run(ctx: &Context, args: InitArgs) -> Result<()> {
    let path = &ctx.settings.export;

    if path.exists() && !args.force {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite?", path.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            ui::warn("Kept existing file");
            return Ok(());
        }
    }

    varfile::save(path, &varfile::sample())?;
    ui::success(&format!("Wrote sample to {}", path.display()));
    ui::dim("Edit it, then run `civars diff` to preview and `civars apply` to push");
    Ok(())
}
