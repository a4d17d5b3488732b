//! `get` - save the project's current variables to a file

use anyhow::Result;

use crate::Context;
use crate::ui;
use crate::varfile;

pub fn run(ctx: &Context) -> Result<()> {
    let client = super::connect(ctx)?;
    let variables = super::fetch(ctx, &client)?;

    let path = &ctx.settings.export;
    varfile::save(path, &variables)?;
    ui::success(&format!(
        "Saved {} to {}",
        ui::count(variables.len(), "variable"),
        path.display()
    ));
    Ok(())
}
