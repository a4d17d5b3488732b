//! `env` - write one environment's variables as a dotenv file

use anyhow::{Context as _, Result};

use crate::Context;
use crate::cli::EnvArgs;
use crate::dotenv;
use crate::ui;

pub fn run(ctx: &Context, args: EnvArgs) -> Result<()> {
    let client = super::connect(ctx)?;
    let variables = super::fetch(ctx, &client)?;

    let content = dotenv::render(&variables, &args.scope, &args.prefix);
    std::fs::write(&args.output, &content)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    ui::success(&format!(
        "Exported {} for scope '{}' to {}",
        ui::count(content.lines().count(), "variable"),
        args.scope,
        args.output.display()
    ));
    Ok(())
}
