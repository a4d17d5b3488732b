//! `diff` - preview what apply would change

use anyhow::Result;
use reconcile::Diff;

use crate::Context;
use crate::display;
use crate::varfile;

pub fn run(ctx: &Context) -> Result<()> {
    let desired = varfile::load(&ctx.settings.import)?;
    let client = super::connect(ctx)?;
    let observed = super::fetch(ctx, &client)?;

    let diff = Diff::compute(&desired, &observed)?;
    display::display_diff(&diff, &observed);
    Ok(())
}
