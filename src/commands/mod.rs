// Reconciliation
pub mod apply;
pub mod diff;

// Export
pub mod env;
pub mod get;

// Scaffolding
pub mod init;

use anyhow::{Context as _, Result};
use reconcile::VariableSet;

use crate::Context;
use crate::progress;
use crate::ui;

/// Build a GitLab client, failing before any request if settings are incomplete
pub fn connect(ctx: &Context) -> Result<gitlab::Client> {
    let config = ctx.settings.remote()?;
    log::debug!("Connecting with {config:?}");
    Ok(gitlab::Client::new(config)?)
}

/// Fetch every variable of the project behind a spinner
pub fn fetch(ctx: &Context, client: &gitlab::Client) -> Result<VariableSet> {
    let pb = progress::spinner("Fetching variables...", ctx.quiet);
    match client.list_variables() {
        Ok(variables) => {
            let msg = format!("Fetched {}", ui::count(variables.len(), "variable"));
            progress::finish_success(&pb, &msg);
            Ok(variables)
        }
        Err(e) => {
            progress::finish_error(&pb, "Fetch failed");
            Err(e).context("Failed to fetch variables")
        }
    }
}
