//! `apply` - make the project's variables match the desired-state file

use anyhow::Result;
use colored::Colorize;
use reconcile::{
    ApplyOutcome, ApplyReport, AutoConfirm, ConfirmCallback, Diff, Operation, execute,
};

use crate::Context;
use crate::cli::ApplyArgs;
use crate::display;
use crate::prompt::{ApplyProgress, TerminalConfirm};
use crate::ui;
use crate::varfile;

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let desired = varfile::load(&ctx.settings.import)?;
    let client = super::connect(ctx)?;
    let observed = super::fetch(ctx, &client)?;

    let diff = Diff::compute(&desired, &observed)?;
    let summary = diff.summary();
    log::info!(
        "{} to update, {} to create, {} to delete",
        summary.updates,
        summary.creates,
        summary.deletes
    );

    let mut confirm: Box<dyn ConfirmCallback> = if args.yes {
        if !ctx.quiet {
            display::display_diff(&diff, &observed);
        }
        Box::new(AutoConfirm)
    } else {
        Box::new(TerminalConfirm::new())
    };
    let mut progress = ApplyProgress::new(ctx.quiet);

    match execute(&diff, &client, &mut *confirm, &mut progress)? {
        ApplyOutcome::NoOp => ui::success("Nothing to update"),
        ApplyOutcome::Cancelled => ui::warn("Canceled"),
        ApplyOutcome::Done(report) => {
            print_summary(&report);
            ui::success("Done.");
        }
        ApplyOutcome::FailedMidApply(report) => {
            print_summary(&report);
            if let Some(failed) = report.failed {
                return Err(reconcile::Error::from(failed).into());
            }
        }
    }
    Ok(())
}

fn print_summary(report: &ApplyReport) {
    println!();
    if report.is_success() {
        println!("  {} All changes applied", "✓".green().bold());
    } else {
        println!("  {} Apply stopped at the first error", "⚠".yellow().bold());
    }
    ui::kv("Updated", &report.count(Operation::Update).to_string());
    ui::kv("Created", &report.count(Operation::Create).to_string());
    ui::kv("Deleted", &report.count(Operation::Delete).to_string());
    if !report.not_attempted.is_empty() {
        ui::kv("Not attempted", &report.not_attempted.len().to_string());
        for change in &report.not_attempted {
            ui::dim(&change.to_string());
        }
    }
    println!();
}
