//! Diff rendering for the terminal

use colored::Colorize;
use reconcile::{Diff, Operation, Variable, VariableKey, VariableSet};
use std::collections::HashMap;

use crate::ui;

/// Print a diff, showing what changes for each updated variable
pub fn display_diff(diff: &Diff, observed: &VariableSet) {
    if diff.is_empty() {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Variables Diff".bold()
    );
    println!("│");

    let previous: HashMap<VariableKey, &Variable> =
        observed.iter().map(|v| (v.identity(), v)).collect();

    for op in Operation::APPLY_ORDER {
        let set = diff.set(op);
        if set.is_empty() {
            continue;
        }
        println!("│ {}", title(op).bold());

        for variable in set {
            let symbol = match op {
                Operation::Create => "+".green(),
                Operation::Update => "~".yellow(),
                Operation::Delete => "-".red(),
            };
            println!(
                "│   {} {} {} {}",
                symbol,
                variable.key,
                format!("[{}]", variable.environment_scope).dimmed(),
                describe(op, variable, previous.get(&variable.identity()).copied()).dimmed()
            );
        }
        println!("│");
    }

    println!("└──────────────────────────────────────────────────────────┘");

    let summary = diff.summary();
    println!();
    println!(
        "  {}: {} to update, {} to create, {} to delete",
        ui::count(summary.total(), "change"),
        summary.updates,
        summary.creates,
        summary.deletes
    );
}

fn title(op: Operation) -> &'static str {
    match op {
        Operation::Update => "Updates",
        Operation::Create => "Creates",
        Operation::Delete => "Deletes",
    }
}

/// One-line description of a pending change
fn describe(op: Operation, variable: &Variable, previous: Option<&Variable>) -> String {
    match (op, previous) {
        (Operation::Update, Some(old)) => changed_fields(old, variable).join(", "),
        (Operation::Delete, _) => format!("(was {})", variable.display_value()),
        _ => format!("= {}", variable.display_value()),
    }
}

/// Fields that differ between two records with the same identity
fn changed_fields(old: &Variable, new: &Variable) -> Vec<String> {
    let mut fields = Vec::new();
    if old.value != new.value {
        fields.push(format!(
            "value: {} → {}",
            old.display_value(),
            new.display_value()
        ));
    }
    if old.variable_type != new.variable_type {
        fields.push(format!(
            "variable_type: {} → {}",
            old.variable_type.as_str(),
            new.variable_type.as_str()
        ));
    }
    if old.protected != new.protected {
        fields.push(format!("protected: {} → {}", old.protected, new.protected));
    }
    if old.masked != new.masked {
        fields.push(format!("masked: {} → {}", old.masked, new.masked));
    }
    fields
}
