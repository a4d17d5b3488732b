mod cli;
mod commands;
mod display;
mod dotenv;
mod progress;
mod prompt;
mod settings;
mod ui;
mod varfile;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use settings::Settings;
use std::io;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub settings: Settings,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "civars", &mut io::stdout());
        return Ok(());
    }

    let ctx = Context {
        quiet: cli.quiet,
        settings: Settings::load(&cli)?,
    };
    log::debug!("{:?}", ctx.settings);

    match cli.command {
        Command::Apply(args) => commands::apply::run(&ctx, args),
        Command::Diff => commands::diff::run(&ctx),
        Command::Get => commands::get::run(&ctx),
        Command::Env(args) => commands::env::run(&ctx, args),
        Command::Init(args) => commands::init::run(&ctx, args),
        Command::Completions { .. } => Ok(()),
    }
}

/// Print an error with its causes, plus advice when GitLab was involved
fn report(err: &anyhow::Error) {
    ui::error(&format!("{err:#}"));

    let category = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<gitlab::Error>())
        .map(gitlab::Error::category);
    if let Some(category) = category {
        eprintln!("  {}: {}", category, category.advice());
    }
}
