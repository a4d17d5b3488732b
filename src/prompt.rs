//! Terminal implementations of the apply workflow callbacks

use anyhow::Result;
use colored::Colorize;
use console::Term;
use reconcile::{ConfirmCallback, Operation, ProgressCallback, Variable};

/// Asks the operator on the terminal
///
/// On a TTY a single key press decides; otherwise the first character of
/// the next input line does. Only `y` or `Y` confirms.
pub struct TerminalConfirm {
    term: Term,
}

impl TerminalConfirm {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    fn read_answer(&self) -> Result<Option<char>> {
        if self.term.is_term() {
            let c = self.term.read_char()?;
            self.term.write_line(&c.to_string())?;
            Ok(Some(c))
        } else {
            let line = self.term.read_line()?;
            Ok(line.chars().next())
        }
    }
}

impl Default for TerminalConfirm {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmCallback for TerminalConfirm {
    fn confirm(&mut self, rendered: &str) -> Result<bool> {
        self.term.write_line("")?;
        self.term.write_str(rendered)?;
        self.term.write_line("")?;
        self.term
            .write_str(&format!("Apply these changes? {} ", "[y/N]".dimmed()))?;

        let answer = self.read_answer()?;
        log::debug!("Confirmation answer: {answer:?}");
        Ok(answer.is_some_and(is_affirmative))
    }
}

fn is_affirmative(c: char) -> bool {
    c == 'y' || c == 'Y'
}

/// Prints one line per change as the workflow runs
pub struct ApplyProgress {
    total: usize,
    done: usize,
    quiet: bool,
}

impl ApplyProgress {
    pub fn new(quiet: bool) -> Self {
        Self {
            total: 0,
            done: 0,
            quiet,
        }
    }
}

impl ProgressCallback for ApplyProgress {
    fn on_apply_start(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
        if !self.quiet {
            println!();
        }
    }

    fn on_change_start(&mut self, _operation: Operation, _variable: &Variable) {
        self.done += 1;
    }

    fn on_change_complete(&mut self, operation: Operation, variable: &Variable, error: Option<&str>) {
        let counter = format!("[{}/{}]", self.done, self.total).dimmed();
        let target = variable.identity();
        match error {
            None if !self.quiet => {
                println!("  {} {} {} {}", counter, "✓".green(), operation, target);
            }
            None => {}
            Some(err) => {
                eprintln!("  {} {} {} {}", counter, "✗".red(), operation, target);
                eprintln!("      {}", err.red());
            }
        }
    }
}
