//! Provider traits for the apply workflow
//!
//! These traits keep the workflow free of any terminal, prompt or
//! output implementation so it can run unattended in tests and CI.

use crate::diff::Operation;
use crate::types::Variable;
use anyhow::Result;

/// Progress callback for apply operations
///
/// Implement this trait to receive progress updates while changes are
/// pushed to the remote.
pub trait ProgressCallback {
    /// Called once before the first change, with the number of changes
    fn on_apply_start(&mut self, total: usize);

    /// Called before a single change is sent
    fn on_change_start(&mut self, operation: Operation, variable: &Variable);

    /// Called after a single change, with the remote's error if it failed
    fn on_change_complete(&mut self, operation: Operation, variable: &Variable, error: Option<&str>);
}

/// Confirmation callback for the apply gate
pub trait ConfirmCallback {
    /// Ask the operator to confirm the pending changes
    ///
    /// # Arguments
    /// * `rendered` - Human-readable listing of every pending change
    ///
    /// # Returns
    /// `true` only on an explicit affirmative answer
    fn confirm(&mut self, rendered: &str) -> Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_apply_start(&mut self, _total: usize) {}
    fn on_change_start(&mut self, _operation: Operation, _variable: &Variable) {}
    fn on_change_complete(
        &mut self,
        _operation: Operation,
        _variable: &Variable,
        _error: Option<&str>,
    ) {
    }
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _rendered: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _rendered: &str) -> Result<bool> {
        Ok(false)
    }
}
