//! Apply workflow - confirms a diff and pushes it to the remote

use crate::context::{ConfirmCallback, ProgressCallback};
use crate::diff::{Diff, Operation};
use crate::remote::Remote;
use crate::types::Variable;
use anyhow::Result;
use std::fmt;

/// One change to the remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub operation: Operation,
    pub variable: Variable,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operation, self.variable.identity())
    }
}

/// A change the remote rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedChange {
    pub change: Change,
    /// The remote's error, verbatim
    pub error: String,
}

impl From<FailedChange> for crate::error::Error {
    fn from(failed: FailedChange) -> Self {
        Self::Remote {
            operation: failed.change.operation,
            key: failed.change.variable.identity(),
            message: failed.error,
        }
    }
}

/// Record of an apply pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Changes the remote accepted, in the order they were sent
    pub applied: Vec<Change>,
    /// The change that stopped the pass, if any
    pub failed: Option<FailedChange>,
    /// Changes never sent because the pass stopped first
    pub not_attempted: Vec<Change>,
}

impl ApplyReport {
    /// Check if every change was applied
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }

    /// Number of applied changes of one kind
    pub fn count(&self, operation: Operation) -> usize {
        self.applied
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }
}

/// Final state of the apply workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The diff was empty; nothing was asked or sent
    NoOp,
    /// The operator declined; nothing was sent
    Cancelled,
    /// Every change was applied
    Done(ApplyReport),
    /// A change failed; earlier changes stay applied
    FailedMidApply(ApplyReport),
}

impl ApplyOutcome {
    /// Whether the workflow terminated successfully
    ///
    /// A no-op and a cancellation are both successful outcomes.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::FailedMidApply(_))
    }

    pub fn report(&self) -> Option<&ApplyReport> {
        match self {
            Self::Done(report) | Self::FailedMidApply(report) => Some(report),
            Self::NoOp | Self::Cancelled => None,
        }
    }
}

/// Run the apply workflow for a computed diff
///
/// An empty diff returns [`ApplyOutcome::NoOp`] without prompting. Otherwise
/// the rendered diff is passed to `confirm` exactly once; anything but an
/// affirmative answer returns [`ApplyOutcome::Cancelled`]. Confirmed changes
/// are sent one at a time as updates, then creates, then deletes. The first
/// rejected change stops the pass; nothing already applied is undone.
///
/// # Errors
///
/// Only an error from the confirmation callback itself is returned as `Err`.
/// Remote failures are reported through [`ApplyOutcome::FailedMidApply`].
pub fn execute<R, C, P>(
    diff: &Diff,
    remote: &R,
    confirm: &mut C,
    progress: &mut P,
) -> Result<ApplyOutcome>
where
    R: Remote + ?Sized,
    C: ConfirmCallback + ?Sized,
    P: ProgressCallback + ?Sized,
{
    if diff.is_empty() {
        log::info!("Remote already matches desired state");
        return Ok(ApplyOutcome::NoOp);
    }

    if !confirm.confirm(&diff.to_string())? {
        log::info!("Apply cancelled by operator");
        return Ok(ApplyOutcome::Cancelled);
    }

    let changes: Vec<Change> = diff
        .changes()
        .map(|(operation, variable)| Change {
            operation,
            variable: variable.clone(),
        })
        .collect();

    progress.on_apply_start(changes.len());

    let mut report = ApplyReport::default();
    let mut pending = changes.into_iter();

    while let Some(change) = pending.next() {
        progress.on_change_start(change.operation, &change.variable);
        log::debug!("Applying {change}");

        match remote.submit(change.operation, &change.variable) {
            Ok(()) => {
                progress.on_change_complete(change.operation, &change.variable, None);
                report.applied.push(change);
            }
            Err(e) => {
                let error = e.to_string();
                log::debug!("{change} failed: {error}");
                progress.on_change_complete(change.operation, &change.variable, Some(&error));
                report.failed = Some(FailedChange { change, error });
                report.not_attempted = pending.collect();
                return Ok(ApplyOutcome::FailedMidApply(report));
            }
        }
    }

    Ok(ApplyOutcome::Done(report))
}

/// Execute without confirmation or progress reporting
///
/// For automation where the diff has already been reviewed.
pub fn execute_simple<R: Remote + ?Sized>(diff: &Diff, remote: &R) -> Result<ApplyOutcome> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(diff, remote, &mut AutoConfirm, &mut NoProgress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AutoConfirm, AutoDecline, NoProgress};
    use crate::remote::MockRemote;
    use crate::types::{VariableKey, VariableSet, VariableType};

    fn var(key: &str, scope: &str, value: &str) -> Variable {
        Variable::new(key, scope, value)
    }

    /// Confirm callback that records what it was shown
    struct Recorder {
        answer: bool,
        shown: Vec<String>,
    }

    impl ConfirmCallback for Recorder {
        fn confirm(&mut self, rendered: &str) -> Result<bool> {
            self.shown.push(rendered.to_string());
            Ok(self.answer)
        }
    }

    /// Progress callback that records events
    #[derive(Default)]
    struct Events(Vec<String>);

    impl ProgressCallback for Events {
        fn on_apply_start(&mut self, total: usize) {
            self.0.push(format!("start {total}"));
        }

        fn on_change_start(&mut self, operation: Operation, variable: &Variable) {
            self.0.push(format!("begin {operation} {}", variable.key));
        }

        fn on_change_complete(
            &mut self,
            operation: Operation,
            variable: &Variable,
            error: Option<&str>,
        ) {
            let status = if error.is_some() { "failed" } else { "ok" };
            self.0.push(format!("{status} {operation} {}", variable.key));
        }
    }

    #[test]
    fn test_identical_state_is_noop_without_prompt() {
        let set = VariableSet::from(vec![var("C", "*", "1")]);
        let remote = MockRemote::with_variables(set.clone());
        let diff = Diff::compute(&set, &remote.fetch_all().unwrap()).unwrap();

        let mut confirm = Recorder {
            answer: true,
            shown: Vec::new(),
        };
        let outcome = execute(&diff, &remote, &mut confirm, &mut NoProgress).unwrap();

        assert_eq!(outcome, ApplyOutcome::NoOp);
        assert!(outcome.is_success());
        assert!(confirm.shown.is_empty());
        assert!(remote.calls().is_empty());
    }

    #[test]
    fn test_declined_confirmation_sends_nothing() {
        let remote = MockRemote::with_variables(vec![var("OLD", "*", "1")]);
        let desired = VariableSet::from(vec![var("NEW", "*", "1")]);
        let diff = Diff::compute(&desired, &remote.fetch_all().unwrap()).unwrap();

        let outcome = execute(&diff, &remote, &mut AutoDecline, &mut NoProgress).unwrap();

        assert_eq!(outcome, ApplyOutcome::Cancelled);
        assert!(outcome.is_success());
        assert!(outcome.report().is_none());
        assert!(remote.calls().is_empty());
    }

    #[test]
    fn test_confirmation_sees_rendered_diff_once() {
        let remote = MockRemote::new();
        let desired = VariableSet::from(vec![var("A", "*", "1")]);
        let diff = Diff::compute(&desired, &VariableSet::new()).unwrap();

        let mut confirm = Recorder {
            answer: true,
            shown: Vec::new(),
        };
        execute(&diff, &remote, &mut confirm, &mut NoProgress).unwrap();

        assert_eq!(confirm.shown, vec!["Creates:\n  A * -> 1\n".to_string()]);
    }

    #[test]
    fn test_applies_updates_then_creates_then_deletes() {
        let remote = MockRemote::with_variables(vec![var("GONE", "*", "1"), var("KEEP", "*", "1")]);
        let desired = VariableSet::from(vec![var("NEW", "qa", "1"), var("KEEP", "*", "2")]);
        let diff = Diff::compute(&desired, &remote.fetch_all().unwrap()).unwrap();

        let mut events = Events::default();
        let outcome = execute(&diff, &remote, &mut AutoConfirm, &mut events).unwrap();

        assert_eq!(
            remote.calls(),
            vec![
                (Operation::Update, VariableKey::new("KEEP", "*")),
                (Operation::Create, VariableKey::new("NEW", "qa")),
                (Operation::Delete, VariableKey::new("GONE", "*")),
            ]
        );
        let ApplyOutcome::Done(report) = outcome else {
            panic!("expected Done, got {outcome:?}");
        };
        assert_eq!(report.applied.len(), 3);
        assert_eq!(report.count(Operation::Update), 1);
        assert!(report.not_attempted.is_empty());
        assert_eq!(
            events.0,
            vec![
                "start 3",
                "begin update KEEP",
                "ok update KEEP",
                "begin create NEW",
                "ok create NEW",
                "begin delete GONE",
                "ok delete GONE",
            ]
        );
    }

    #[test]
    fn test_stops_at_first_failure() {
        let remote = MockRemote::new();
        remote.fail_on(Operation::Create, 2, r#"{"message":"invalid scope"}"#);
        let desired = VariableSet::from(vec![
            var("FIRST", "*", "1"),
            var("SECOND", "*", "2"),
            var("THIRD", "*", "3"),
        ]);
        let diff = Diff::compute(&desired, &VariableSet::new()).unwrap();

        let outcome = execute(&diff, &remote, &mut AutoConfirm, &mut NoProgress).unwrap();

        assert!(!outcome.is_success());
        assert_eq!(
            remote.calls(),
            vec![
                (Operation::Create, VariableKey::new("FIRST", "*")),
                (Operation::Create, VariableKey::new("SECOND", "*")),
            ]
        );

        let ApplyOutcome::FailedMidApply(report) = outcome else {
            panic!("expected FailedMidApply, got {outcome:?}");
        };
        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.applied[0].variable.key, "FIRST");
        let failed = report.failed.as_ref().unwrap();
        assert_eq!(failed.change.variable.key, "SECOND");
        assert_eq!(failed.error, r#"{"message":"invalid scope"}"#);
        assert_eq!(report.not_attempted.len(), 1);
        assert_eq!(report.not_attempted[0].variable.key, "THIRD");

        // Applied changes are not rolled back
        assert_eq!(remote.variables().len(), 1);
    }

    #[test]
    fn test_failed_update_skips_creates_and_deletes() {
        let remote = MockRemote::with_variables(vec![var("A", "*", "1"), var("B", "*", "1")]);
        remote.fail_on(Operation::Update, 1, "forbidden");
        let desired = VariableSet::from(vec![var("A", "*", "2"), var("C", "*", "1")]);
        let diff = Diff::compute(&desired, &remote.fetch_all().unwrap()).unwrap();

        let outcome = execute_simple(&diff, &remote).unwrap();

        let report = outcome.report().unwrap();
        assert!(report.applied.is_empty());
        assert_eq!(
            report
                .not_attempted
                .iter()
                .map(|c| c.operation)
                .collect::<Vec<_>>(),
            vec![Operation::Create, Operation::Delete]
        );
        assert_eq!(remote.calls().len(), 1);

        let err = crate::error::Error::from(report.failed.clone().unwrap());
        assert!(err.to_string().starts_with("failed to update A (*): "));
        assert!(err.to_string().contains("forbidden"));
    }

    #[test]
    fn test_apply_converges() {
        let mut file_var = var("CERT", "prod", "---");
        file_var.variable_type = VariableType::File;
        file_var.protected = true;

        let remote = MockRemote::with_variables(vec![
            var("A", "*", "1"),
            var("B", "prod", "1"),
            var("CERT", "prod", "old"),
        ]);
        let desired = VariableSet::from(vec![
            var("A", "*", "1"),
            var("B", "qa", "1"),
            file_var,
            var("D", "*", "4"),
        ]);

        let diff = Diff::compute(&desired, &remote.fetch_all().unwrap()).unwrap();
        assert!(!diff.is_empty());
        assert!(execute_simple(&diff, &remote).unwrap().is_success());

        let again = Diff::compute(&desired, &remote.fetch_all().unwrap()).unwrap();
        assert!(again.is_empty(), "second pass should be empty: {again:?}");
    }

    #[test]
    fn test_rerun_after_partial_failure_catches_up() {
        let remote = MockRemote::new();
        remote.fail_on(Operation::Create, 2, "rate limited");
        let desired = VariableSet::from(vec![var("A", "*", "1"), var("B", "*", "2")]);

        let first = Diff::compute(&desired, &remote.fetch_all().unwrap()).unwrap();
        assert!(!execute_simple(&first, &remote).unwrap().is_success());

        let second = Diff::compute(&desired, &remote.fetch_all().unwrap()).unwrap();
        assert_eq!(second.summary().total(), 1);
        assert!(execute_simple(&second, &remote).unwrap().is_success());
        assert_eq!(remote.variables(), desired);
    }
}
