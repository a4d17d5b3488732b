//! # Reconcile
//!
//! Declarative management of CI/CD variables.
//!
//! This crate computes the minimal set of changes that makes a remote
//! variable store match a declared set, and applies them behind an explicit
//! confirmation gate.
//!
//! ## Core Concepts
//!
//! - **Variable**: A value bound to a key within an environment scope
//! - **VariableKey**: The `(key, environment_scope)` identity of a variable
//! - **Diff**: Disjoint sets of variables to update, create and delete
//! - **Remote**: The store being reconciled (see [`Remote`])
//! - **ApplyOutcome**: What happened when a diff was applied
//!
//! ## Example
//!
//! ```
//! use reconcile::{
//!     execute, ApplyOutcome, AutoConfirm, Diff, MockRemote, NoProgress, Remote, Variable,
//!     VariableSet,
//! };
//!
//! let remote = MockRemote::with_variables(vec![Variable::new("OLD", "*", "1")]);
//! let desired = VariableSet::from(vec![Variable::new("NEW", "*", "2")]);
//!
//! let diff = Diff::compute(&desired, &remote.fetch_all()?)?;
//! assert_eq!(diff.summary().total(), 2);
//!
//! let outcome = execute(&diff, &remote, &mut AutoConfirm, &mut NoProgress)?;
//! assert!(matches!(outcome, ApplyOutcome::Done(_)));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Provider Traits
//!
//! The crate uses traits for dependency injection:
//!
//! - [`Remote`]: The variable store
//! - [`ConfirmCallback`]: Handles operator confirmation
//! - [`ProgressCallback`]: Receives progress updates
//!
//! This allows the crate to be used without hard dependencies on
//! a specific HTTP client or terminal.

pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod remote;
pub mod types;

// Re-export main types at crate root
pub use context::{AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use diff::{Diff, DiffSummary, Operation};
pub use error::{Error, Result, SetOrigin};
pub use executor::{ApplyOutcome, ApplyReport, Change, FailedChange, execute, execute_simple};
pub use remote::{MockRemote, Remote};
pub use types::{ALL_ENVIRONMENTS, MASKED_VALUE, Variable, VariableKey, VariableSet, VariableType};
