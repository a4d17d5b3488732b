//! The remote variable store as consumed by the apply workflow
//!
//! [`Remote`] is the only seam between reconciliation and the network.
//! Use [`MockRemote`] for testing without network access:
//!
//! ```
//! use reconcile::{MockRemote, Remote, Variable};
//!
//! let remote = MockRemote::with_variables(vec![Variable::new("A", "*", "1")]);
//! remote.create(&Variable::new("B", "*", "2")).unwrap();
//!
//! assert_eq!(remote.fetch_all().unwrap().len(), 2);
//! ```

use crate::diff::Operation;
use crate::types::{Variable, VariableKey, VariableSet};
use anyhow::{Result, bail};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A remote store of CI/CD variables
///
/// Every call is a single attempt. Implementations must surface any
/// non-success response as an error whose message is the remote's
/// own diagnostic text.
pub trait Remote {
    /// Fetch every variable, in the order the remote reports them
    fn fetch_all(&self) -> Result<VariableSet>;

    /// Create a variable; the remote rejects an existing composite key
    fn create(&self, variable: &Variable) -> Result<()>;

    /// Replace the variable identified by `(key, environment_scope)`
    fn update(&self, variable: &Variable) -> Result<()>;

    /// Remove the variable identified by `(key, environment_scope)`
    fn delete(&self, variable: &Variable) -> Result<()>;

    /// Dispatch one operation
    fn submit(&self, operation: Operation, variable: &Variable) -> Result<()> {
        match operation {
            Operation::Update => self.update(variable),
            Operation::Create => self.create(variable),
            Operation::Delete => self.delete(variable),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    store: Vec<Variable>,
    calls: Vec<(Operation, VariableKey)>,
    counts: HashMap<Operation, usize>,
    failures: HashMap<Operation, (usize, String)>,
}

/// In-memory remote for tests
///
/// Behaves like a real store (create rejects existing keys, update and
/// delete reject missing ones), records every mutation call, and can be
/// told to fail the n-th call of an operation.
#[derive(Debug, Clone, Default)]
pub struct MockRemote {
    state: Arc<Mutex<MockState>>,
}

impl MockRemote {
    /// Create an empty mock remote
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock remote holding the given variables
    pub fn with_variables(variables: impl IntoIterator<Item = Variable>) -> Self {
        let mock = Self::new();
        mock.state.lock().unwrap().store = variables.into_iter().collect();
        mock
    }

    /// Make the `nth` (1-based) call of `operation` fail with `message`
    pub fn fail_on(&self, operation: Operation, nth: usize, message: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(operation, (nth, message.into()));
    }

    /// Every mutation call received so far, failed ones included
    pub fn calls(&self) -> Vec<(Operation, VariableKey)> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Current contents of the store
    pub fn variables(&self) -> VariableSet {
        self.state.lock().unwrap().store.iter().cloned().collect()
    }

    fn mutate(&self, operation: Operation, variable: &Variable) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let identity = variable.identity();
        state.calls.push((operation, identity.clone()));

        let count = state.counts.entry(operation).or_insert(0);
        *count += 1;
        let count = *count;
        if let Some((nth, message)) = state.failures.get(&operation)
            && *nth == count
        {
            bail!("{message}");
        }

        let position = state.store.iter().position(|v| v.identity() == identity);
        match (operation, position) {
            (Operation::Create, None) => state.store.push(variable.clone()),
            (Operation::Create, Some(_)) => {
                bail!(r#"{{"message":{{"key":["({}) has already been taken"]}}}}"#, identity.key)
            }
            (Operation::Update, Some(i)) => state.store[i] = variable.clone(),
            (Operation::Delete, Some(i)) => {
                state.store.remove(i);
            }
            (_, None) => bail!(r#"{{"message":"404 Variable Not Found"}}"#),
        }
        Ok(())
    }
}

impl Remote for MockRemote {
    fn fetch_all(&self) -> Result<VariableSet> {
        Ok(self.variables())
    }

    fn create(&self, variable: &Variable) -> Result<()> {
        self.mutate(Operation::Create, variable)
    }

    fn update(&self, variable: &Variable) -> Result<()> {
        self.mutate(Operation::Update, variable)
    }

    fn delete(&self, variable: &Variable) -> Result<()> {
        self.mutate(Operation::Delete, variable)
    }
}
