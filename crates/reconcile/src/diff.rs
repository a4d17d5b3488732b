//! Diff computation between desired and observed variables

use crate::error::{Error, Result, SetOrigin};
use crate::types::{Variable, VariableKey, VariableSet};
use std::collections::HashMap;
use std::fmt;

/// Kind of remote mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Update,
    Create,
    Delete,
}

impl Operation {
    /// Order in which operations are applied
    pub const APPLY_ORDER: [Operation; 3] = [Self::Update, Self::Create, Self::Delete];

    pub fn verb(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Create => "create",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// The change set that moves observed state to desired state
///
/// The three sets are pairwise disjoint by composite key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    /// Desired records whose observed counterpart differs
    pub to_update: VariableSet,
    /// Desired records with no observed counterpart
    pub to_create: VariableSet,
    /// Observed records with no desired counterpart
    pub to_delete: VariableSet,
}

impl Diff {
    /// Compute the diff between a desired and an observed set
    ///
    /// Records are correlated by [`VariableKey`]. A matched pair that is
    /// not equal on every field yields the desired record in `to_update`.
    /// Observed records left unmatched are deleted, in observed order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if either set repeats a composite key.
    pub fn compute(desired: &VariableSet, observed: &VariableSet) -> Result<Self> {
        ensure_unique(desired, SetOrigin::Desired)?;
        ensure_unique(observed, SetOrigin::Observed)?;

        let mut index: HashMap<VariableKey, usize> = observed
            .iter()
            .enumerate()
            .map(|(position, v)| (v.identity(), position))
            .collect();
        let mut matched = vec![false; observed.len()];
        let observed = observed.as_slice();

        let mut diff = Self::default();
        for wanted in desired {
            match index.remove(&wanted.identity()) {
                None => diff.to_create.push(wanted.clone()),
                Some(position) => {
                    matched[position] = true;
                    if observed[position] != *wanted {
                        diff.to_update.push(wanted.clone());
                    }
                }
            }
        }

        diff.to_delete = observed
            .iter()
            .zip(matched)
            .filter(|(_, was_matched)| !was_matched)
            .map(|(v, _)| v.clone())
            .collect();

        log::debug!(
            "Diff: {} to update, {} to create, {} to delete",
            diff.to_update.len(),
            diff.to_create.len(),
            diff.to_delete.len()
        );

        Ok(diff)
    }

    /// Variables for one operation
    pub fn set(&self, operation: Operation) -> &VariableSet {
        match operation {
            Operation::Update => &self.to_update,
            Operation::Create => &self.to_create,
            Operation::Delete => &self.to_delete,
        }
    }

    /// Every pending change in apply order
    pub fn changes(&self) -> impl Iterator<Item = (Operation, &Variable)> {
        Operation::APPLY_ORDER
            .into_iter()
            .flat_map(move |op| self.set(op).iter().map(move |v| (op, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.to_update.is_empty() && self.to_create.is_empty() && self.to_delete.is_empty()
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            updates: self.to_update.len(),
            creates: self.to_create.len(),
            deletes: self.to_delete.len(),
        }
    }
}

/// Plain-text rendering used for the confirmation gate
///
/// One section per non-empty operation, one `KEY SCOPE -> VALUE` line per
/// variable.
impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (title, set) in [
            ("Updates:", &self.to_update),
            ("Creates:", &self.to_create),
            ("Deletes:", &self.to_delete),
        ] {
            if set.is_empty() {
                continue;
            }
            writeln!(f, "{title}")?;
            for v in set {
                writeln!(f, "  {} {} -> {}", v.key, v.environment_scope, v.display_value())?;
            }
        }
        Ok(())
    }
}

fn ensure_unique(set: &VariableSet, origin: SetOrigin) -> Result<()> {
    match set.first_duplicate() {
        Some(key) => Err(Error::DuplicateKey { origin, key }),
        None => Ok(()),
    }
}

/// Diff summary statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub updates: usize,
    pub creates: usize,
    pub deletes: usize,
}

impl DiffSummary {
    /// Total number of changes
    pub fn total(&self) -> usize {
        self.updates + self.creates + self.deletes
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VariableType;
    use std::collections::HashSet;

    fn var(key: &str, scope: &str, value: &str) -> Variable {
        Variable::new(key, scope, value)
    }

    fn keys(set: &VariableSet) -> Vec<VariableKey> {
        set.iter().map(Variable::identity).collect()
    }

    /// Assorted desired/observed pairs covering every branch
    fn fixtures() -> Vec<(VariableSet, VariableSet)> {
        let mut protected = var("P", "*", "1");
        protected.protected = true;
        vec![
            (VariableSet::new(), VariableSet::new()),
            (vec![var("A", "*", "1")].into(), VariableSet::new()),
            (VariableSet::new(), vec![var("B", "prod", "1")].into()),
            (
                vec![var("A", "*", "1"), var("B", "*", "2"), protected.clone()].into(),
                vec![var("A", "*", "1"), var("B", "*", "3"), var("C", "qa", "4")].into(),
            ),
            (
                vec![var("A", "qa", "1"), var("A", "prod", "1")].into(),
                vec![var("A", "prod", "2"), var("A", "*", "1"), var("P", "*", "1")].into(),
            ),
        ]
    }

    #[test]
    fn test_scenario_create_into_empty_remote() {
        let desired = VariableSet::from(vec![var("A", "*", "1")]);
        let diff = Diff::compute(&desired, &VariableSet::new()).unwrap();

        assert_eq!(diff.to_create, desired);
        assert!(diff.to_update.is_empty());
        assert!(diff.to_delete.is_empty());
    }

    #[test]
    fn test_scenario_update_uses_desired_record() {
        let desired = VariableSet::from(vec![var("A", "*", "2")]);
        let observed = VariableSet::from(vec![var("A", "*", "1")]);
        let diff = Diff::compute(&desired, &observed).unwrap();

        assert_eq!(diff.to_update.as_slice(), &[var("A", "*", "2")]);
        assert!(diff.to_create.is_empty());
        assert!(diff.to_delete.is_empty());
    }

    #[test]
    fn test_scenario_delete_unmatched_observed() {
        let observed = VariableSet::from(vec![var("B", "prod", "x")]);
        let diff = Diff::compute(&VariableSet::new(), &observed).unwrap();

        assert_eq!(diff.to_delete, observed);
        assert!(diff.to_update.is_empty());
        assert!(diff.to_create.is_empty());
    }

    #[test]
    fn test_scenario_identical_sets_are_empty() {
        let set = VariableSet::from(vec![var("C", "*", "same")]);
        let diff = Diff::compute(&set, &set.clone()).unwrap();
        assert!(diff.is_empty());
        assert!(!diff.summary().has_changes());
    }

    #[test]
    fn test_idempotence() {
        for (desired, _) in fixtures() {
            let diff = Diff::compute(&desired, &desired).unwrap();
            assert!(diff.is_empty(), "self-diff not empty for {desired:?}");
        }
    }

    #[test]
    fn test_disjointness_and_completeness() {
        for (desired, observed) in fixtures() {
            let diff = Diff::compute(&desired, &observed).unwrap();

            let update: HashSet<_> = keys(&diff.to_update).into_iter().collect();
            let create: HashSet<_> = keys(&diff.to_create).into_iter().collect();
            let delete: HashSet<_> = keys(&diff.to_delete).into_iter().collect();
            assert!(update.is_disjoint(&create));
            assert!(update.is_disjoint(&delete));
            assert!(create.is_disjoint(&delete));

            for wanted in &desired {
                let id = wanted.identity();
                let unchanged = observed.get(&id) == Some(wanted);
                let hits = [unchanged, create.contains(&id), update.contains(&id)]
                    .iter()
                    .filter(|hit| **hit)
                    .count();
                assert_eq!(hits, 1, "{id} must land in exactly one bucket");
            }

            for seen in &observed {
                let id = seen.identity();
                let in_desired = desired.get(&id).is_some();
                assert_eq!(delete.contains(&id), !in_desired, "{id}");
            }
        }
    }

    #[test]
    fn test_every_field_is_compared() {
        let base = var("A", "*", "1");
        let mutations: [fn(&mut Variable); 4] = [
            |v: &mut Variable| v.value = "2".to_string(),
            |v: &mut Variable| v.variable_type = VariableType::File,
            |v: &mut Variable| v.protected = true,
            |v: &mut Variable| v.masked = true,
        ];

        for mutate in mutations {
            let mut changed = base.clone();
            mutate(&mut changed);
            let diff = Diff::compute(
                &VariableSet::from(vec![changed.clone()]),
                &VariableSet::from(vec![base.clone()]),
            )
            .unwrap();
            assert_eq!(diff.to_update.as_slice(), &[changed]);
            assert!(diff.to_create.is_empty());
            assert!(diff.to_delete.is_empty());
        }
    }

    #[test]
    fn test_identity_change_is_create_plus_delete() {
        let observed = VariableSet::from(vec![var("A", "*", "1")]);

        let renamed = Diff::compute(&vec![var("B", "*", "1")].into(), &observed).unwrap();
        assert_eq!(keys(&renamed.to_create), vec![VariableKey::new("B", "*")]);
        assert_eq!(keys(&renamed.to_delete), vec![VariableKey::new("A", "*")]);

        let rescoped = Diff::compute(&vec![var("A", "prod", "1")].into(), &observed).unwrap();
        assert_eq!(keys(&rescoped.to_create), vec![VariableKey::new("A", "prod")]);
        assert_eq!(keys(&rescoped.to_delete), vec![VariableKey::new("A", "*")]);
    }

    #[test]
    fn test_delete_keeps_observed_order() {
        let observed = VariableSet::from(vec![
            var("Z", "*", "1"),
            var("A", "*", "1"),
            var("M", "*", "1"),
        ]);
        let diff = Diff::compute(&VariableSet::new(), &observed).unwrap();
        assert_eq!(diff.to_delete, observed);
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let dup = VariableSet::from(vec![var("A", "*", "1"), var("A", "*", "2")]);

        let err = Diff::compute(&dup, &VariableSet::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateKey {
                origin: SetOrigin::Desired,
                ..
            }
        ));

        let err = Diff::compute(&VariableSet::new(), &dup).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateKey {
                origin: SetOrigin::Observed,
                ..
            }
        ));
        assert_eq!(err.to_string(), "duplicate variable A (*) in observed state");
    }

    #[test]
    fn test_changes_follow_apply_order() {
        let desired = VariableSet::from(vec![var("NEW", "*", "1"), var("OLD", "*", "2")]);
        let observed = VariableSet::from(vec![var("OLD", "*", "1"), var("GONE", "*", "1")]);
        let diff = Diff::compute(&desired, &observed).unwrap();

        let ops: Vec<_> = diff.changes().map(|(op, v)| (op, v.key.as_str())).collect();
        assert_eq!(
            ops,
            vec![
                (Operation::Update, "OLD"),
                (Operation::Create, "NEW"),
                (Operation::Delete, "GONE"),
            ]
        );
    }

    #[test]
    fn test_display_lists_key_scope_and_value() {
        let desired = VariableSet::from(vec![var("A", "*", "2"), var("B", "qa", "x")]);
        let observed = VariableSet::from(vec![var("A", "*", "1")]);
        let rendered = Diff::compute(&desired, &observed).unwrap().to_string();

        assert_eq!(rendered, "Updates:\n  A * -> 2\nCreates:\n  B qa -> x\n");
    }

    #[test]
    fn test_display_hides_masked_values() {
        let mut secret = var("TOKEN", "*", "s3cret");
        secret.masked = true;
        let rendered = Diff::compute(&VariableSet::from(vec![secret]), &VariableSet::new())
            .unwrap()
            .to_string();

        assert_eq!(rendered, "Creates:\n  TOKEN * -> [masked]\n");
    }
}
