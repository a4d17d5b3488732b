//! Core types for CI/CD variable reconciliation

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Scope that applies a variable to every environment
pub const ALL_ENVIRONMENTS: &str = "*";

/// Kind of a variable as interpreted by the remote
///
/// Only [`VariableType::EnvVar`] carries meaning locally (dotenv export).
/// Any kind this crate does not know is kept verbatim in
/// [`VariableType::Other`] so it survives a fetch/apply cycle unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VariableType {
    /// Plain environment variable (`env_var`)
    EnvVar,
    /// File-backed variable (`file`)
    File,
    /// Any other kind reported by the remote
    Other(String),
}

impl VariableType {
    /// Wire name of this kind
    pub fn as_str(&self) -> &str {
        match self {
            Self::EnvVar => "env_var",
            Self::File => "file",
            Self::Other(name) => name,
        }
    }

    /// Check if this is a plain environment variable
    pub fn is_env_var(&self) -> bool {
        matches!(self, Self::EnvVar)
    }
}

impl Default for VariableType {
    fn default() -> Self {
        Self::EnvVar
    }
}

impl From<String> for VariableType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "env_var" => Self::EnvVar,
            "file" => Self::File,
            _ => Self::Other(value),
        }
    }
}

impl From<VariableType> for String {
    fn from(value: VariableType) -> Self {
        match value {
            VariableType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite identity of a variable: its key within an environment scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableKey {
    pub key: String,
    pub environment_scope: String,
}

impl VariableKey {
    pub fn new(key: impl Into<String>, environment_scope: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            environment_scope: environment_scope.into(),
        }
    }
}

impl fmt::Display for VariableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.key, self.environment_scope)
    }
}

/// A single CI/CD variable
///
/// Equality is exact over every field. Two variables with the same
/// [`VariableKey`] but any other difference are considered changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    /// Hidden variables come back from the remote with a null value
    #[serde(deserialize_with = "null_as_empty")]
    pub value: String,
    #[serde(default = "default_scope")]
    pub environment_scope: String,
    #[serde(default)]
    pub variable_type: VariableType,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub masked: bool,
}

fn default_scope() -> String {
    ALL_ENVIRONMENTS.to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Placeholder shown instead of the value of a masked variable
pub const MASKED_VALUE: &str = "[masked]";

impl Variable {
    /// Create a plain, unprotected, unmasked `env_var`
    pub fn new(
        key: impl Into<String>,
        environment_scope: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            environment_scope: environment_scope.into(),
            variable_type: VariableType::EnvVar,
            protected: false,
            masked: false,
        }
    }

    /// Composite identity used to correlate desired and observed records
    pub fn identity(&self) -> VariableKey {
        VariableKey::new(&self.key, &self.environment_scope)
    }

    /// Value safe to print: masked variables show [`MASKED_VALUE`]
    pub fn display_value(&self) -> &str {
        if self.masked { MASKED_VALUE } else { &self.value }
    }

    /// Whether this variable applies to the given environment scope
    pub fn applies_to(&self, scope: &str) -> bool {
        self.environment_scope == scope || self.environment_scope == ALL_ENVIRONMENTS
    }
}

/// Ordered collection of variables
///
/// Order follows the source (file order or page-fetch order) and only
/// matters for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableSet {
    variables: Vec<Variable>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, variable: Variable) {
        self.variables.push(variable);
    }

    pub fn extend(&mut self, variables: impl IntoIterator<Item = Variable>) {
        self.variables.extend(variables);
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variable> {
        self.variables.iter()
    }

    pub fn as_slice(&self) -> &[Variable] {
        &self.variables
    }

    /// Find a variable by its composite identity
    pub fn get(&self, identity: &VariableKey) -> Option<&Variable> {
        self.variables
            .iter()
            .find(|v| v.key == identity.key && v.environment_scope == identity.environment_scope)
    }

    /// First composite key that occurs more than once, if any
    pub fn first_duplicate(&self) -> Option<VariableKey> {
        let mut seen = std::collections::HashSet::with_capacity(self.variables.len());
        self.variables
            .iter()
            .map(Variable::identity)
            .find(|identity| !seen.insert(identity.clone()))
    }
}

impl From<Vec<Variable>> for VariableSet {
    fn from(variables: Vec<Variable>) -> Self {
        Self { variables }
    }
}

impl FromIterator<Variable> for VariableSet {
    fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
        Self {
            variables: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for VariableSet {
    type Item = Variable;
    type IntoIter = std::vec::IntoIter<Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.into_iter()
    }
}

impl<'a> IntoIterator for &'a VariableSet {
    type Item = &'a Variable;
    type IntoIter = std::slice::Iter<'a, Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.iter()
    }
}
