//! Desired-state file loading and saving
//!
//! The file holds a list of variables. The format follows the extension:
//! `.toml` and `.json` are read as such, anything else as YAML.
//!
//! ```yaml
//! - key: K8S_SECRET_DATABASE_URL
//!   value: postgres://db/app
//!   environment_scope: '*'
//!   variable_type: env_var
//! ```
//!
//! TOML has no top-level arrays, so there the list sits under `variables`:
//!
//! ```toml
//! [[variables]]
//! key = "K8S_SECRET_DATABASE_URL"
//! value = "postgres://db/app"
//! ```

use anyhow::{Context, Result};
use reconcile::{ALL_ENVIRONMENTS, SetOrigin, Variable, VariableSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Serialization format of a variables file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => Self::Toml,
            Some("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TomlFile {
    #[serde(default)]
    variables: VariableSet,
}

/// Parse variables from text in the given format
pub fn parse(content: &str, format: Format) -> Result<VariableSet> {
    let set = match format {
        Format::Yaml => {
            // An empty YAML document is null, not an empty list
            if content.trim().is_empty() {
                VariableSet::new()
            } else {
                serde_yaml::from_str(content)?
            }
        }
        Format::Toml => toml::from_str::<TomlFile>(content)?.variables,
        Format::Json => serde_json::from_str(content)?,
    };
    Ok(set)
}

/// Render variables as text in the given format
pub fn render(variables: &VariableSet, format: Format) -> Result<String> {
    let text = match format {
        Format::Yaml => serde_yaml::to_string(variables)?,
        Format::Toml => toml::to_string_pretty(&TomlFile {
            variables: variables.clone(),
        })?,
        Format::Json => {
            let mut json = serde_json::to_string_pretty(variables)?;
            json.push('\n');
            json
        }
    };
    Ok(text)
}

/// Load the desired state from a file
///
/// Rejects files that declare the same key and scope twice.
pub fn load(path: &Path) -> Result<VariableSet> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read variables file: {}", path.display()))?;
    let variables = parse(&content, Format::from_path(path))
        .with_context(|| format!("Failed to parse variables file: {}", path.display()))?;

    if let Some(key) = variables.first_duplicate() {
        return Err(reconcile::Error::DuplicateKey {
            origin: SetOrigin::Desired,
            key,
        })
        .with_context(|| format!("Invalid variables file: {}", path.display()));
    }

    log::debug!(
        "Loaded {} variables from {}",
        variables.len(),
        path.display()
    );
    Ok(variables)
}

/// Save variables to a file, replacing its contents
pub fn save(path: &Path, variables: &VariableSet) -> Result<()> {
    let content = render(variables, Format::from_path(path))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content)
        .with_context(|| format!("Failed to write variables file: {}", path.display()))?;
    log::debug!("Saved {} variables to {}", variables.len(), path.display());
    Ok(())
}

/// Starting point written by `init`
pub fn sample() -> VariableSet {
    VariableSet::from(vec![Variable::new(
        "K8S_SECRET_{YOUR_ENV_NAME}",
        ALL_ENVIRONMENTS,
        "{YOUR_ENV_VALUE}",
    )])
}
