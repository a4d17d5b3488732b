//! Project variables client.
//!
//! [`Client`] talks to `/projects/:id/variables` on a GitLab v4 API and
//! implements [`reconcile::Remote`] so the apply workflow can drive it.
//!
//! Every call is a single blocking attempt. A non-success status is
//! turned into [`Error::Http`] carrying the response body exactly as the
//! server sent it, because that body is where GitLab explains what it
//! rejected.

use crate::error::{Error, Result};
use reconcile::{Variable, VariableSet};
use std::time::Duration;
use ureq::Body;
use ureq::http::Response;

/// Public GitLab API root.
pub const DEFAULT_API_URL: &str = "https://gitlab.com/api/v4";

/// Default timeout for a whole request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Records requested per page; GitLab caps this at 100.
const PER_PAGE: u32 = 100;

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";
const USER_AGENT: &str = concat!("civars/", env!("CARGO_PKG_VERSION"));
const SCOPE_FILTER: &str = "filter[environment_scope]";

/// Connection settings for a [`Client`].
#[derive(Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://gitlab.example.com/api/v4`.
    pub api_url: String,
    /// Numeric project ID or full project path (`group/project`).
    pub project_id: String,
    /// Personal, project or group access token with `api` scope.
    pub token: String,
    /// Upper bound for a single request.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Settings for gitlab.com with the default timeout.
    pub fn new(project_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            project_id: project_id.into(),
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point at another GitLab instance.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check that every field needed for a request is present.
    pub fn validate(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            return Err(Error::InvalidConfig("project ID is required".to_string()));
        }
        if self.token.trim().is_empty() {
            return Err(Error::InvalidConfig("token is required".to_string()));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "API URL must start with http:// or https://: {}",
                self.api_url
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("project_id", &self.project_id)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Blocking client for one project's CI/CD variables.
///
/// # Example
///
/// ```no_run
/// use gitlab::{Client, ClientConfig};
///
/// let client = Client::new(ClientConfig::new("42", "glpat-xxxx")).unwrap();
/// let variables = client.list_variables().unwrap();
/// println!("Found {} variables", variables.len());
/// ```
pub struct Client {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    config: ClientConfig,
}

impl Client {
    /// Create a client after validating its settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .build()
            .into();
        Ok(Self { agent, config })
    }

    /// Get the settings this client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the URL of the variables collection.
    fn variables_url(&self) -> String {
        format!(
            "{}/projects/{}/variables",
            self.config.api_url.trim_end_matches('/'),
            urlencoding::encode(&self.config.project_id)
        )
    }

    /// Build the URL of a single variable.
    fn variable_url(&self, key: &str) -> String {
        format!("{}/{}", self.variables_url(), urlencoding::encode(key))
    }

    /// Fetch one page of variables (1-based).
    pub fn fetch_page(&self, page: u32) -> Result<Vec<Variable>> {
        log::debug!("GET variables page {page}");
        let response = self
            .agent
            .get(&self.variables_url())
            .header(TOKEN_HEADER, self.config.token.as_str())
            .header("User-Agent", USER_AGENT)
            .query("page", page.to_string())
            .query("per_page", PER_PAGE.to_string())
            .call()?;

        let body = read_body(response)?;
        let variables: Vec<Variable> = serde_json::from_str(&body)?;
        log::debug!("Page {page}: {} variables", variables.len());
        Ok(variables)
    }

    /// Fetch every variable, page by page, until an empty page.
    pub fn list_variables(&self) -> Result<VariableSet> {
        collect_pages(|page| self.fetch_page(page))
    }

    /// Create a variable.
    pub fn create_variable(&self, variable: &Variable) -> Result<()> {
        log::debug!("POST variable {}", variable.identity());
        let response = self
            .agent
            .post(&self.variables_url())
            .header(TOKEN_HEADER, self.config.token.as_str())
            .header("User-Agent", USER_AGENT)
            .send_json(variable)?;
        read_body(response).map(drop)
    }

    /// Replace the variable with the same key and environment scope.
    pub fn update_variable(&self, variable: &Variable) -> Result<()> {
        log::debug!("PUT variable {}", variable.identity());
        let response = self
            .agent
            .put(&self.variable_url(&variable.key))
            .header(TOKEN_HEADER, self.config.token.as_str())
            .header("User-Agent", USER_AGENT)
            .query(SCOPE_FILTER, &variable.environment_scope)
            .send_json(variable)?;
        read_body(response).map(drop)
    }

    /// Delete the variable with the same key and environment scope.
    pub fn delete_variable(&self, variable: &Variable) -> Result<()> {
        log::debug!("DELETE variable {}", variable.identity());
        let response = self
            .agent
            .delete(&self.variable_url(&variable.key))
            .header(TOKEN_HEADER, self.config.token.as_str())
            .header("User-Agent", USER_AGENT)
            .query(SCOPE_FILTER, &variable.environment_scope)
            .call()?;
        read_body(response).map(drop)
    }
}

impl reconcile::Remote for Client {
    fn fetch_all(&self) -> anyhow::Result<VariableSet> {
        Ok(self.list_variables()?)
    }

    fn create(&self, variable: &Variable) -> anyhow::Result<()> {
        Ok(self.create_variable(variable)?)
    }

    fn update(&self, variable: &Variable) -> anyhow::Result<()> {
        Ok(self.update_variable(variable)?)
    }

    fn delete(&self, variable: &Variable) -> anyhow::Result<()> {
        Ok(self.delete_variable(variable)?)
    }
}

/// Concatenate pages starting at 1 until one comes back empty.
///
/// The first error aborts the whole listing.
pub fn collect_pages<F>(mut fetch_page: F) -> Result<VariableSet>
where
    F: FnMut(u32) -> Result<Vec<Variable>>,
{
    let mut all = VariableSet::new();
    let mut page = 1;
    loop {
        let batch = fetch_page(page)?;
        if batch.is_empty() {
            return Ok(all);
        }
        all.extend(batch);
        page += 1;
    }
}

/// Read the body, turning a non-success status into [`Error::Http`].
fn read_body(mut response: Response<Body>) -> Result<String> {
    let status = response.status();
    let body = response.body_mut().read_to_string()?;
    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}
