//! # gitlab
//!
//! Blocking client for the GitLab project CI/CD variables API.
//!
//! The [`Client`] lists, creates, updates and deletes variables of one
//! project and plugs into the reconcile workflow through
//! [`reconcile::Remote`].
//!
//! ```no_run
//! use gitlab::{Client, ClientConfig};
//!
//! let config = ClientConfig::new("group/app", "glpat-xxxx")
//!     .with_api_url("https://gitlab.example.com/api/v4");
//! let client = Client::new(config)?;
//!
//! for variable in &client.list_variables()? {
//!     println!("{} ({})", variable.key, variable.environment_scope);
//! }
//! # Ok::<(), gitlab::Error>(())
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod error;

pub use client::{Client, ClientConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT, collect_pages};
pub use error::{Error, ErrorCategory, Result};
