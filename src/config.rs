//! Run configuration.

use crate::error::{BulkCloneError, Result};
use std::path::PathBuf;

/// Upper bound on concurrent clone workers.
pub const MAX_WORKERS: usize = 10;

/// Repositories requested per API page. Also sizes the work queue.
pub const PER_PAGE: u32 = 99;

/// Default GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Which remote URL to hand to `git clone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Protocol {
    #[default]
    Ssh,
    Https,
}

/// Settings for one bulk clone run. Built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub organization: String,
    pub destination: PathBuf,
    pub workers: usize,
    pub token: String,
    pub api_url: String,
    pub protocol: Protocol,
    pub sequential: bool,
}

impl Config {
    /// Create a configuration with defaults for everything but the required inputs.
    pub fn new(
        organization: impl Into<String>,
        destination: impl Into<PathBuf>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            organization: organization.into(),
            destination: destination.into(),
            workers: 1,
            token: token.into(),
            api_url: DEFAULT_API_URL.into(),
            protocol: Protocol::default(),
            sequential: false,
        }
    }

    /// Set the number of concurrent workers.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Point the client at a GitHub Enterprise API.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        while url.ends_with('/') {
            url.pop();
        }
        self.api_url = url;
        self
    }

    /// Choose between SSH and HTTPS clone URLs.
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// List everything first, then clone on the calling thread.
    pub fn sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    /// Check every field before any network or filesystem work happens.
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(BulkCloneError::InvalidConfig(format!(
                "Specify {} environment variable",
                TOKEN_ENV
            )));
        }
        if self.organization.trim().is_empty() {
            return Err(BulkCloneError::InvalidConfig(
                "Organization name is required".into(),
            ));
        }
        if self.destination.as_os_str().is_empty() {
            return Err(BulkCloneError::InvalidConfig(
                "Destination path is required".into(),
            ));
        }
        if self.workers == 0 {
            return Err(BulkCloneError::InvalidConfig(
                "At least one worker is required".into(),
            ));
        }
        if self.workers > MAX_WORKERS {
            return Err(BulkCloneError::InvalidConfig(format!(
                "Limiting the maximum number of workers to {}",
                MAX_WORKERS
            )));
        }
        if self.api_url.is_empty() {
            return Err(BulkCloneError::InvalidConfig("API URL is empty".into()));
        }
        Ok(())
    }

    /// Read the API token from the environment.
    pub fn token_from_env() -> Result<String> {
        match std::env::var(TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(BulkCloneError::InvalidConfig(format!(
                "Specify {} environment variable",
                TOKEN_ENV
            ))),
        }
    }
}
