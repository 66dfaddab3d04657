//! GitHub repository listing.

use crate::config::Protocol;
use crate::error::{BulkCloneError, Result};
use crate::github::GitHubClient;
use crate::github::client::page_number;
use serde::Deserialize;

/// Repository information from the GitHub API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    pub clone_url: String,
    pub ssh_url: String,
}

impl GitHubRepo {
    /// Reduce to what a clone needs, picking the URL for `protocol`.
    pub fn descriptor(&self, protocol: Protocol) -> RepoDescriptor {
        let url = match protocol {
            Protocol::Ssh => &self.ssh_url,
            Protocol::Https => &self.clone_url,
        };
        RepoDescriptor::new(&self.name, url)
    }
}

/// The minimum needed to clone one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoDescriptor {
    pub name: String,
    pub clone_url: String,
}

impl RepoDescriptor {
    /// Create a new descriptor.
    pub fn new(name: impl Into<String>, clone_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clone_url: clone_url.into(),
        }
    }
}

/// One page of an organization listing.
#[derive(Debug, Clone, Default)]
pub struct RepoPage {
    pub repos: Vec<GitHubRepo>,
    /// Next page to request, `None` on the last page.
    pub next_page: Option<u32>,
}

/// Paginated repository listing.
pub trait RepoOps {
    /// Fetch one page of an organization's repositories, including private and forked ones.
    fn list_org_repos_page(&self, org: &str, page: u32, per_page: u32) -> Result<RepoPage>;
}

impl RepoOps for GitHubClient {
    fn list_org_repos_page(&self, org: &str, page: u32, per_page: u32) -> Result<RepoPage> {
        let endpoint = format!(
            "/orgs/{}/repos?type=all&per_page={}&page={}",
            org, per_page, page
        );
        let (repos, next): (Vec<GitHubRepo>, _) = self.get_page(&endpoint)?;
        let next_page = match next {
            Some(url) => Some(page_number(&url).ok_or_else(|| BulkCloneError::GitHub {
                message: format!("Next page link has no page number: {}", url),
            })?),
            None => None,
        };
        tracing::debug!(org, page, count = repos.len(), ?next_page, "fetched repository page");
        Ok(RepoPage { repos, next_page })
    }
}

impl<T: RepoOps + ?Sized> RepoOps for &T {
    fn list_org_repos_page(&self, org: &str, page: u32, per_page: u32) -> Result<RepoPage> {
        (**self).list_org_repos_page(org, page, per_page)
    }
}
