//! GitHub API integration for listing an organization's repositories.
//!
//! # Example
//!
//! ```rust,no_run
//! use bulkclone::config::Protocol;
//! use bulkclone::github::{GitHubClient, OrgRepos};
//!
//! let client = GitHubClient::new("ghp_your_token_here");
//!
//! for repo in OrgRepos::new(&client, "my-org", 99, Protocol::Ssh) {
//!     let repo = repo?;
//!     println!("{}: {}", repo.name, repo.clone_url);
//! }
//! # Ok::<(), bulkclone::error::BulkCloneError>(())
//! ```

mod client;
mod lister;
mod repos;

pub use client::GitHubClient;
pub use lister::OrgRepos;
pub use repos::{GitHubRepo, RepoDescriptor, RepoOps, RepoPage};

#[cfg(test)]
pub(crate) use lister::tests::FakeOrg;
