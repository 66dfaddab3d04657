//! # bulkclone
//!
//! Shallow-clone every repository of a GitHub organization into a local directory.
//!
//! Repositories are listed page by page from the GitHub API and handed to a
//! fixed pool of workers, each of which runs `git clone --depth 1`. Anything
//! already present under the destination is skipped, so re-running picks up
//! where an earlier run stopped. The first failed clone cancels the whole run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bulkclone::prelude::*;
//!
//! let config = Config::new("my-org", "./my-org", std::env::var("GITHUB_TOKEN")?)
//!     .workers(4);
//!
//! let report = bulkclone::pipeline::run(&config)?;
//! println!("{}", report);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod clone;
pub mod config;
pub mod error;
pub mod github;
pub mod pipeline;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::clone::{CloneExecutor, CloneOutcome, CommandRunner, GitCli};
    pub use crate::config::{Config, MAX_WORKERS, PER_PAGE, Protocol};
    pub use crate::error::{BulkCloneError, Result};
    pub use crate::github::{
        GitHubClient, GitHubRepo, OrgRepos, RepoDescriptor, RepoOps, RepoPage,
    };
    pub use crate::pipeline::{CancelToken, Pipeline, RunReport};
}

pub use prelude::*;
