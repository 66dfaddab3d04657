//! Shallow cloning through the external `git` binary.

use crate::error::{BulkCloneError, Result};
use crate::github::RepoDescriptor;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// History depth passed to `git clone`.
pub const CLONE_DEPTH: u32 = 1;

/// Runs an external program to completion.
pub trait CommandRunner: Sync {
    /// Run with `args` in working directory `cwd`, failing on a non-zero exit.
    fn run(&self, args: &[String], cwd: &Path) -> Result<()>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, args: &[String], cwd: &Path) -> Result<()> {
        (**self).run(args, cwd)
    }
}

/// The `git` executable found on `PATH` (or an explicit path).
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl GitCli {
    /// Create a new runner for `git` on `PATH`.
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Create a new runner for a specific git executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for GitCli {
    fn run(&self, args: &[String], cwd: &Path) -> Result<()> {
        // stderr joins stdout so progress from every worker lands in one stream
        let status = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::from(io::stdout()))
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(BulkCloneError::Io(io::Error::other(format!(
                "{} exited with {}",
                self.program.display(),
                status
            ))))
        }
    }
}

/// What happened to one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneOutcome {
    /// Freshly cloned to the given path.
    Cloned(PathBuf),
    /// Something already existed at the given path.
    Skipped(PathBuf),
}

/// Clones repositories into subdirectories of a root directory.
pub struct CloneExecutor<R: CommandRunner> {
    runner: R,
    root: PathBuf,
}

impl<R: CommandRunner> CloneExecutor<R> {
    /// Create a new executor cloning into `root`.
    pub fn new(runner: R, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            root: root.into(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Shallow-clone `repo` into `root/<name>`, skipping if that path already exists.
    ///
    /// Any existing entry counts, including plain files and dangling symlinks.
    /// Existing directories are not checked for being a complete clone.
    pub fn clone_repo(&self, repo: &RepoDescriptor) -> Result<CloneOutcome> {
        let dest = self.root.join(&repo.name);

        match dest.symlink_metadata() {
            Ok(_) => {
                println!("{} has already been cloned, skipping", dest.display());
                return Ok(CloneOutcome::Skipped(dest));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        println!("Cloning {} into {}...", repo.name, self.root.display());
        self.runner
            .run(&clone_args(&repo.clone_url), &self.root)
            .map_err(|e| BulkCloneError::CloneError {
                repo: repo.name.clone(),
                message: e.to_string(),
            })?;

        Ok(CloneOutcome::Cloned(dest))
    }
}

/// Arguments for a shallow clone of `url`.
pub fn clone_args(url: &str) -> Vec<String> {
    vec![
        "clone".into(),
        "--depth".into(),
        CLONE_DEPTH.to_string(),
        url.into(),
    ]
}
