//! Producer/consumer pipeline: one lister feeding a fixed pool of clone workers.
//!
//! The lister runs on the calling thread and pushes descriptors into a bounded
//! queue while `workers` scoped threads drain it. A failed clone cancels the
//! shared [`CancelToken`]: the lister stops paginating, idle workers stop taking
//! work, and whatever was listed but never attempted is reported as aborted.

use crate::clone::{CloneExecutor, CloneOutcome, CommandRunner, GitCli};
use crate::config::{Config, PER_PAGE};
use crate::error::{BulkCloneError, Result};
use crate::github::{GitHubClient, OrgRepos, RepoDescriptor, RepoOps};
use std::fmt;
use std::fs::DirBuilder;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::sync::{Arc, Mutex};
use std::thread;

/// Shared stop signal for the lister and every worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Final tally of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Descriptors received from the lister.
    pub listed: usize,
    pub cloned: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Listed but never attempted because the run was cancelled.
    pub aborted: usize,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} listed, {} cloned, {} skipped, {} failed, {} aborted",
            self.listed, self.cloned, self.skipped, self.failed, self.aborted
        )
    }
}

#[derive(Default)]
struct Tally {
    listed: AtomicUsize,
    cloned: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

impl Tally {
    fn record(&self, outcome: &Result<CloneOutcome>) {
        let counter = match outcome {
            Ok(CloneOutcome::Cloned(_)) => &self.cloned,
            Ok(CloneOutcome::Skipped(_)) => &self.skipped,
            Err(_) => &self.failed,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn report(&self) -> RunReport {
        let listed = self.listed.load(Ordering::SeqCst);
        let cloned = self.cloned.load(Ordering::SeqCst);
        let skipped = self.skipped.load(Ordering::SeqCst);
        let failed = self.failed.load(Ordering::SeqCst);
        RunReport {
            listed,
            cloned,
            skipped,
            failed,
            aborted: listed.saturating_sub(cloned + skipped + failed),
        }
    }
}

/// A fixed-size pool of clone workers.
pub struct Pipeline<R: CommandRunner> {
    executor: CloneExecutor<R>,
    workers: usize,
    queue_capacity: usize,
    cancel: CancelToken,
}

impl<R: CommandRunner> Pipeline<R> {
    pub fn new(executor: CloneExecutor<R>, workers: usize) -> Self {
        Self {
            executor,
            workers: workers.max(1),
            queue_capacity: PER_PAGE as usize,
            cancel: CancelToken::new(),
        }
    }

    /// Bound on descriptors waiting in the queue.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Token that stops the run when cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Clone everything `repos` yields while it is still being produced.
    pub fn run<I>(&self, repos: I) -> Result<RunReport>
    where
        I: IntoIterator<Item = Result<RepoDescriptor>>,
    {
        let tally = Tally::default();
        let (tx, rx) = sync_channel(self.queue_capacity);
        let rx = Arc::new(Mutex::new(rx));

        let (listing, worker_results) = thread::scope(|s| {
            let handles: Vec<_> = (1..=self.workers)
                .map(|id| {
                    let rx = Arc::clone(&rx);
                    let tally = &tally;
                    s.spawn(move || self.worker(id, rx, tally))
                })
                .collect();
            // Workers own the receiver now; once they all exit, sends fail.
            drop(rx);

            let listing = self.produce(repos, tx, &tally);
            let worker_results: Vec<Result<()>> = handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|_| Err(BulkCloneError::WorkerPanicked)))
                .collect();
            (listing, worker_results)
        });

        let report = tally.report();
        let failure = worker_results
            .into_iter()
            .find_map(|r| r.err())
            .or(listing.err());

        match failure {
            None => Ok(report),
            Some(error) => Err(BulkCloneError::Aborted {
                source: Box::new(error),
                report,
            }),
        }
    }

    /// Collect the full listing first, then clone one repository at a time.
    pub fn run_sequential<I>(&self, repos: I) -> Result<RunReport>
    where
        I: IntoIterator<Item = Result<RepoDescriptor>>,
    {
        let tally = Tally::default();
        let repos = repos.into_iter().collect::<Result<Vec<_>>>()?;
        tally.listed.store(repos.len(), Ordering::SeqCst);

        for repo in &repos {
            if self.cancel.is_cancelled() {
                break;
            }
            let outcome = self.executor.clone_repo(repo);
            tally.record(&outcome);
            if let Err(error) = outcome {
                self.cancel.cancel();
                return Err(BulkCloneError::Aborted {
                    source: Box::new(error),
                    report: tally.report(),
                });
            }
        }
        Ok(tally.report())
    }

    fn produce<I>(&self, repos: I, tx: SyncSender<RepoDescriptor>, tally: &Tally) -> Result<()>
    where
        I: IntoIterator<Item = Result<RepoDescriptor>>,
    {
        let mut repos = repos.into_iter();
        loop {
            // checked before pulling, since pulling may request another page
            if self.cancel.is_cancelled() {
                tracing::info!("run cancelled, no further pages will be requested");
                break;
            }
            let Some(repo) = repos.next() else {
                break;
            };
            let repo = match repo {
                Ok(repo) => repo,
                Err(e) => {
                    tracing::error!(error = %e, "listing failed");
                    self.cancel.cancel();
                    return Err(e);
                }
            };
            tracing::trace!(repo = %repo.name, "queued");
            tally.listed.fetch_add(1, Ordering::SeqCst);
            if tx.send(repo).is_err() {
                // every worker has exited
                tally.listed.fetch_sub(1, Ordering::SeqCst);
                break;
            }
        }
        Ok(())
    }

    fn worker(
        &self,
        id: usize,
        queue: Arc<Mutex<Receiver<RepoDescriptor>>>,
        tally: &Tally,
    ) -> Result<()> {
        tracing::debug!(worker = id, "worker started");
        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            let next = queue
                .lock()
                .map_err(|_| BulkCloneError::WorkerPanicked)?
                .recv();
            let Ok(repo) = next else {
                break;
            };
            if self.cancel.is_cancelled() {
                break;
            }

            let outcome = self.executor.clone_repo(&repo);
            tally.record(&outcome);
            if let Err(e) = outcome {
                println!("clone failed, giving up on everything now: {}", e);
                tracing::error!(worker = id, repo = %repo.name, error = %e, "clone failed");
                self.cancel.cancel();
                return Err(e);
            }
        }
        tracing::debug!(worker = id, "worker stopped");
        Ok(())
    }
}

/// Create the clone root and any missing parents.
pub fn prepare_destination(path: &Path) -> Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder
        .create(path)
        .map_err(|source| BulkCloneError::Destination {
            path: path.to_path_buf(),
            source,
        })
}

/// Validate `config`, then list and clone the organization with the real GitHub API and `git`.
pub fn run(config: &Config) -> Result<RunReport> {
    let client = GitHubClient::with_enterprise(&config.token, &config.api_url);
    run_with(config, &client, GitCli::new())
}

/// Run against any repository source and command runner.
pub fn run_with<C, R>(config: &Config, client: C, runner: R) -> Result<RunReport>
where
    C: RepoOps,
    R: CommandRunner,
{
    config.validate()?;
    prepare_destination(&config.destination)?;

    let pipeline = Pipeline::new(CloneExecutor::new(runner, &config.destination), config.workers);
    let repos = OrgRepos::new(client, &config.organization, PER_PAGE, config.protocol);

    println!(
        "Gently fetching list of all {} repos... may take a minute",
        config.organization
    );
    tracing::info!(
        org = %config.organization,
        workers = config.workers,
        sequential = config.sequential,
        "starting bulk clone"
    );

    if config.sequential {
        pipeline.run_sequential(repos)
    } else {
        pipeline.run(repos)
    }
}
