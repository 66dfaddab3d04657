//! Lazy, page-by-page listing of an organization's repositories.

use std::collections::VecDeque;

use crate::config::Protocol;
use crate::error::Result;
use crate::github::{RepoDescriptor, RepoOps};

/// Iterator over every repository of an organization.
///
/// Pages are fetched only when the previous page has been consumed. The first
/// API error is yielded once and ends the iteration.
pub struct OrgRepos<C: RepoOps> {
    client: C,
    org: String,
    per_page: u32,
    protocol: Protocol,
    buffered: VecDeque<RepoDescriptor>,
    next_page: Option<u32>,
    pages_fetched: u32,
}

impl<C: RepoOps> OrgRepos<C> {
    /// Create a new listing of `org`, requesting `per_page` repositories per call.
    pub fn new(client: C, org: impl Into<String>, per_page: u32, protocol: Protocol) -> Self {
        Self {
            client,
            org: org.into(),
            per_page,
            protocol,
            buffered: VecDeque::new(),
            next_page: Some(1),
            pages_fetched: 0,
        }
    }

    /// Number of API calls issued so far.
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }
}

impl<C: RepoOps> Iterator for OrgRepos<C> {
    type Item = Result<RepoDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(repo) = self.buffered.pop_front() {
                return Some(Ok(repo));
            }
            let page = self.next_page.take()?;
            self.pages_fetched += 1;
            match self
                .client
                .list_org_repos_page(&self.org, page, self.per_page)
            {
                Ok(result) => {
                    let protocol = self.protocol;
                    self.next_page = result.next_page;
                    self.buffered
                        .extend(result.repos.iter().map(|repo| repo.descriptor(protocol)));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl<C: RepoOps> std::iter::FusedIterator for OrgRepos<C> {}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::BulkCloneError;
    use crate::github::{GitHubRepo, RepoPage};
    use std::sync::Mutex;

    /// In-memory organization serving fixed-size pages.
    pub(crate) struct FakeOrg {
        pub repos: Vec<GitHubRepo>,
        pub fail_on_page: Option<u32>,
        pub calls: Mutex<Vec<(u32, u32)>>,
    }

    impl FakeOrg {
        pub(crate) fn with_repos(count: usize) -> Self {
            Self {
                repos: (0..count).map(|i| fake_repo(&format!("repo-{i:03}"))).collect(),
                fail_on_page: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing_on(mut self, page: u32) -> Self {
            self.fail_on_page = Some(page);
            self
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl RepoOps for FakeOrg {
        fn list_org_repos_page(&self, _org: &str, page: u32, per_page: u32) -> Result<RepoPage> {
            self.calls.lock().unwrap().push((page, per_page));
            if self.fail_on_page == Some(page) {
                return Err(BulkCloneError::GitHub {
                    message: format!("API request failed (502 Bad Gateway) on page {page}"),
                });
            }
            let start = ((page - 1) * per_page) as usize;
            let end = (start + per_page as usize).min(self.repos.len());
            let repos = self.repos.get(start..end).unwrap_or_default().to_vec();
            let next_page = (end < self.repos.len()).then_some(page + 1);
            Ok(RepoPage { repos, next_page })
        }
    }

    pub(crate) fn fake_repo(name: &str) -> GitHubRepo {
        GitHubRepo {
            name: name.into(),
            clone_url: format!("https://github.com/acme/{name}.git"),
            ssh_url: format!("git@github.com:acme/{name}.git"),
        }
    }

    #[test]
    fn test_two_pages_for_150_repos() {
        let org = FakeOrg::with_repos(150);
        let mut lister = OrgRepos::new(&org, "acme", 99, Protocol::Ssh);
        let names: Vec<String> = lister.by_ref().map(|r| r.unwrap().name).collect();

        assert_eq!(names.len(), 150);
        assert_eq!(lister.pages_fetched(), 2);
        assert_eq!(*org.calls.lock().unwrap(), vec![(1, 99), (2, 99)]);

        let expected: Vec<String> = org.repos.iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_every_repo_once_regardless_of_page_size() {
        for per_page in [1, 7, 50, 99, 100, 500] {
            let org = FakeOrg::with_repos(100);
            let names: Vec<String> = OrgRepos::new(&org, "acme", per_page, Protocol::Ssh)
                .map(|r| r.unwrap().name)
                .collect();
            let mut unique = names.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(names.len(), 100, "per_page={per_page}");
            assert_eq!(unique.len(), 100, "per_page={per_page}");
        }
    }

    #[test]
    fn test_empty_org() {
        let org = FakeOrg::with_repos(0);
        let mut lister = OrgRepos::new(&org, "acme", 99, Protocol::Ssh);
        assert!(lister.next().is_none());
        assert_eq!(org.call_count(), 1);
    }

    #[test]
    fn test_stops_on_error() {
        let org = FakeOrg::with_repos(300).failing_on(2);
        let results: Vec<Result<RepoDescriptor>> =
            OrgRepos::new(&org, "acme", 99, Protocol::Ssh).collect();

        assert_eq!(results.len(), 100);
        assert!(results[..99].iter().all(|r| r.is_ok()));
        assert!(matches!(results[99], Err(BulkCloneError::GitHub { .. })));
        assert_eq!(org.call_count(), 2);
    }

    #[test]
    fn test_protocol_selects_url() {
        let org = FakeOrg::with_repos(1);
        let repo = OrgRepos::new(&org, "acme", 99, Protocol::Https)
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(repo.clone_url, "https://github.com/acme/repo-000.git");
    }
}
