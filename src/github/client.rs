//! GitHub API client.

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK, USER_AGENT};
use url::Url;

use crate::config::DEFAULT_API_URL;
use crate::error::{BulkCloneError, Result};

/// Client for the GitHub REST API, authenticated with a bearer token.
#[derive(Clone)]
pub struct GitHubClient {
    pub(crate) token: String,
    pub(crate) base_url: String,
    pub(crate) client: Client,
}

impl GitHubClient {
    /// Create a new GitHub client with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_enterprise(token, DEFAULT_API_URL)
    }

    /// Create a client for GitHub Enterprise with a custom base URL.
    pub fn with_enterprise(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let mut url = base_url.into();
        while url.ends_with('/') {
            url.pop();
        }
        Self {
            token: token.into(),
            base_url: url,
            client: Client::new(),
        }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token)).map_err(|_| {
            BulkCloneError::InvalidConfig("Token contains invalid header characters".into())
        })?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("bulkclone"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// GET an endpoint and return the decoded body plus the `rel="next"` link, if any.
    pub(crate) fn get_page<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<(T, Option<Url>)> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).headers(self.headers()?).send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(BulkCloneError::GitHub {
                message: format!("API request failed ({}): {}", status, body),
            });
        }

        let next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_link);

        let body = response.json().map_err(|e| BulkCloneError::GitHub {
            message: format!("Failed to parse response: {}", e),
        })?;
        Ok((body, next))
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Extract the `rel="next"` target from an RFC 8288 `Link` header.
pub(crate) fn next_link(header: &str) -> Option<Url> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|p| {
            let p = p.trim();
            p == "rel=\"next\"" || p == "rel=next"
        });
        if !is_next {
            return None;
        }
        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        Url::parse(target).ok()
    })
}

/// Page number carried in a pagination URL.
pub(crate) fn page_number(url: &Url) -> Option<u32> {
    url.query_pairs()
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.parse().ok())
}
