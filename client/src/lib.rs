//! Memoized, derived views over a remote organization record.
//!
//! [`OrgClient`] wraps two remote documents - an org profile and its
//! repository listing - behind single-slot caches, so each distinct URL is
//! fetched at most once per client no matter how often the derived views are
//! requested. Field access on the cached profile goes through strict nested
//! lookup; the license filter on the listing is deliberately lenient, because
//! a listing filter must degrade gracefully while direct path access must be
//! exact.
//!
//! The URL shape (`{api_base}/orgs/{org}` plus the profile's own `repos_url`
//! field) matches the remote data source and must stay that way.

mod fetch;

use serde_json::Value;
use thiserror::Error;

use skein_core::{LookupError, Memo, access_nested};

pub use fetch::{FetchError, Fetcher};

/// Default API base for the remote data source.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Failure surface for the org client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Propagated unchanged from the fetch collaborator.
    #[error("transport error: {0}")]
    Transport(#[from] FetchError),

    /// A required key was missing from a fetched document.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// A fetched document had the wrong shape for a required field.
    #[error("malformed payload: {0}")]
    Malformed(&'static str),
}

/// Cached client for one organization's remote resources.
///
/// Owns exactly two cache slots, one per remote document; they live exactly
/// as long as the client and are filled at most once each.
#[derive(Debug)]
pub struct OrgClient {
    org_name: String,
    api_base: String,
    fetcher: Fetcher,
    org: Memo<Value>,
    repos: Memo<Value>,
}

impl OrgClient {
    /// A client for `org_name` against the default API base.
    #[must_use]
    pub fn new(org_name: impl Into<String>) -> Self {
        Self {
            org_name: org_name.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            fetcher: Fetcher::new(),
            org: Memo::new(),
            repos: Memo::new(),
        }
    }

    /// Point the client at a different API base (mainly for tests against a
    /// local server). A trailing slash is tolerated.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        let base = api_base.into();
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    /// Swap in a caller-configured fetch collaborator.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Fetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// The immutable identifier this client was constructed with.
    #[must_use]
    pub fn org_name(&self) -> &str {
        &self.org_name
    }

    /// The org profile document, fetched on first use and cached for the
    /// life of the client.
    ///
    /// # Errors
    ///
    /// [`ClientError::Transport`] if the fetch fails; a failed fetch is not
    /// cached, so the next call retries.
    pub async fn org(&self) -> Result<Value, ClientError> {
        let url = format!("{}/orgs/{}", self.api_base, self.org_name);
        self.org
            .get_or_try_init(|| async move { Ok(self.fetcher.fetch_json(&url).await?) })
            .await
    }

    /// The listing URL published inside the cached org profile.
    ///
    /// Never fetches beyond [`OrgClient::org`] itself.
    ///
    /// # Errors
    ///
    /// [`ClientError::Lookup`] if the profile has no `repos_url` key,
    /// [`ClientError::Malformed`] if it is not a string.
    pub async fn repos_url(&self) -> Result<String, ClientError> {
        let org = self.org().await?;
        let url = access_nested(&org, &["repos_url"])?;
        url.as_str()
            .map(ToString::to_string)
            .ok_or(ClientError::Malformed("repos_url is not a string"))
    }

    /// Names of the org's public repositories, in listing order.
    ///
    /// With a `license` filter, keeps only repositories whose `license.key`
    /// equals the filter; repositories without a license structure are
    /// excluded, never an error. The listing is fetched at most once per
    /// client across repeated calls, filtered or not.
    ///
    /// # Errors
    ///
    /// [`ClientError::Transport`] from either fetch,
    /// [`ClientError::Malformed`] if the listing is not an array.
    pub async fn public_repos(&self, license: Option<&str>) -> Result<Vec<String>, ClientError> {
        let url = self.repos_url().await?;
        let listing = self
            .repos
            .get_or_try_init(|| async move {
                Ok::<_, ClientError>(self.fetcher.fetch_json(&url).await?)
            })
            .await?;

        let repos = listing
            .as_array()
            .ok_or(ClientError::Malformed("repository listing is not an array"))?;

        let mut names = Vec::with_capacity(repos.len());
        for repo in repos {
            if let Some(filter) = license
                && !Self::has_license(repo, filter)
            {
                continue;
            }
            match repo.get("name").and_then(Value::as_str) {
                Some(name) => names.push(name.to_string()),
                None => tracing::warn!("repository entry without a name, skipping"),
            }
        }
        Ok(names)
    }

    /// Whether `repo`'s `license.key` equals `license_key`.
    ///
    /// Absent or differently shaped license structures are `false`, never an
    /// error.
    #[must_use]
    pub fn has_license(repo: &Value, license_key: &str) -> bool {
        access_nested(repo, &["license", "key"])
            .ok()
            .and_then(Value::as_str)
            .is_some_and(|key| key == license_key)
    }
}
