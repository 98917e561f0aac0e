//! Release source trait for fetching release history page by page

#[cfg(test)]
use mockall::automock;

use crate::source::error::SourceError;
use crate::source::types::{ReleasePage, Repository};

/// Trait for fetching repositories and their release history
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetches every repository of an organization
    ///
    /// # Arguments
    /// * `org` - Organization login (e.g., "acme")
    ///
    /// # Returns
    /// * `Ok(Vec<Repository>)` - Repositories with their newest page of releases
    /// * `Err(SourceError)` - If the fetch fails
    async fn fetch_repositories(&self, org: &str) -> Result<Vec<Repository>, SourceError>;

    /// Fetches the page of releases immediately older than `cursor`
    async fn fetch_earlier_releases(
        &self,
        org: &str,
        repository: &str,
        cursor: &str,
    ) -> Result<ReleasePage, SourceError>;
}
