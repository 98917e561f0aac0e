//! Tracking and fetching of outstanding release history pages

use std::time::Duration;

use futures::future::join_all;
use indexmap::IndexMap;
use tokio::time::sleep;
use tracing::{debug, error};

use crate::source::error::SourceError;
use crate::source::traits::ReleaseSource;
use crate::source::types::ReleasePage;

/// A request for the page of a library's releases preceding `cursor`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    pub org: String,
    pub library: String,
    pub cursor: String,
}

/// Collects the earlier pages requested during one extraction pass
#[derive(Debug, Default)]
pub struct FetchCoordinator {
    pending: IndexMap<(String, String), PendingFetch>,
}

impl FetchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the page of `library` under `org` that precedes `cursor`.
    ///
    /// Returns false if a request for the library is already pending.
    pub fn request(&mut self, org: &str, library: &str, cursor: &str) -> bool {
        let key = (org.to_string(), library.to_string());
        if self.pending.contains_key(&key) {
            return false;
        }
        debug!("Requesting releases of {}/{} before {}", org, library, cursor);
        self.pending.insert(
            key,
            PendingFetch {
                org: org.to_string(),
                library: library.to_string(),
                cursor: cursor.to_string(),
            },
        );
        true
    }

    /// Whether any library still needs an earlier page
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drain the pending requests in the order they were made
    pub fn take_pending(&mut self) -> Vec<PendingFetch> {
        self.pending.drain(..).map(|(_, fetch)| fetch).collect()
    }
}

/// Fetch the requested pages concurrently
///
/// Requests start with staggered delays to avoid rate limiting. Every request
/// runs to completion before results are returned, so callers never observe
/// a partially fetched round. The first failure, in request order, is returned.
pub async fn fetch_pending(
    source: &dyn ReleaseSource,
    pending: Vec<PendingFetch>,
    stagger: Duration,
) -> Result<Vec<(PendingFetch, ReleasePage)>, SourceError> {
    let futures = pending.into_iter().enumerate().map(|(i, fetch)| {
        let delay = stagger * i as u32;
        async move {
            sleep(delay).await;
            let result = source
                .fetch_earlier_releases(&fetch.org, &fetch.library, &fetch.cursor)
                .await
                .inspect_err(|e| {
                    error!(
                        "Failed to fetch earlier releases for {}/{}: {}",
                        fetch.org, fetch.library, e
                    )
                });
            result.map(|page| (fetch, page))
        }
    });

    join_all(futures).await.into_iter().collect()
}
