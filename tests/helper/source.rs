//! Release source test utilities

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};

use support_window::source::{ReleaseEdge, ReleasePage, ReleaseSource, Repository, SourceError};

pub const LIBRARY_POLICY: &str =
    "library: true\nmaintained_minor_versions: 2\nmaintained_major_months: 6\n";

/// Date the support windows are evaluated at
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

/// Build a release edge published at noon UTC on `date` (YYYY-MM-DD)
pub fn edge(org: &str, tag: &str, date: &str) -> ReleaseEdge {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    ReleaseEdge {
        tag_name: tag.to_string(),
        commit: commit_of(org, tag),
        published_at: Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap()),
    }
}

pub fn commit_of(org: &str, tag: &str) -> String {
    format!("{org}-{tag}")
}

struct RepositoryHistory {
    policy_document: Option<String>,
    /// Full history, oldest first
    releases: Vec<ReleaseEdge>,
}

/// In-memory release source serving fixed-size pages, newest page first.
///
/// Cursors are the index of the first release of a page.
pub struct PagedSource {
    page_size: usize,
    orgs: HashMap<String, Vec<(String, RepositoryHistory)>>,
    earlier_fetches: AtomicUsize,
}

impl PagedSource {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            orgs: HashMap::new(),
            earlier_fetches: AtomicUsize::new(0),
        }
    }

    /// Add a repository whose history is given oldest first as (tag, date)
    pub fn with_repository(
        mut self,
        org: &str,
        name: &str,
        policy_document: Option<&str>,
        releases: &[(&str, &str)],
    ) -> Self {
        let history = RepositoryHistory {
            policy_document: policy_document.map(str::to_string),
            releases: releases
                .iter()
                .map(|(tag, date)| edge(org, tag, date))
                .collect(),
        };
        self.orgs
            .entry(org.to_string())
            .or_default()
            .push((name.to_string(), history));
        self
    }

    /// Number of earlier pages served so far
    pub fn earlier_fetches(&self) -> usize {
        self.earlier_fetches.load(Ordering::SeqCst)
    }

    fn page_before(&self, history: &RepositoryHistory, end: usize) -> ReleasePage {
        let start = end.saturating_sub(self.page_size);
        ReleasePage {
            has_earlier_page: start > 0,
            start_cursor: Some(start.to_string()),
            releases: history.releases[start..end].to_vec(),
        }
    }

    fn history(&self, org: &str, repository: &str) -> Result<&RepositoryHistory, SourceError> {
        self.orgs
            .get(org)
            .and_then(|repos| repos.iter().find(|(name, _)| name == repository))
            .map(|(_, history)| history)
            .ok_or_else(|| SourceError::NotFound(format!("{org}/{repository}")))
    }
}

#[async_trait]
impl ReleaseSource for PagedSource {
    async fn fetch_repositories(&self, org: &str) -> Result<Vec<Repository>, SourceError> {
        let repos = self
            .orgs
            .get(org)
            .ok_or_else(|| SourceError::NotFound(org.to_string()))?;

        Ok(repos
            .iter()
            .map(|(name, history)| Repository {
                org: org.to_string(),
                name: name.clone(),
                policy_document: history.policy_document.clone(),
                releases: self.page_before(history, history.releases.len()),
            })
            .collect())
    }

    async fn fetch_earlier_releases(
        &self,
        org: &str,
        repository: &str,
        cursor: &str,
    ) -> Result<ReleasePage, SourceError> {
        self.earlier_fetches.fetch_add(1, Ordering::SeqCst);
        let history = self.history(org, repository)?;
        let end = cursor
            .parse()
            .map_err(|_| SourceError::InvalidResponse(format!("bad cursor {cursor}")))?;
        Ok(self.page_before(history, end))
    }
}
