//! Extraction pass loop
//!
//! Each pass scans every repository of every organization, feeds the
//! releases known so far into the registry and runs the support engine per
//! track. Libraries whose answer depends on older history request the
//! preceding page; those pages are fetched and the scan repeats until no
//! library asks for more.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::config::FETCH_STAGGER_DELAY_MS;
use crate::extract::coordinator::{FetchCoordinator, fetch_pending};
use crate::extract::error::ExtractError;
use crate::policy::traits::PolicySource;
use crate::release::registry::ReleaseRegistry;
use crate::release::types::Release;
use crate::source::traits::ReleaseSource;
use crate::source::types::Repository;
use crate::support::track::Track;
use crate::support::window::{SupportPolicy, apply_decision, mark_supported};

/// Drives extraction of release history and support marking
pub struct Extractor<'a> {
    source: &'a dyn ReleaseSource,
    policies: &'a dyn PolicySource,
    tracks: Vec<Track>,
    today: NaiveDate,
    stagger: Duration,
}

impl<'a> Extractor<'a> {
    /// Creates an extractor evaluating the normal track and the variant
    /// track tagged `variant_tag`, as of today's date
    pub fn new(
        source: &'a dyn ReleaseSource,
        policies: &'a dyn PolicySource,
        variant_tag: &str,
    ) -> Self {
        Self {
            source,
            policies,
            tracks: vec![Track::Normal, Track::Variant(variant_tag.to_string())],
            today: Utc::now().date_naive(),
            stagger: Duration::from_millis(FETCH_STAGGER_DELAY_MS),
        }
    }

    /// Evaluate support windows as of `today` instead of the current date
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_stagger_delay(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// Extract releases of every repository of `orgs` and mark the supported ones.
    ///
    /// Returns once a full pass requests no further history. Source failures
    /// abort the run; unparseable tags and policies only skip their release
    /// or repository.
    pub async fn run_extraction(&self, orgs: &[String]) -> Result<ReleaseRegistry, ExtractError> {
        let mut repositories = Vec::new();
        for org in orgs {
            let fetched = self.source.fetch_repositories(org).await?;
            info!("Found {} repositories in {}", fetched.len(), org);
            repositories.extend(fetched);
        }

        let mut registry = ReleaseRegistry::new();
        let mut coordinator = FetchCoordinator::new();
        let mut pass = 1;

        loop {
            self.scan(&repositories, &mut registry, &mut coordinator);

            if !coordinator.has_pending() {
                info!(
                    "Extraction finished after {} passes with {} releases",
                    pass,
                    registry.len()
                );
                return Ok(registry);
            }

            let pending = coordinator.take_pending();
            info!(
                "Pass {}: fetching earlier releases for {} libraries",
                pass,
                pending.len()
            );
            for (request, page) in fetch_pending(self.source, pending, self.stagger).await? {
                let Some(repository) = repositories
                    .iter_mut()
                    .find(|r| r.org == request.org && r.name == request.library)
                else {
                    continue;
                };
                if !repository.merge_earlier_page(&request.cursor, page) {
                    warn!(
                        "Release history of {}/{} did not advance past {}; treating it as complete",
                        request.org, request.library, request.cursor
                    );
                }
            }
            pass += 1;
        }
    }

    /// Run one pass over every repository
    fn scan(
        &self,
        repositories: &[Repository],
        registry: &mut ReleaseRegistry,
        coordinator: &mut FetchCoordinator,
    ) {
        for repository in repositories {
            let policy = match self.policies.resolve(repository) {
                Ok(Some(policy)) => policy,
                Ok(None) => {
                    debug!(
                        "Skipping {}/{}: no library policy",
                        repository.org, repository.name
                    );
                    continue;
                }
                Err(e) => {
                    warn!(
                        "Skipping {}/{}: invalid policy: {}",
                        repository.org, repository.name, e
                    );
                    continue;
                }
            };

            if !self.extract_repository(repository, &policy, registry) {
                continue;
            }

            match repository.releases.earlier_cursor() {
                Some(cursor) => {
                    coordinator.request(&repository.org, &repository.name, cursor);
                }
                None => debug!(
                    "{}/{} has no earlier releases; answering with current history",
                    repository.org, repository.name
                ),
            }
        }
    }

    /// Register the repository's releases and recompute their support.
    ///
    /// Returns true if any track needs older history.
    fn extract_repository(
        &self,
        repository: &Repository,
        policy: &SupportPolicy,
        registry: &mut ReleaseRegistry,
    ) -> bool {
        for edge in &repository.releases.releases {
            match Release::new(
                &repository.org,
                &edge.tag_name,
                &edge.commit,
                edge.published_at.date_naive(),
            ) {
                Ok(release) => {
                    registry.insert(&repository.name, release);
                }
                Err(e) => warn!(
                    "Skipping release of {}/{}: {}",
                    repository.org, repository.name, e
                ),
            }
        }

        // An earlier page without a cursor can never be fetched.
        let complete = repository.releases.earlier_cursor().is_none();
        let releases = registry.library_mut(&repository.org, &repository.name);

        let mut need_more_data = false;
        for track in &self.tracks {
            let decision = mark_supported(releases, policy, track, complete, self.today);
            apply_decision(releases, track, &decision);
            need_more_data |= decision.need_more_data;
        }
        need_more_data
    }
}
