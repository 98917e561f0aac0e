//! In-memory registry of discovered releases

use indexmap::IndexMap;

use crate::release::types::Release;

/// Releases grouped by organization, then library name.
///
/// Organizations and libraries keep their insertion order. Within one
/// (organization, library) bucket every release has a distinct commit.
#[derive(Debug, Default)]
pub struct ReleaseRegistry {
    orgs: IndexMap<String, IndexMap<String, Vec<Release>>>,
}

impl ReleaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a release into its owning organization's bucket for `library`.
    ///
    /// Returns false if the bucket already holds a release for the same commit.
    pub fn insert(&mut self, library: &str, release: Release) -> bool {
        let org = release.owning_org.clone();
        let bucket = self.library_mut(&org, library);
        if bucket.iter().any(|r| r.commit == release.commit) {
            return false;
        }
        bucket.push(release);
        true
    }

    /// Releases of a library under one organization
    pub fn library(&self, org: &str, library: &str) -> Option<&[Release]> {
        self.orgs
            .get(org)
            .and_then(|libraries| libraries.get(library))
            .map(Vec::as_slice)
    }

    /// Mutable releases of a library, creating an empty bucket if needed
    pub fn library_mut(&mut self, org: &str, library: &str) -> &mut Vec<Release> {
        self.orgs
            .entry(org.to_string())
            .or_default()
            .entry(library.to_string())
            .or_default()
    }

    /// Full release list of the first organization whose `library` bucket
    /// contains `commit`, or an empty list.
    ///
    /// Organizations are scanned in insertion order. When the same library
    /// and commit exist under several organizations, which one answers
    /// depends on that order alone.
    pub fn releases_for_commit(&self, library: &str, commit: &str) -> Vec<Release> {
        self.orgs
            .values()
            .filter_map(|libraries| libraries.get(library))
            .find(|releases| releases.iter().any(|r| r.commit == commit))
            .cloned()
            .unwrap_or_default()
    }

    /// Iterate over every (organization, library, releases) bucket
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[Release])> {
        self.orgs.iter().flat_map(|(org, libraries)| {
            libraries.iter().map(move |(library, releases)| {
                (org.as_str(), library.as_str(), releases.as_slice())
            })
        })
    }

    /// Iterate over every release currently marked supported
    pub fn supported(&self) -> impl Iterator<Item = (&str, &str, &Release)> {
        self.iter().flat_map(|(org, library, releases)| {
            releases
                .iter()
                .filter(|r| r.supported)
                .map(move |r| (org, library, r))
        })
    }

    /// Total number of releases across all buckets
    pub fn len(&self) -> usize {
        self.iter().map(|(_, _, releases)| releases.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
