//! Values delivered by a release source

use chrono::{DateTime, Utc};

/// A release as listed by the source, before tag parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEdge {
    /// Tag name (e.g., "v1.2.3")
    pub tag_name: String,
    /// Commit the tag points to
    pub commit: String,
    pub published_at: DateTime<Utc>,
}

/// One page of a repository's release history, oldest release first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleasePage {
    /// Whether older releases exist before this page
    pub has_earlier_page: bool,
    /// Cursor of the first release in this page
    pub start_cursor: Option<String>,
    pub releases: Vec<ReleaseEdge>,
}

impl ReleasePage {
    /// Cursor to request the preceding page with, if there is one
    pub fn earlier_cursor(&self) -> Option<&str> {
        if self.has_earlier_page {
            self.start_cursor.as_deref()
        } else {
            None
        }
    }
}

/// A repository of an organization together with its known release history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub org: String,
    pub name: String,
    /// Raw support policy document stored in the repository, if any
    pub policy_document: Option<String>,
    /// Releases fetched so far, oldest first
    pub releases: ReleasePage,
}

impl Repository {
    /// Prepend an older page of releases fetched with `requested_cursor`.
    ///
    /// A page that does not move the cursor backwards ends the history, so
    /// a source that keeps returning the same page cannot stall extraction.
    /// Returns false in that case.
    pub fn merge_earlier_page(&mut self, requested_cursor: &str, page: ReleasePage) -> bool {
        let progressed = page.start_cursor.as_deref() != Some(requested_cursor)
            && (!page.has_earlier_page || page.start_cursor.is_some());

        let mut releases = page.releases;
        releases.append(&mut self.releases.releases);
        self.releases = ReleasePage {
            has_earlier_page: page.has_earlier_page && progressed,
            start_cursor: page.start_cursor,
            releases,
        };
        progressed
    }
}
