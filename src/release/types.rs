//! Release values as discovered in a library's release history

use std::cmp::Ordering;

use chrono::NaiveDate;
use semver::Version;

use crate::release::error::VersionParseError;
use crate::release::semver::parse_tag;

/// A published release of a library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Parsed version of the tag
    pub version: Version,
    /// Tag name as published (e.g., "v1.2.3")
    pub tag: String,
    /// Commit the tag points to
    pub commit: String,
    /// Organization that owns the repository the release was found in
    pub owning_org: String,
    /// Publication date
    pub published: NaiveDate,
    /// Last day the release's major line receives backports, if bounded
    pub support_end: Option<NaiveDate>,
    /// Whether the release is currently under maintenance
    pub supported: bool,
}

impl Release {
    /// Creates an unsupported release from a tag, failing if the tag is not semver
    pub fn new(
        owning_org: &str,
        tag: &str,
        commit: &str,
        published: NaiveDate,
    ) -> Result<Self, VersionParseError> {
        Ok(Self {
            version: parse_tag(tag)?,
            tag: tag.to_string(),
            commit: commit.to_string(),
            owning_org: owning_org.to_string(),
            published,
            support_end: None,
            supported: false,
        })
    }

    /// Orders releases by publication date, oldest first
    pub fn by_published_date(a: &Release, b: &Release) -> Ordering {
        a.published.cmp(&b.published)
    }

    /// Orders releases by semver precedence, lowest first.
    /// Build metadata does not take part in the ordering.
    pub fn by_version(a: &Release, b: &Release) -> Ordering {
        a.version.cmp_precedence(&b.version)
    }
}
