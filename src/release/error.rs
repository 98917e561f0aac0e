use thiserror::Error;

/// A release tag that does not parse as a semantic version
#[derive(Debug, Error)]
#[error("Invalid version tag {tag:?}: {source}")]
pub struct VersionParseError {
    pub tag: String,
    #[source]
    pub source: semver::Error,
}
