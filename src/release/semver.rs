use semver::Version;

use crate::release::error::VersionParseError;

/// Prerelease prefix that marks a release candidate
const RELEASE_CANDIDATE_PREFIX: &str = "rc";

/// Parse a release tag into a semver::Version.
///
/// A single leading `v` is stripped before parsing. Partial versions
/// such as `v1.2` are rejected: a release tag must carry all three
/// numeric components.
///
/// Examples:
/// - "v1.2.3" -> Version(1, 2, 3)
/// - "1.2.3-rc.1" -> Version(1, 2, 3, pre: rc.1)
/// - "v1.2.3+fips" -> Version(1, 2, 3, build: fips)
pub fn parse_tag(tag: &str) -> Result<Version, VersionParseError> {
    let stripped = tag.strip_prefix('v').unwrap_or(tag);
    Version::parse(stripped).map_err(|source| VersionParseError {
        tag: tag.to_string(),
        source,
    })
}

/// Whether the version is a final release or a release candidate
pub fn is_final_or_release_candidate(version: &Version) -> bool {
    version.pre.is_empty()
        || version
            .pre
            .as_str()
            .split('.')
            .next()
            .is_some_and(|first| first.starts_with(RELEASE_CANDIDATE_PREFIX))
}

/// Dot-separated build metadata identifiers of the version
pub fn build_tags(version: &Version) -> impl Iterator<Item = &str> {
    version.build.as_str().split('.').filter(|tag| !tag.is_empty())
}

/// Whether the version carries the given build metadata identifier
pub fn has_build_tag(version: &Version, tag: &str) -> bool {
    build_tags(version).any(|t| t == tag)
}

/// Whether the version opens a major line (x.0.0)
pub fn is_major_start(version: &Version) -> bool {
    version.minor == 0 && version.patch == 0
}
