//! Eligibility tracks that partition a library's releases

use std::fmt;

use semver::Version;

use crate::release::semver::{has_build_tag, is_final_or_release_candidate};

/// A partition of a library's releases evaluated independently for support
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Track {
    /// Mainline releases without build metadata
    Normal,
    /// Build-variant releases whose metadata carries the given identifier
    Variant(String),
}

impl Track {
    /// Whether the release with this version takes part in support marking on this track.
    ///
    /// Only final releases and release candidates qualify. Releases with
    /// other prerelease tags or with build metadata foreign to the track
    /// are ignored.
    pub fn is_relevant(&self, version: &Version) -> bool {
        if !is_final_or_release_candidate(version) {
            return false;
        }
        match self {
            Track::Normal => version.build.is_empty(),
            Track::Variant(tag) => has_build_tag(version, tag),
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Normal => write!(f, "normal"),
            Track::Variant(tag) => write!(f, "variant:{}", tag),
        }
    }
}
