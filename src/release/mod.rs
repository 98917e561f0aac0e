//! Release history layer
//!
//! - [`semver`]: tag parsing and version predicates
//! - [`types`]: the `Release` value and its two orderings
//! - [`registry`]: per-organization, per-library release storage
//! - [`error`]: version parse errors

pub mod error;
pub mod registry;
pub mod semver;
pub mod types;

pub use error::VersionParseError;
pub use registry::ReleaseRegistry;
pub use types::Release;
