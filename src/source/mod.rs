//! Release history sources
//!
//! - [`traits`]: the paginated `ReleaseSource` trait
//! - [`types`]: repositories, release pages and release edges
//! - [`github`]: GitHub GraphQL implementation
//! - [`error`]: source errors

pub mod error;
pub mod github;
pub mod traits;
pub mod types;

pub use error::SourceError;
pub use github::GitHubSource;
pub use traits::ReleaseSource;
pub use types::{ReleaseEdge, ReleasePage, Repository};
