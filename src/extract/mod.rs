//! Extraction layer
//!
//! # Modules
//!
//! - [`coordinator`]: pending page requests and concurrent page fetching
//! - [`pass`]: the pass loop that runs the support engine until it converges
//! - [`error`]: extraction errors

pub mod coordinator;
pub mod error;
pub mod pass;

pub use coordinator::{FetchCoordinator, PendingFetch};
pub use error::ExtractError;
pub use pass::Extractor;
