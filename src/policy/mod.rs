//! Maintenance policy layer
//! - traits.rs: PolicySource trait and PolicyError
//! - yaml.rs: policy document parser and the repository-document policy source

pub mod traits;
pub mod yaml;

pub use traits::{PolicyError, PolicySource};
pub use yaml::{DocumentPolicySource, parse_policy};
