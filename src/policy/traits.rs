//! Policy source trait definition

#[cfg(test)]
use mockall::automock;

use crate::source::types::Repository;
use crate::support::window::SupportPolicy;

/// Trait for resolving a repository's maintenance policy
#[cfg_attr(test, automock)]
pub trait PolicySource: Send + Sync {
    /// Resolve the policy of a repository
    ///
    /// # Returns
    /// * `Ok(Some(policy))` - The repository is a maintained library
    /// * `Ok(None)` - The repository is not a library or declares no policy
    /// * `Err(PolicyError)` - The policy exists but cannot be understood
    fn resolve(&self, repository: &Repository) -> Result<Option<SupportPolicy>, PolicyError>;
}

/// Error type for policy parsing
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// Failed to parse the document structure
    #[error("Failed to parse policy: {0}")]
    ParseFailed(String),

    /// Invalid syntax in the document
    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),

    /// Tree-sitter related error
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    /// A library policy without one of its required fields
    #[error("Missing policy field: {0}")]
    MissingField(&'static str),

    /// A field whose value has the wrong type or range
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}
