use thiserror::Error;

use crate::source::error::SourceError;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Release source failed: {0}")]
    Source(#[from] SourceError),
}
