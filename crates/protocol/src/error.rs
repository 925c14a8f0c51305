//! Protocol error types.

use thiserror::Error;

/// Errors that can occur while decoding or encoding event frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed event frame: {0}")]
    Malformed(#[from] serde_json::Error),
}
