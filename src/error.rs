//! Error types shared by the guide operations.

use crate::decode::DecodeError;
use crate::llm::LlmError;

/// Failure of one of the guide operations.
#[derive(Debug, thiserror::Error)]
pub enum GuideError {
    /// Blank free text; nothing was sent to the reasoning service.
    #[error("{field} must not be empty")]
    EmptyInput { field: &'static str },

    #[error("reasoning service call failed: {0}")]
    Transport(#[from] LlmError),

    #[error("could not decode response: {0}")]
    Decode(#[from] DecodeError),
}

impl GuideError {
    /// Short machine-readable tag, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            GuideError::EmptyInput { .. } => "empty_input",
            GuideError::Transport(_) => "transport",
            GuideError::Decode(_) => "decode",
        }
    }
}
