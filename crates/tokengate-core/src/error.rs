//! Error types for Tokengate core.

use thiserror::Error;

/// Core errors from mask evaluation and record encoding.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("slot {slot} is outside the {slots}-slot vocabulary")]
    SlotOutOfRange { slot: u16, slots: u16 },

    #[error("vocabulary must hold between 1 and 128 slots, got {0}")]
    InvalidVocabulary(u16),

    #[error("generation counter overflow")]
    GenerationOverflow,

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Input validation errors for mutation requests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("collection id is zero")]
    ZeroCollection,

    #[error("token id is zero")]
    ZeroTokenId,

    #[error("grantee is the null identity")]
    ZeroGrantee,
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
