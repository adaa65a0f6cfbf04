//! Crate-level error type
//!
//! Every failure that reaches the controller is one of these. None of them is
//! fatal: the controller turns them into render commands and the session stays
//! usable.

use thiserror::Error;

use crate::llm::LlmError;
use crate::warehouse::WarehouseError;

/// Coarse classification used by the UI to pick a banner style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConnectionFailed,
    MetadataFetchFailed,
    ExecutionFailed,
    LlmCallFailed,
    ExtractionNotFound,
    InvalidState,
    Capture,
}

#[derive(Error, Debug)]
pub enum VoiceQueryError {
    #[error("Error connecting to Snowflake: {0}")]
    ConnectionFailed(String),

    #[error("Error fetching metadata: {0}")]
    MetadataFetchFailed(#[source] WarehouseError),

    #[error("Error executing SQL query: {0}")]
    ExecutionFailed(String),

    #[error("LLM call failed: {0}")]
    LlmCallFailed(#[from] LlmError),

    #[error("No SQL statement found in the model response")]
    ExtractionNotFound,

    #[error("{0}")]
    InvalidState(String),

    #[error("Speech capture failed: {0}")]
    Capture(String),
}

impl VoiceQueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConnectionFailed(_) => ErrorKind::ConnectionFailed,
            Self::MetadataFetchFailed(_) => ErrorKind::MetadataFetchFailed,
            Self::ExecutionFailed(_) => ErrorKind::ExecutionFailed,
            Self::LlmCallFailed(_) => ErrorKind::LlmCallFailed,
            Self::ExtractionNotFound => ErrorKind::ExtractionNotFound,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::Capture(_) => ErrorKind::Capture,
        }
    }
}

pub type Result<T, E = VoiceQueryError> = std::result::Result<T, E>;
