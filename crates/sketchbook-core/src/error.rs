//! Error types for the harmony engine

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarmonyError {
    #[error("Unknown key: {0}")]
    UnknownKey(String),
    #[error("Unresolved descriptor: {0}")]
    UnresolvedDescriptor(String),
    #[error("Invalid chord: {0}")]
    InvalidChord(String),
    #[error("Invalid note: {0}")]
    InvalidNote(String),
}

pub type Result<T> = std::result::Result<T, HarmonyError>;
