//! # AppError
//!
//! Centralized error handling for the forum pipeline.
//! Maps store and validation failures to the command error taxonomy.

use thiserror::Error;

/// Failures reported by a [`DocumentStore`](crate::traits::DocumentStore)
/// implementation. These are domain-level results, not panics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record of the given kind exists with that ID
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// The store refused the write (constraint violation, backend fault)
    #[error("store rejected write: {0}")]
    Rejected(String),
}

/// The primary error type for all command operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Missing or malformed command fields. Nothing was persisted.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Empty text, author or timestamp on a comment. Nothing was persisted.
    #[error("Invalid comment: {0}")]
    InvalidComment(String),

    /// Empty text, author or timestamp on an answer. Nothing was persisted.
    #[error("Invalid answer: {0}")]
    InvalidAnswer(String),

    #[error("Invalid vote: {0}")]
    InvalidVote(String),

    /// A read targeted an aggregate that does not exist.
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// A store write, link or reload failed. Records persisted before the
    /// failing step stay in place unlinked.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl AppError {
    /// True for the variants rejected before any store call is made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::InvalidRequest(_)
                | AppError::InvalidComment(_)
                | AppError::InvalidAnswer(_)
                | AppError::InvalidVote(_)
        )
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Persistence(err.to_string())
    }
}

/// A specialized Result type for command logic.
pub type Result<T> = std::result::Result<T, AppError>;

/// A specialized Result type for store adapters.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
