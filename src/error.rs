//! Error types for the balancer core.
//!
//! Two failure classes exist once a request body has been decoded:
//! user input that cannot be balanced ([`BalancerError::Validation`]) and
//! internal defects where an allocation breaks its own invariants
//! ([`BalancerError::Invariant`]). HTTP-level failures live in
//! [`crate::api::ApiError`].

use thiserror::Error;

use crate::validation::{DroppedRecord, ValidationError};

/// Errors produced by ingestion, assignment and reporting.
#[derive(Debug, Clone, Error)]
pub enum BalancerError {
    /// The request cannot be balanced as submitted.
    #[error("validation failed: {}", summarize(.errors))]
    Validation {
        /// Every request-level problem found.
        errors: Vec<ValidationError>,
        /// Rows dropped before the request was rejected.
        dropped: Vec<DroppedRecord>,
    },
    /// An allocation violated an internal invariant.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl BalancerError {
    /// Creates an invariant violation.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }

    /// Whether the caller can fix this by changing the request.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result alias for balancer operations.
pub type Result<T> = std::result::Result<T, BalancerError>;
