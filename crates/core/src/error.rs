//! Error types for the HubMatch domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! A request that finds no matching entity is *not* an error: it is reported
//! through [`crate::Outcome`]. Only configuration faults and malformed inputs
//! end up here.

use thiserror::Error;

use crate::category::Category;

/// The top-level error type for all HubMatch operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Alias table errors ---
    #[error("Alias configuration error: {0}")]
    Alias(#[from] AliasError),

    // --- Threshold / policy errors ---
    #[error("Threshold configuration error: {0}")]
    Threshold(#[from] ThresholdError),

    // --- Request validation ---
    #[error("Invalid intent request: {0}")]
    Request(#[from] RequestError),

    // --- Registry snapshot ---
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
    #[error(
        "ambiguous_exact_alias: '{synonym}' in category {category} maps to both '{first}' and '{second}'"
    )]
    AmbiguousExactAlias {
        category: Category,
        synonym: String,
        first: String,
        second: String,
    },

    #[error("canonical tokens '{first}' and '{second}' in category {category} fold to the same value")]
    DuplicateCanonical {
        category: Category,
        first: String,
        second: String,
    },

    #[error("empty canonical token in category {category}")]
    EmptyCanonical { category: Category },
}

impl AliasError {
    /// Stable machine-readable code for operators and API responses.
    pub fn code(&self) -> &'static str {
        match self {
            AliasError::AmbiguousExactAlias { .. } => "ambiguous_exact_alias",
            AliasError::DuplicateCanonical { .. } => "duplicate_canonical",
            AliasError::EmptyCanonical { .. } => "empty_canonical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("threshold for {level} must be within [0, 1], got {value}")]
    OutOfRange { level: Category, value: f64 },

    #[error("policy value {field} must be within [0, 1], got {value}")]
    InvalidPolicy { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("request has no floor, room, device type, device name or service")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate entity_id in registry snapshot: {0}")]
    DuplicateEntityId(String),

    #[error("entity at position {index} has an empty entity_id")]
    MissingEntityId { index: usize },
}
