//! Error types for the credit risk core

use thiserror::Error;

/// Errors that can occur while mapping a form record and scoring it
#[derive(Error, Debug)]
pub enum RiskCoreError {
    /// Categorical label outside the closed mapping
    #[error("Unknown {category} label: {label:?}")]
    UnknownLabel { category: String, label: String },

    /// Form value rejected at the boundary
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// Model input row does not match the classifier schema
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Classifier boundary failure
    #[error("Classifier failure: {0}")]
    Classifier(String),

    /// Model artifact could not be loaded or is structurally invalid
    #[error("Model artifact load failed: {0}")]
    ArtifactLoad(String),

    /// Model artifact hash differs from the configured one
    #[error("Model hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for credit risk core operations
pub type Result<T> = std::result::Result<T, RiskCoreError>;
