//! # Error Types
//!
//! This module defines error types used throughout the imprenta library.

use thiserror::Error;

/// Main error type for imprenta operations
#[derive(Debug, Error)]
pub enum ImprentaError {
    /// A printer or job token failed to decode
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// A content block carried a type outside the supported set
    #[error("Unsupported block type: {0}")]
    UnsupportedBlock(String),

    /// A remote backend or network call failed
    #[error("External call failed: {0}")]
    ExternalCall(String),

    /// The backend returned an empty path for the spool file
    #[error("Fail to create temp file")]
    EmptyTempFile,

    /// Image fetch or decode error
    #[error("Image error: {0}")]
    Image(String),

    /// Layout or rasterization error
    #[error("Layout error: {0}")]
    Layout(String),

    /// Document emission error
    #[error("PDF error: {0}")]
    Pdf(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decode error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
