//! # Error Types
//!
//! This module defines error types used throughout the etiketka library.
//!
//! Per-document failures inside a batch never surface as errors: the
//! builders degrade to booleans and observer warnings. `EtiketkaError`
//! is reserved for shell boundaries (unreadable spreadsheet, broken
//! archive, transport problems).

use thiserror::Error;

/// Main error type for etiketka operations
#[derive(Debug, Error)]
pub enum EtiketkaError {
    /// Spreadsheet could not be opened or parsed
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Archive packing/unpacking error
    #[error("Archive error: {0}")]
    Archive(String),

    /// Image processing error
    #[error("Image error: {0}")]
    Image(String),

    /// PDF emission error
    #[error("PDF error: {0}")]
    Pdf(String),

    /// HTTP transport errors (bind, serve)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
