//! Error types for Chatgate operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all Chatgate crates. Uses `thiserror` for derive macros.

use thiserror::Error;

/// Errors that can occur in Chatgate operations.
///
/// The access controller never surfaces these to its callers; they are
/// produced by stores and transports and logged at the controller boundary.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or HTTP failure while talking to the config endpoint.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body was not valid JSON or had the wrong shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Persistent store failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a store error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Whether this error came from fetching server config.
    ///
    /// Transport and parse failures collapse into a single "fetch failed"
    /// outcome for callers.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Parse(_))
    }
}

/// Result type alias using Chatgate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
