//! Error types for the book catalog client.
//!
//! # Design
//! Two families matter to callers. Transport-class failures (`Transport`,
//! `Deserialization`) mean no usable envelope came back. Application-class
//! failures (`Application`, `NotFound`) carry the envelope's `message`, which
//! is what the user gets to see. `Validation` is raised before any request is
//! issued.

use thiserror::Error;

/// Text shown when a failure carries no server message.
pub const GENERIC_FAILURE: &str = "request failed";

/// Errors returned by `BookApi` parse methods and `BookCatalogClient` operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    /// The request never produced a response (connection refused, reset, DNS).
    #[error("transport error: {0}")]
    Transport(String),

    /// The envelope reported `success: false`.
    #[error("HTTP {status}: {message}")]
    Application { status: u16, message: String },

    /// The requested book does not exist.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Required form input was missing; nothing was sent.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The response body was not the expected JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl CatalogError {
    /// The message surfaced to the notification sink.
    pub fn user_message(&self) -> &str {
        match self {
            CatalogError::Application { message, .. } | CatalogError::NotFound { message } => {
                message
            }
            CatalogError::Validation(message) => message,
            CatalogError::Transport(_)
            | CatalogError::Deserialization(_)
            | CatalogError::Serialization(_) => GENERIC_FAILURE,
        }
    }

    /// True when no well-formed envelope was received.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CatalogError::Transport(_) | CatalogError::Deserialization(_)
        )
    }
}
