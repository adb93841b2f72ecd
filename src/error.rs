//! Error types for the Inscrypt core.
//!
//! Every failure that crosses the pipeline boundary is an [`InscryptError`].
//! Each variant maps to a stable [`ErrorKind`] tag that front ends can match
//! on without parsing messages. Messages never contain passwords or derived
//! key material.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors produced by the embed/extract pipeline and its components.
#[derive(Error, Debug)]
pub enum InscryptError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Payload too large for cover: need {needed} bits, capacity is {capacity} bits")]
    CapacityExceeded { needed: u64, capacity: u64 },

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Authentication failed at cipher layer {layer} (wrong password or cipher order)")]
    AuthenticationFailure { layer: usize },

    #[error("Corrupt payload: {0}")]
    CorruptPayload(String),

    #[error("Corrupt codebook: {0}")]
    CorruptCodebook(String),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Stable, machine-readable tag for an [`InscryptError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidConfiguration,
    CapacityExceeded,
    UnsupportedMediaType,
    AuthenticationFailure,
    CorruptPayload,
    CorruptCodebook,
    Cancelled,
}

impl ErrorKind {
    /// Returns the tag as it appears in serialized error reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration => "invalid_configuration",
            Self::CapacityExceeded => "capacity_exceeded",
            Self::UnsupportedMediaType => "unsupported_media_type",
            Self::AuthenticationFailure => "authentication_failure",
            Self::CorruptPayload => "corrupt_payload",
            Self::CorruptCodebook => "corrupt_codebook",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InscryptError {
    /// Returns the stable kind tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::UnsupportedMediaType(_) => ErrorKind::UnsupportedMediaType,
            Self::AuthenticationFailure { .. } => ErrorKind::AuthenticationFailure,
            Self::CorruptPayload(_) => ErrorKind::CorruptPayload,
            Self::CorruptCodebook(_) => ErrorKind::CorruptCodebook,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Builds the structured report handed to front ends.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub(crate) fn media(msg: impl Into<String>) -> Self {
        Self::UnsupportedMediaType(msg.into())
    }

    pub(crate) fn payload(msg: impl Into<String>) -> Self {
        Self::CorruptPayload(msg.into())
    }

    pub(crate) fn codebook(msg: impl Into<String>) -> Self {
        Self::CorruptCodebook(msg.into())
    }
}

/// Kind tag plus human-readable message, serializable as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, InscryptError>;
