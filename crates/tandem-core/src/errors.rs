//! Unified error type for wallet operations
//!
//! Every failure is an atomic abort: the operation that returns an error has
//! left no trace in wallet state. The one expected non-aborting failure, a
//! failed external invocation during execution, is reported as a notification
//! and never surfaces here.

use crate::identifiers::{Fingerprint, RequestId};
use crate::request::Origin;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned by wallet operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum WalletError {
    /// Wrong caller for a privileged entry point.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Which guard rejected the caller
        message: String,
    },

    /// Request id already applied for this origin.
    #[error("Duplicate request: {origin} {request_id} already applied")]
    DuplicateRequest {
        /// Ledger the request came from
        origin: Origin,
        /// The repeated id
        request_id: RequestId,
    },

    /// Category code outside the reserved range.
    #[error("Invalid key: 0x{code:02x}")]
    InvalidKey {
        /// The rejected code
        code: u8,
    },

    /// Expected pre-state of a mirrored request does not hold.
    #[error("Mirror invariant violation: {message}")]
    MirrorInvariantViolation {
        /// Which expectation failed
        message: String,
    },

    /// Owner count / threshold combination out of bounds.
    #[error("Invalid requirement: {message}")]
    InvalidRequirement {
        /// Which bound was violated
        message: String,
    },

    /// Operation references an unknown transaction.
    #[error("Not found: transaction {fingerprint}")]
    NotFound {
        /// The unknown fingerprint
        fingerprint: Fingerprint,
    },

    /// Request value or payload does not match its expected encoding.
    #[error("Malformed value: {message}")]
    MalformedValue {
        /// What was wrong with the bytes
        message: String,
    },

    /// Submission to the null destination.
    #[error("Invalid destination: transactions must target a non-null address")]
    InvalidDestination,

    /// Configuration unreadable or invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },
}

/// Discriminant of [`WalletError`] for matching and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`WalletError::Unauthorized`]
    Unauthorized,
    /// See [`WalletError::DuplicateRequest`]
    DuplicateRequest,
    /// See [`WalletError::InvalidKey`]
    InvalidKey,
    /// See [`WalletError::MirrorInvariantViolation`]
    MirrorInvariantViolation,
    /// See [`WalletError::InvalidRequirement`]
    InvalidRequirement,
    /// See [`WalletError::NotFound`]
    NotFound,
    /// See [`WalletError::MalformedValue`]
    MalformedValue,
    /// See [`WalletError::InvalidDestination`]
    InvalidDestination,
    /// See [`WalletError::Config`]
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl WalletError {
    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a mirror invariant violation
    pub fn mirror_violation(message: impl Into<String>) -> Self {
        Self::MirrorInvariantViolation {
            message: message.into(),
        }
    }

    /// Create an invalid requirement error
    pub fn invalid_requirement(message: impl Into<String>) -> Self {
        Self::InvalidRequirement {
            message: message.into(),
        }
    }

    /// Create a malformed value error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedValue {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Discriminant of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::DuplicateRequest { .. } => ErrorKind::DuplicateRequest,
            Self::InvalidKey { .. } => ErrorKind::InvalidKey,
            Self::MirrorInvariantViolation { .. } => ErrorKind::MirrorInvariantViolation,
            Self::InvalidRequirement { .. } => ErrorKind::InvalidRequirement,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::MalformedValue { .. } => ErrorKind::MalformedValue,
            Self::InvalidDestination => ErrorKind::InvalidDestination,
            Self::Config { .. } => ErrorKind::Config,
        }
    }
}

/// Standard result type for wallet operations
pub type Result<T> = std::result::Result<T, WalletError>;

impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        Self::config(err.to_string())
    }
}

impl From<toml::de::Error> for WalletError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}
