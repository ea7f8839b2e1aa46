//! Error types for groundtrack.
//!
//! This module defines all error types used throughout the groundtrack crate,
//! separating propagation and computation faults from the storage and
//! configuration errors of the surrounding tooling.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for groundtrack operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Orbit Errors ===
    /// The propagator could not produce a state for the requested instant.
    #[error("propagation error: {message}")]
    Propagation {
        /// Description reported by the propagator.
        message: String,
    },

    /// The geodetic latitude iteration did not settle within its cap.
    #[error("latitude iteration did not converge after {iterations} iterations")]
    NonConvergence {
        /// Number of iterations performed before giving up.
        iterations: u32,
    },

    /// A two-line element set was rejected by the parser.
    #[error("invalid TLE: {message}")]
    TleParse {
        /// Description of the parse failure.
        message: String,
    },

    /// A timestamp could not be formed or shifted.
    #[error("invalid timestamp: {message}")]
    InvalidTimestamp {
        /// Description of what went wrong.
        message: String,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// No stored TLE record carries the given name.
    #[error("no TLE record named '{name}'")]
    RecordNotFound {
        /// The name that was looked up.
        name: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for groundtrack operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new propagation error.
    #[must_use]
    pub fn propagation(message: impl Into<String>) -> Self {
        Self::Propagation {
            message: message.into(),
        }
    }

    /// Create a new TLE parse error.
    #[must_use]
    pub fn tle_parse(message: impl Into<String>) -> Self {
        Self::TleParse {
            message: message.into(),
        }
    }

    /// Create a new invalid timestamp error.
    #[must_use]
    pub fn invalid_timestamp(message: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error came from the propagator.
    #[must_use]
    pub fn is_propagation_error(&self) -> bool {
        matches!(self, Self::Propagation { .. })
    }

    /// Check if this error is a latitude non-convergence fault.
    #[must_use]
    pub fn is_non_convergence(&self) -> bool {
        matches!(self, Self::NonConvergence { .. })
    }
}
