//! Error types for index construction, boundary serialization and snapshots.
//!
//! A point that falls outside every region is not an error: lookups return
//! `None` for that case. Coordinate reference system mismatches are not
//! detected at all.

use std::io;
use thiserror::Error;

/// Errors that can occur while building, persisting or serializing regions.
#[derive(Debug, Error)]
pub enum FloraError {
    /// A source record's geometry could not be interpreted as coordinates.
    #[error("Malformed geometry in record {record}: {reason}")]
    MalformedGeometry { record: usize, reason: String },

    /// A boundary ring failed closure or minimum-point validation.
    #[error("Invalid ring: {0}")]
    InvalidRing(String),

    /// A source record's attributes could not be mapped to the typed record.
    #[error("Invalid attribute '{field}' in record {record}: {reason}")]
    InvalidAttributes {
        record: usize,
        field: String,
        reason: String,
    },

    #[error("Invalid boundary text: {0}")]
    InvalidBoundaryText(String),

    /// The snapshot header or payload is not usable.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The source document could not be read as a feature collection.
    #[error("Source error: {0}")]
    Source(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl FloraError {
    /// Returns the source record position this error refers to, if any.
    pub fn record(&self) -> Option<usize> {
        match self {
            FloraError::MalformedGeometry { record, .. }
            | FloraError::InvalidAttributes { record, .. } => Some(*record),
            _ => None,
        }
    }

    /// Whether this error concerns a single source record, as opposed to the
    /// whole build or a file.
    pub fn is_record_error(&self) -> bool {
        self.record().is_some()
    }
}

/// Result type for flora finder operations
pub type FloraResult<T> = Result<T, FloraError>;
