//! Common error types for the variant ingestion core

use thiserror::Error;

/// Common result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure to map a raw code onto one of the fixed biological vocabularies
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unsupported chromosome value: {0:?}")]
    Chromosome(String),

    #[error("unsupported allele value: {0:?}")]
    Allele(String),

    #[error("position {0} exceeds the storable range")]
    Position(u64),
}

/// Error types across the ingestion pipeline and stores
#[derive(Error, Debug)]
pub enum Error {
    /// Header line or payload violates the batch file format
    #[error("Format error: {0}")]
    Format(String),

    /// A data line could not be turned into a variant record
    ///
    /// `line` is 1-based and counts the header line.
    #[error("Decoding error on line {line}: {reason}")]
    Decode { line: usize, reason: String },

    /// External label has no registered individual
    #[error("Individual not found: {0}")]
    IndividualNotFound(String),

    /// Registration refused because the label already exists (reject policy only)
    #[error("Individual already exists: {0}")]
    DuplicateIndividual(String),

    /// Backing store rejected or failed an operation
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored data that no longer satisfies the domain
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub(crate) fn decode(line: usize, reason: impl Into<String>) -> Self {
        Error::Decode {
            line,
            reason: reason.into(),
        }
    }
}
