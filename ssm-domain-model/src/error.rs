//! Conversion error types

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, building or writing a domain model
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A required table file is absent from the input directory
    #[error("missing table {file} in {}", dir.display())]
    MissingTable { file: String, dir: PathBuf },

    /// A table header lacks a column the mapping needs
    #[error("{file}: missing column '{column}'")]
    MissingColumn { file: String, column: String },

    /// A row lacks a required cell, or a typed cell cannot be decoded
    #[error("{file}, line {line}: {reason}")]
    MalformedRow {
        file: String,
        line: u64,
        reason: String,
    },

    /// A table file is not valid CSV
    #[error("failed to parse {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Input I/O failure
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Output I/O failure
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConvertError {
    pub fn malformed(file: impl Into<String>, line: u64, reason: impl Into<String>) -> Self {
        ConvertError::MalformedRow {
            file: file.into(),
            line,
            reason: reason.into(),
        }
    }
}

/// Result type for conversion operations
pub type ConvertResult<T> = Result<T, ConvertError>;
