use std::path::PathBuf;

use thiserror::Error;

/// Centralized error type for the DBF to SQLite conversion
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("found unexpected version byte {version:#04x}: {reason}")]
    InvalidSourceVersion { version: u8, reason: String },

    #[error("invalid dbf header in {path}: {message}")]
    InvalidSourceHeader { path: PathBuf, message: String },

    #[error("record {index} could not be decoded: {message}")]
    RecordDecodeFailed { index: u32, message: String },

    #[error("don't know how to decode byte {code} (column {index})")]
    UnknownTypeCode { code: u8, index: usize },

    #[error("found {names} column names but {types} types")]
    ColumnCountMismatch { names: usize, types: usize },

    #[error("cannot build a statement without columns")]
    EmptySchema,

    #[error("'{0}' is not a plain sql identifier")]
    InvalidIdentifier(String),

    #[error("could not open destination {path}: {source}")]
    DestinationOpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("trouble with {statement}: {source}")]
    SchemaCreationFailed {
        statement: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("trouble with {statement}: {source}")]
    StatementPrepareFailed {
        statement: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("insert of row {row_index} failed: {source}")]
    RowInsertFailed {
        row_index: u64,
        #[source]
        source: rusqlite::Error,
    },

    #[error("transaction error: {0}")]
    Transaction(#[source] rusqlite::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ConvertError {
    pub fn invalid_header<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::InvalidSourceHeader {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn record_decode<S: Into<String>>(index: u32, message: S) -> Self {
        Self::RecordDecodeFailed {
            index,
            message: message.into(),
        }
    }
}

/// Alias for fallible operations in the shared crate
pub type ConvertResult<T> = Result<T, ConvertError>;
