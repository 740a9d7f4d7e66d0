use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by the underlying key-value store.
///
/// Always transient from the contract's point of view: the caller may resubmit
/// the whole operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("conflicting write on key '{key}'")]
    Conflict { key: String },
    #[error("store i/o failure: {0}")]
    Io(String),
}

/// Every way a lifecycle operation can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid argument for product '{id}': {reason}")]
    InvalidArgument { id: String, reason: String },
    #[error("product {id} not found")]
    NotFound { id: String },
    #[error("product {id} already exists")]
    AlreadyExists { id: String },
    #[error("record for product '{id}' is corrupt: {reason}")]
    CorruptRecord { id: String, reason: String },
    #[error("failed to serialize product '{id}': {reason}")]
    Serialization { id: String, reason: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Coarse classification of a [`LedgerError`], stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    CorruptRecord,
    Serialization,
    Store,
}

impl ErrorKind {
    /// Machine-readable code, e.g. `NOT_FOUND`.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::CorruptRecord => "CORRUPT_RECORD",
            ErrorKind::Serialization => "SERIALIZATION",
            ErrorKind::Store => "STORE_UNAVAILABLE",
        }
    }
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            LedgerError::NotFound { .. } => ErrorKind::NotFound,
            LedgerError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            LedgerError::CorruptRecord { .. } => ErrorKind::CorruptRecord,
            LedgerError::Serialization { .. } => ErrorKind::Serialization,
            LedgerError::Store(_) => ErrorKind::Store,
        }
    }

    /// The product id the failure refers to, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            LedgerError::InvalidArgument { id, .. }
            | LedgerError::NotFound { id }
            | LedgerError::AlreadyExists { id }
            | LedgerError::CorruptRecord { id, .. }
            | LedgerError::Serialization { id, .. } => Some(id.as_str()),
            LedgerError::Store(StoreError::Conflict { key }) => Some(key.as_str()),
            LedgerError::Store(_) => None,
        }
    }

    /// Only store failures are worth resubmitting unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Store(_))
    }

    pub(crate) fn invalid(id: &str, reason: impl Into<String>) -> Self {
        LedgerError::InvalidArgument {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
