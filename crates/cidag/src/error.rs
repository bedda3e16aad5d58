use cidag_core::{
    Error as CoreError,
    model::{ModelError, SchemaVersionError},
    pattern::PatternError,
    store::StoreError,
};
use cidag_monitor::catalog::CatalogError;
use derive_more::Display;
use serde::Serialize;
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Model(err) => err.into(),
            CoreError::Pattern(err) => err.into(),
            CoreError::SchemaVersion(err) => err.into(),
            CoreError::Store(err) => err.into(),
        }
    }
}

impl From<ModelError> for Error {
    fn from(err: ModelError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Model, err.to_string())
    }
}

impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Catalog, err.to_string())
    }
}

impl From<PatternError> for Error {
    fn from(err: PatternError) -> Self {
        Self::new(ErrorKind::Pattern, ErrorOrigin::Pattern, err.to_string())
    }
}

impl From<SchemaVersionError> for Error {
    fn from(err: SchemaVersionError) -> Self {
        Self::new(ErrorKind::Unsupported, ErrorOrigin::Store, err.to_string())
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        let kind = match err {
            StoreError::SchemaVersion(_) => ErrorKind::Unsupported,
            StoreError::UnknownCollection(_) | StoreError::InvalidRecord { .. } => {
                ErrorKind::InvalidData
            }
        };

        Self::new(kind, ErrorOrigin::Store, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers and tooling.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Registry or catalog misconfiguration; fatal at initialization.
    Config,
    /// Malformed pattern or unknown type name in a pattern.
    Pattern,
    /// Batch schema version outside the supported range.
    Unsupported,
    /// Batch contents the store cannot accept.
    InvalidData,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Model,
    Catalog,
    Pattern,
    Store,
}
