use crate::{
    model::{ModelError, SchemaVersionError},
    pattern::PatternError,
    store::StoreError,
};
use thiserror::Error as ThisError;

///
/// Error
///
/// Hard failures surfaced by the core: registry misconfiguration, malformed
/// patterns and rejected batches. Per-object irregularities (dangling parents,
/// missing attributes) are never reported through this type.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    SchemaVersion(#[from] SchemaVersionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// Stable short label for the failing subsystem, used in logs.
    #[must_use]
    pub const fn origin(&self) -> &'static str {
        match self {
            Self::Model(_) => "model",
            Self::Pattern(_) => "pattern",
            Self::SchemaVersion(_) | Self::Store(_) => "store",
        }
    }
}
