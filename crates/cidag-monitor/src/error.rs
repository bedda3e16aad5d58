use crate::{catalog::CatalogError, render::RenderError, transport::TransportError};
use thiserror::Error as ThisError;

///
/// Error
///
/// Aggregate of monitor-side failures. Only `Catalog` is fatal; render and
/// transport failures are per-message and normally collected in reports.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
