//! ## Crate layout
//! - `core`: object model, values, pattern language, graph query executor,
//!   store boundary and observability.
//! - `monitor`: rule predicates, catalog, matcher, renderer and transport
//!   boundary.
//! - `pipeline`: the `Monitor`, which runs query, match, render and send in
//!   one pass.
//! - `reference`: the Checkout, Build and Test type set and the "test" rule
//!   catalog.
//!
//! The `prelude` module mirrors the surface used by monitoring services.

pub use cidag_core as core;
pub use cidag_monitor as monitor;

pub mod error;
pub mod pipeline;
pub mod reference;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Error, ErrorKind, ErrorOrigin};
pub use pipeline::{Monitor, RunReport};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        core::{
            prelude::*,
            store::{Batch, MemoryStore, Store},
        },
        monitor::{
            prelude::*,
            transport::MemoryTransport,
        },
        pipeline::{Monitor, RunReport},
    };
}
