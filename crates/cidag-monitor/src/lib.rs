//! Rule-based monitor for cidag object views: predicates as data, the rule
//! catalog, the matcher, the notification renderer and the transport
//! boundary.
//!
//! Everything here is a pure function of an `ObjectView` and a `Catalog`;
//! delivery is the `Transport`'s responsibility.

pub mod catalog;
pub mod error;
pub mod matcher;
pub mod predicate;
pub mod render;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::Error;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        catalog::{Catalog, Rule, Template},
        matcher::{MatchReport, MatchResult, match_view},
        predicate::{CompareOp, Literal, Predicate},
        render::{Message, Renderer},
        transport::{Delivery, Transport},
    };
}
