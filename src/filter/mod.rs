//! Filter-state derivation, URL serialization, and persistence.
//!
//! This module owns the canonical set of active facets and the two
//! representations it must stay in sync with: the page URL query string
//! and the persisted filter slot.

mod state;
mod store;
mod url;

pub use self::state::*;
pub use self::store::*;
pub use self::url::{from_query, to_query};
