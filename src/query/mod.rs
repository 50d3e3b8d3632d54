//! Query composition against the content store.
//!
//! Turns a filter state into one query descriptor per requested language
//! and encodes descriptors into the store's bracket-style query grammar.

mod builder;
mod encode;
mod types;

pub use self::builder::{build_descriptors, build_descriptors_at};
pub use self::encode::{to_query_pairs, to_query_string};
pub use self::types::*;
