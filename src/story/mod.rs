//! Canonical story records.
//!
//! Raw store records are normalized here into fully constructed stories,
//! including the list of language variants each story is reachable in.

mod language;
mod normalizer;
mod types;

pub use self::language::{display_name, resolve_available_languages};
pub use self::normalizer::*;
pub use self::types::*;
