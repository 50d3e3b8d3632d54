//! Access to the headless content store.
//!
//! This module handles request execution: the HTTP client, the store
//! port, and the fan-out strategy for multi-language queries.

mod client;
mod executor;
mod types;

pub use self::client::{create_http_client, ContentStore, HttpContentStore};
pub use self::executor::{FanoutExecutor, LocaleResult};
pub use self::types::*;
