//! Persistence seam for the last-applied filter set.

use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use super::state::FilterState;
use crate::TARGET_FILTER;

/// The single slot the engine writes its filters into.
pub const FILTER_SLOT_KEY: &str = "kahani.discovery.filters";

/// Storage for the serialized filter set. Injected into the engine so the
/// session-backed implementation can be swapped for an in-memory one
/// under test.
pub trait FilterStore: Send + Sync {
    fn load(&self) -> Option<FilterState>;
    fn save(&self, state: &FilterState);
    fn clear(&self);
}

/// Keyed in-memory store, the session-storage stand-in.
#[derive(Default)]
pub struct MemoryFilterStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryFilterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FilterStore for MemoryFilterStore {
    fn load(&self) -> Option<FilterState> {
        let slots = self.slots.lock().unwrap();
        let json = slots.get(FILTER_SLOT_KEY)?;
        match serde_json::from_str(json) {
            Ok(state) => Some(state),
            Err(err) => {
                debug!(target: TARGET_FILTER, "Discarding unreadable filter slot: {}", err);
                None
            }
        }
    }

    fn save(&self, state: &FilterState) {
        if let Ok(json) = serde_json::to_string(state) {
            let mut slots = self.slots.lock().unwrap();
            slots.insert(FILTER_SLOT_KEY.to_string(), json);
        }
    }

    fn clear(&self) {
        let mut slots = self.slots.lock().unwrap();
        slots.remove(FILTER_SLOT_KEY);
    }
}
