//! Type definitions for the content-store module.

use serde::Deserialize;
use serde_json::Value;

/// One record as returned by the content store. Usually attribute-wrapped;
/// the shape is not trusted beyond being JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Value);

impl RawRecord {
    pub fn id(&self) -> i64 {
        self.0.get("id").and_then(Value::as_i64).unwrap_or_default()
    }

    /// The record's attribute object, tolerating records that arrive
    /// without the wrapper.
    pub fn attrs(&self) -> &Value {
        match self.0.get("attributes") {
            Some(attrs) if attrs.is_object() => attrs,
            _ => &self.0,
        }
    }
}

/// Pagination metadata attached to one response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

/// One decoded page of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CmsPage {
    pub records: Vec<RawRecord>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attrs_unwraps_attribute_envelope() {
        let record = RawRecord(json!({"id": 7, "attributes": {"title": "Monsoon"}}));
        assert_eq!(record.id(), 7);
        assert_eq!(record.attrs()["title"], "Monsoon");
    }

    #[test]
    fn test_attrs_tolerates_flat_records() {
        let record = RawRecord(json!({"id": 7, "title": "Monsoon"}));
        assert_eq!(record.attrs()["title"], "Monsoon");
    }
}
