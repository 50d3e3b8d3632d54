//! Normalization of raw store records into canonical stories.
//!
//! The store represents a relation as a bare array, a `{data: [...]}`
//! wrapper, or a `{data: {...}}` singular wrapper, and different fields
//! of the same record may disagree. Each relation site is inspected
//! independently and always flattened to an array.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use super::types::{CategoryRef, LocalizationVariant, Story, StoryKind};
use crate::cms::RawRecord;
use crate::PUBLICATION_NAME;

const DISPLAY_DATE_FORMAT: &str = "%-d %B %Y";

/// How one relation site encodes its related objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationEncoding<'a> {
    Bare(&'a Vec<Value>),
    Wrapped(&'a Vec<Value>),
    WrappedSingle(&'a Value),
    Missing,
}

/// Inspect a relation site. A singular object without a `data` wrapper
/// counts as a singular encoding; null or scalar sites count as missing.
pub fn classify_relation(site: &Value) -> RelationEncoding<'_> {
    match site {
        Value::Array(items) => RelationEncoding::Bare(items),
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => RelationEncoding::Wrapped(items),
            Some(single @ Value::Object(_)) => RelationEncoding::WrappedSingle(single),
            Some(_) => RelationEncoding::Missing,
            None => RelationEncoding::WrappedSingle(site),
        },
        _ => RelationEncoding::Missing,
    }
}

/// Flatten a relation site to its related objects, whatever the encoding.
pub fn relation_items(site: &Value) -> Vec<&Value> {
    match classify_relation(site) {
        RelationEncoding::Bare(items) | RelationEncoding::Wrapped(items) => items.iter().collect(),
        RelationEncoding::WrappedSingle(item) => vec![item],
        RelationEncoding::Missing => Vec::new(),
    }
}

fn relation_of<'a>(attrs: &'a Value, key: &str) -> Vec<&'a Value> {
    attrs.get(key).map(relation_items).unwrap_or_default()
}

/// A related object's own attributes, tolerating unwrapped items.
fn item_attrs(item: &Value) -> &Value {
    match item.get("attributes") {
        Some(attrs) if attrs.is_object() => attrs,
        _ => item,
    }
}

fn str_field(attrs: &Value, key: &str) -> String {
    attrs
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string()
}

pub struct StoryNormalizer {
    // Shown when the store omits an author or category name
    attribution: String,
}

impl Default for StoryNormalizer {
    fn default() -> Self {
        Self {
            attribution: PUBLICATION_NAME.to_string(),
        }
    }
}

impl StoryNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribution(mut self, name: &str) -> Self {
        self.attribution = name.to_string();
        self
    }

    /// Map one raw record into a canonical story. Language availability
    /// is resolved separately and starts out empty here.
    pub fn normalize(&self, record: &RawRecord) -> Story {
        let attrs = record.attrs();

        Story {
            id: record.id(),
            title: str_field(attrs, "title"),
            image_url: self.cover_url(attrs),
            slug: str_field(attrs, "slug"),
            categories: self.categories(attrs),
            authors: self.authors(attrs),
            localizations: self.localizations(attrs),
            location: self.location(attrs),
            date: display_date(attrs),
            kind: attrs
                .get("type")
                .and_then(Value::as_str)
                .map(StoryKind::from)
                .unwrap_or_default(),
            is_student_article: attrs
                .get("isStudentArticle")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            available_languages: Vec::new(),
        }
    }

    fn cover_url(&self, attrs: &Value) -> String {
        relation_of(attrs, "cover")
            .first()
            .map(|item| str_field(item_attrs(item), "url"))
            .unwrap_or_default()
    }

    fn authors(&self, attrs: &Value) -> Vec<String> {
        let names: Vec<String> = relation_of(attrs, "authors")
            .into_iter()
            .map(|item| {
                let name = str_field(item_attrs(item), "name");
                if name.is_empty() {
                    self.attribution.clone()
                } else {
                    name
                }
            })
            .collect();

        if names.is_empty() {
            vec![self.attribution.clone()]
        } else {
            names
        }
    }

    fn categories(&self, attrs: &Value) -> Vec<CategoryRef> {
        relation_of(attrs, "categories")
            .into_iter()
            .map(|item| {
                let item = item_attrs(item);
                let title = str_field(item, "title");
                CategoryRef {
                    title: if title.is_empty() {
                        self.attribution.clone()
                    } else {
                        title
                    },
                    slug: str_field(item, "slug"),
                }
            })
            .collect()
    }

    fn localizations(&self, attrs: &Value) -> Vec<LocalizationVariant> {
        relation_of(attrs, "localizations")
            .into_iter()
            .filter_map(|item| {
                let item = item_attrs(item);
                let locale = str_field(item, "locale");
                if locale.is_empty() {
                    return None;
                }
                Some(LocalizationVariant {
                    locale,
                    title: str_field(item, "title"),
                    strap: str_field(item, "strap"),
                    slug: str_field(item, "slug"),
                })
            })
            .collect()
    }

    fn location(&self, attrs: &Value) -> String {
        relation_of(attrs, "location")
            .first()
            .map(|item| {
                let item = item_attrs(item);
                ["name", "district", "state"]
                    .iter()
                    .map(|key| str_field(item, key))
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default()
    }
}

fn display_date(attrs: &Value) -> String {
    let raw = attrs
        .get("date")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .or_else(|| attrs.get("publishedAt").and_then(Value::as_str));

    match raw {
        Some(raw) => parse_date(raw)
            .map(|date| date.format(DISPLAY_DATE_FORMAT).to_string())
            .unwrap_or_default(),
        None => String::new(),
    }
}

/// Parse a date string in the formats the store emits.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }

    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return day
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(attributes: Value) -> RawRecord {
        RawRecord(json!({"id": 1, "attributes": attributes}))
    }

    #[test]
    fn test_relation_shapes_normalize_identically() {
        let bare = record(json!({
            "title": "Monsoon shifts",
            "slug": "monsoon-shifts",
            "authors": [{"name": "Asha Rao"}],
            "categories": [{"title": "Climate", "slug": "climate"}],
        }));
        let wrapped = record(json!({
            "title": "Monsoon shifts",
            "slug": "monsoon-shifts",
            "authors": {"data": [{"id": 3, "attributes": {"name": "Asha Rao"}}]},
            "categories": {"data": [{"id": 9, "attributes": {"title": "Climate", "slug": "climate"}}]},
        }));
        let singular = record(json!({
            "title": "Monsoon shifts",
            "slug": "monsoon-shifts",
            "authors": {"data": {"id": 3, "attributes": {"name": "Asha Rao"}}},
            "categories": {"data": {"id": 9, "attributes": {"title": "Climate", "slug": "climate"}}},
        }));

        let normalizer = StoryNormalizer::new();
        let from_bare = normalizer.normalize(&bare);
        let from_wrapped = normalizer.normalize(&wrapped);
        let from_singular = normalizer.normalize(&singular);

        assert_eq!(from_bare, from_wrapped);
        assert_eq!(from_wrapped, from_singular);
        assert_eq!(from_bare.authors, vec!["Asha Rao".to_string()]);
        assert_eq!(from_bare.categories[0].slug, "climate");
    }

    #[test]
    fn test_mixed_shapes_in_one_record() {
        let story = StoryNormalizer::new().normalize(&record(json!({
            "title": "Harvest",
            "authors": [{"name": "Ravi"}],
            "categories": {"data": {"attributes": {"title": "Food", "slug": "food"}}},
            "localizations": {"data": [{"attributes": {"locale": "hi", "title": "फ़सल", "strap": "", "slug": "fasal"}}]},
        })));

        assert_eq!(story.authors, vec!["Ravi".to_string()]);
        assert_eq!(story.categories.len(), 1);
        assert_eq!(story.localizations[0].locale, "hi");
    }

    #[test]
    fn test_missing_author_name_gets_attribution() {
        let story = StoryNormalizer::new().normalize(&record(json!({
            "title": "Untitled",
            "authors": {"data": [{"id": 3}]},
        })));
        assert_eq!(story.authors, vec![PUBLICATION_NAME.to_string()]);
    }

    #[test]
    fn test_missing_authors_relation_gets_attribution() {
        let story = StoryNormalizer::new().normalize(&record(json!({"title": "Untitled"})));
        assert_eq!(story.authors, vec![PUBLICATION_NAME.to_string()]);
    }

    #[test]
    fn test_custom_attribution() {
        let normalizer = StoryNormalizer::new().with_attribution("Newsroom");
        let story = normalizer.normalize(&record(json!({"title": "Untitled"})));
        assert_eq!(story.authors, vec!["Newsroom".to_string()]);
    }

    #[test]
    fn test_unparsable_date_displays_empty() {
        let story = StoryNormalizer::new().normalize(&record(json!({
            "title": "Untitled",
            "publishedAt": "soon",
        })));
        assert_eq!(story.date, "");
    }

    #[test]
    fn test_date_falls_back_to_published_at() {
        let story = StoryNormalizer::new().normalize(&record(json!({
            "title": "Untitled",
            "publishedAt": "2024-03-09T08:30:00.000Z",
        })));
        assert_eq!(story.date, "9 March 2024");
    }

    #[test]
    fn test_location_joins_structured_fields() {
        let story = StoryNormalizer::new().normalize(&record(json!({
            "title": "Untitled",
            "location": {"data": {"attributes": {"name": "Wai", "district": "Satara", "state": "Maharashtra"}}},
        })));
        assert_eq!(story.location, "Wai, Satara, Maharashtra");
    }

    #[test]
    fn test_flat_location_object() {
        let story = StoryNormalizer::new().normalize(&record(json!({
            "title": "Untitled",
            "location": {"name": "Pune", "state": "Maharashtra"},
        })));
        assert_eq!(story.location, "Pune, Maharashtra");
    }

    #[test]
    fn test_student_flag_and_kind() {
        let story = StoryNormalizer::new().normalize(&record(json!({
            "title": "Untitled",
            "type": "video",
            "isStudentArticle": true,
        })));
        assert_eq!(story.kind, StoryKind::Video);
        assert!(story.is_student_article);
    }

    #[test]
    fn test_null_relation_is_missing() {
        assert_eq!(classify_relation(&Value::Null), RelationEncoding::Missing);
        assert_eq!(
            classify_relation(&json!({"data": null})),
            RelationEncoding::Missing
        );
    }
}
