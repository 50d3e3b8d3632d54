//! Descriptor construction from a filter state.

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use std::collections::BTreeSet;
use tracing::debug;

use super::types::{
    Predicate, QueryDescriptor, RequestShape, Scalar, FIELD_AUTHOR_NAME, FIELD_CATEGORY_SLUG,
    FIELD_IS_STUDENT, FIELD_LOCATION_NAME, FIELD_PUBLISHED_AT, FIELD_TYPE, SORT_NEWEST_FIRST,
    STORY_POPULATE,
};
use crate::filter::{ContentKind, DateFilter, FilterState};
use crate::TARGET_FILTER;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Build one descriptor per requested language from the active filters.
///
/// Never fails: facets that cannot be expressed are omitted so the
/// remaining ones still apply. Preset date windows resolve against the
/// current instant.
pub fn build_descriptors(
    filters: &FilterState,
    page: u32,
    page_size: u32,
    active_locale: &str,
) -> Vec<QueryDescriptor> {
    build_descriptors_at(filters, page, page_size, active_locale, Utc::now())
}

/// Same as [`build_descriptors`], with the build instant pinned.
pub fn build_descriptors_at(
    filters: &FilterState,
    page: u32,
    page_size: u32,
    active_locale: &str,
    now: DateTime<Utc>,
) -> Vec<QueryDescriptor> {
    let predicates = facet_predicates(filters, now);
    let shape = if filters.author.is_some() {
        RequestShape::AuthorContains
    } else {
        RequestShape::Nested
    };

    let languages = filters.requested_languages(active_locale);
    debug!(
        target: TARGET_FILTER,
        "Built {} predicate(s) for {} language(s)",
        predicates.len(),
        languages.len()
    );

    languages
        .into_iter()
        .map(|locale| QueryDescriptor {
            predicates: predicates.clone(),
            shape,
            populate: STORY_POPULATE,
            sort: SORT_NEWEST_FIRST,
            page,
            page_size,
            locale,
        })
        .collect()
}

fn facet_predicates(filters: &FilterState, now: DateTime<Utc>) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    if !filters.categories.is_empty() {
        predicates.push(Predicate::In {
            field: FIELD_CATEGORY_SLUG,
            values: filters.categories.iter().cloned().collect(),
        });
    }

    if let Some(author) = &filters.author {
        predicates.push(Predicate::ContainsInsensitive {
            field: FIELD_AUTHOR_NAME,
            value: author.clone(),
        });
    }

    if let Some(predicate) = location_predicate(&filters.locations) {
        predicates.push(predicate);
    }

    predicates.extend(date_predicates(&filters.dates, now));

    if let Some(predicate) = content_predicate(&filters.content_types) {
        predicates.push(predicate);
    }

    predicates
}

fn location_predicate(locations: &BTreeSet<String>) -> Option<Predicate> {
    let mut alternatives: Vec<Predicate> = locations
        .iter()
        .map(|name| Predicate::ContainsInsensitive {
            field: FIELD_LOCATION_NAME,
            value: name.clone(),
        })
        .collect();

    match alternatives.len() {
        0 => None,
        1 => alternatives.pop(),
        _ => Some(Predicate::Or(alternatives)),
    }
}

fn date_predicates(dates: &DateFilter, now: DateTime<Utc>) -> Vec<Predicate> {
    match dates {
        DateFilter::Empty => Vec::new(),
        DateFilter::Preset(preset) => {
            let lower = now - ChronoDuration::days(preset.days());
            vec![Predicate::Gte {
                field: FIELD_PUBLISHED_AT,
                value: lower.to_rfc3339(),
            }]
        }
        DateFilter::Day(day) => vec![
            Predicate::Gte {
                field: FIELD_PUBLISHED_AT,
                value: day_floor(*day),
            },
            Predicate::Lte {
                field: FIELD_PUBLISHED_AT,
                value: day_ceil(*day),
            },
        ],
        DateFilter::Range { from, to } => {
            let mut bounds = Vec::new();
            if let Some(from) = from {
                bounds.push(Predicate::Gte {
                    field: FIELD_PUBLISHED_AT,
                    value: day_floor(*from),
                });
            }
            if let Some(to) = to {
                bounds.push(Predicate::Lte {
                    field: FIELD_PUBLISHED_AT,
                    value: day_ceil(*to),
                });
            }
            bounds
        }
    }
}

// Bounds cover the full day; the store compares against full datetimes.
fn day_floor(day: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", day.format(DATE_FORMAT))
}

fn day_ceil(day: NaiveDate) -> String {
    format!("{}T23:59:59.999Z", day.format(DATE_FORMAT))
}

fn content_predicate(kinds: &BTreeSet<ContentKind>) -> Option<Predicate> {
    let mut alternatives = Vec::new();
    for kind in kinds {
        match kind {
            // The editorial default carries no type predicate.
            ContentKind::Article => {}
            ContentKind::Video => alternatives.push(Predicate::Eq {
                field: FIELD_TYPE,
                value: Scalar::Str("video".to_string()),
            }),
            ContentKind::Audio => alternatives.push(Predicate::Eq {
                field: FIELD_TYPE,
                value: Scalar::Str("audio".to_string()),
            }),
            ContentKind::Student => alternatives.push(Predicate::Eq {
                field: FIELD_IS_STUDENT,
                value: Scalar::Bool(true),
            }),
        }
    }

    match alternatives.len() {
        0 => None,
        1 => alternatives.pop(),
        _ => Some(Predicate::Or(alternatives)),
    }
}
