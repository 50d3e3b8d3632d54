//! Query-string codec for the filter state.
//!
//! Keys follow the page URL contract: `types` (category slugs), `author`,
//! `location`, `dates`, `content`, `languages`. Every key except `author`
//! carries a comma-joined list; `dates` entries are tagged with `start:`,
//! `end:`, `date:`, or a preset token.

use chrono::NaiveDate;
use tracing::debug;
use url::form_urlencoded;

use super::state::{ContentKind, DateFilter, DatePreset, FilterState};
use crate::TARGET_FILTER;

const KEY_CATEGORIES: &str = "types";
const KEY_AUTHOR: &str = "author";
const KEY_LOCATION: &str = "location";
const KEY_DATES: &str = "dates";
const KEY_CONTENT: &str = "content";
const KEY_LANGUAGES: &str = "languages";

const TAG_START: &str = "start:";
const TAG_END: &str = "end:";
const TAG_DAY: &str = "date:";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Derive a filter state from a URL query string. Unknown keys and
/// unparsable values are dropped so the remaining facets still apply.
pub fn from_query(query: &str) -> FilterState {
    let mut state = FilterState::new();
    let trimmed = query.trim_start_matches('?');

    for (key, value) in form_urlencoded::parse(trimmed.as_bytes()) {
        match key.as_ref() {
            KEY_CATEGORIES => {
                for slug in split_list(&value) {
                    state.categories.insert(slug.to_string());
                }
            }
            KEY_AUTHOR => {
                let name = value.trim();
                if !name.is_empty() {
                    state.author = Some(name.to_string());
                }
            }
            KEY_LOCATION => {
                for name in split_list(&value) {
                    state.locations.insert(name.to_string());
                }
            }
            KEY_DATES => {
                state.dates = parse_dates(&value);
            }
            KEY_CONTENT => {
                for token in split_list(&value) {
                    match ContentKind::from_token(token) {
                        Some(kind) => {
                            state.content_types.insert(kind);
                        }
                        None => {
                            debug!(target: TARGET_FILTER, "Dropping unknown content token: {}", token);
                        }
                    }
                }
            }
            KEY_LANGUAGES => {
                for code in split_list(&value) {
                    state.languages.insert(code.to_string());
                }
            }
            _ => {}
        }
    }

    state
}

/// Serialize a filter state back into its URL query string. Empty facets
/// emit no key, so an empty state serializes to an empty string.
pub fn to_query(state: &FilterState) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::new();

    if !state.categories.is_empty() {
        pairs.push((KEY_CATEGORIES, join_list(state.categories.iter())));
    }
    if let Some(author) = &state.author {
        pairs.push((KEY_AUTHOR, author.clone()));
    }
    if !state.locations.is_empty() {
        pairs.push((KEY_LOCATION, join_list(state.locations.iter())));
    }
    if let Some(dates) = serialize_dates(&state.dates) {
        pairs.push((KEY_DATES, dates));
    }
    if !state.content_types.is_empty() {
        let tokens = state.content_types.iter().map(|kind| kind.token());
        pairs.push((KEY_CONTENT, join_list(tokens)));
    }
    if !state.languages.is_empty() {
        pairs.push((KEY_LANGUAGES, join_list(state.languages.iter())));
    }

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn split_list(joined: &str) -> impl Iterator<Item = &str> {
    joined.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn join_list<I, S>(items: I) -> String
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    items
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_dates(joined: &str) -> DateFilter {
    let mut from = None;
    let mut to = None;

    for entry in split_list(joined) {
        if let Some(preset) = DatePreset::from_token(entry) {
            return DateFilter::Preset(preset);
        }
        if let Some(raw) = entry.strip_prefix(TAG_DAY) {
            match parse_day(raw) {
                Some(day) => return DateFilter::Day(day),
                None => continue,
            }
        }
        if let Some(raw) = entry.strip_prefix(TAG_START) {
            from = parse_day(raw).or(from);
        } else if let Some(raw) = entry.strip_prefix(TAG_END) {
            to = parse_day(raw).or(to);
        } else {
            debug!(target: TARGET_FILTER, "Dropping unrecognized date entry: {}", entry);
        }
    }

    DateFilter::range(from, to)
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
        Ok(day) => Some(day),
        Err(_) => {
            debug!(target: TARGET_FILTER, "Dropping malformed date value: {}", raw);
            None
        }
    }
}

fn serialize_dates(dates: &DateFilter) -> Option<String> {
    match dates {
        DateFilter::Empty => None,
        DateFilter::Preset(preset) => Some(preset.token().to_string()),
        DateFilter::Day(day) => Some(format!("{}{}", TAG_DAY, day.format(DATE_FORMAT))),
        DateFilter::Range { from, to } => {
            let mut entries = Vec::new();
            if let Some(from) = from {
                entries.push(format!("{}{}", TAG_START, from.format(DATE_FORMAT)));
            }
            if let Some(to) = to {
                entries.push(format!("{}{}", TAG_END, to.format(DATE_FORMAT)));
            }
            Some(entries.join(","))
        }
    }
}
