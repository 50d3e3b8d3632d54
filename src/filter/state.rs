use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One independent filter dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Categories,
    Author,
    Locations,
    Dates,
    ContentTypes,
    Languages,
}

/// A single value applied to or removed from one facet.
#[derive(Debug, Clone, PartialEq)]
pub enum FacetValue {
    Category(String),
    Author(String),
    Location(String),
    Dates(DateFilter),
    ContentType(ContentKind),
    Language(String),
}

/// Content classification selectable through the content facet.
///
/// `Article` is the editorial default and contributes no type predicate
/// when queries are built.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ContentKind {
    Article,
    Video,
    Audio,
    Student,
}

impl ContentKind {
    /// Parse a URL token; unknown tokens yield `None` and are dropped.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "article" => Some(ContentKind::Article),
            "video" => Some(ContentKind::Video),
            "audio" => Some(ContentKind::Audio),
            "student" => Some(ContentKind::Student),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            ContentKind::Article => "article",
            ContentKind::Video => "video",
            ContentKind::Audio => "audio",
            ContentKind::Student => "student",
        }
    }
}

/// Relative date window, resolved to an absolute lower bound at
/// query-build time rather than stored symbolically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum DatePreset {
    PastWeek,
    PastMonth,
    PastYear,
}

impl DatePreset {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "past-week" => Some(DatePreset::PastWeek),
            "past-month" => Some(DatePreset::PastMonth),
            "past-year" => Some(DatePreset::PastYear),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            DatePreset::PastWeek => "past-week",
            DatePreset::PastMonth => "past-month",
            DatePreset::PastYear => "past-year",
        }
    }

    /// Window length used to compute the absolute lower bound.
    pub fn days(&self) -> i64 {
        match self {
            DatePreset::PastWeek => 7,
            DatePreset::PastMonth => 30,
            DatePreset::PastYear => 365,
        }
    }
}

/// The date facet: empty, a preset window, one specific day, or an
/// explicit range with either bound optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFilter {
    #[default]
    Empty,
    Preset(DatePreset),
    Day(NaiveDate),
    Range {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl DateFilter {
    /// Build a range, collapsing the bound-less case to `Empty` so that
    /// serialization round-trips stay lossless.
    pub fn range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        if from.is_none() && to.is_none() {
            DateFilter::Empty
        } else {
            DateFilter::Range { from, to }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, DateFilter::Empty)
    }
}

/// The canonical set of active facets.
///
/// Mutations are pure: every operation returns a new state and leaves the
/// receiver untouched. The empty state means "no filters"; whether an
/// empty state should also erase the persisted slot is the caller's call
/// (clearing everything erases it, merely arriving with no filters does
/// not).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub categories: BTreeSet<String>,
    pub author: Option<String>,
    pub locations: BTreeSet<String>,
    pub dates: DateFilter,
    pub content_types: BTreeSet<ContentKind>,
    pub languages: BTreeSet<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one facet value, returning the updated state.
    pub fn set(&self, value: FacetValue) -> Self {
        let mut next = self.clone();
        match value {
            FacetValue::Category(slug) => {
                next.categories.insert(slug);
            }
            FacetValue::Author(name) => {
                next.author = Some(name);
            }
            FacetValue::Location(name) => {
                next.locations.insert(name);
            }
            FacetValue::Dates(filter) => {
                next.dates = filter;
            }
            FacetValue::ContentType(kind) => {
                next.content_types.insert(kind);
            }
            FacetValue::Language(code) => {
                next.languages.insert(code);
            }
        }
        next
    }

    /// Remove one value from a facet, leaving sibling values of that
    /// facet intact. Removing any date value drops both bounds at once.
    pub fn remove(&self, value: &FacetValue) -> Self {
        let mut next = self.clone();
        match value {
            FacetValue::Category(slug) => {
                next.categories.remove(slug);
            }
            FacetValue::Author(_) => {
                next.author = None;
            }
            FacetValue::Location(name) => {
                next.locations.remove(name);
            }
            FacetValue::Dates(_) => {
                next.dates = DateFilter::Empty;
            }
            FacetValue::ContentType(kind) => {
                next.content_types.remove(kind);
            }
            FacetValue::Language(code) => {
                next.languages.remove(code);
            }
        }
        next
    }

    /// Clear a whole facet.
    pub fn clear(&self, facet: Facet) -> Self {
        let mut next = self.clone();
        match facet {
            Facet::Categories => next.categories.clear(),
            Facet::Author => next.author = None,
            Facet::Locations => next.locations.clear(),
            Facet::Dates => next.dates = DateFilter::Empty,
            Facet::ContentTypes => next.content_types.clear(),
            Facet::Languages => next.languages.clear(),
        }
        next
    }

    pub fn clear_all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.author.is_none()
            && self.locations.is_empty()
            && self.dates.is_empty()
            && self.content_types.is_empty()
            && self.languages.is_empty()
    }

    /// The locales queries should target: the language facet when set,
    /// otherwise the active locale alone.
    pub fn requested_languages(&self, active_locale: &str) -> Vec<String> {
        if self.languages.is_empty() {
            vec![active_locale.to_string()]
        } else {
            self.languages.iter().cloned().collect()
        }
    }
}
