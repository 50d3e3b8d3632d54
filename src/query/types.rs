//! Type definitions for the query module.

use std::fmt;

/// Attribute path a predicate applies to, outermost segment first.
pub type FieldPath = &'static [&'static str];

pub const FIELD_CATEGORY_SLUG: FieldPath = &["categories", "slug"];
pub const FIELD_AUTHOR_NAME: FieldPath = &["authors", "name"];
pub const FIELD_LOCATION_NAME: FieldPath = &["location", "name"];
pub const FIELD_PUBLISHED_AT: FieldPath = &["publishedAt"];
pub const FIELD_TYPE: FieldPath = &["type"];
pub const FIELD_IS_STUDENT: FieldPath = &["isStudentArticle"];

/// Fixed sort for every listing query.
pub const SORT_NEWEST_FIRST: &str = "publishedAt:desc";

/// Sentinel accepted by the store's `locale` parameter.
pub const ALL_LOCALES: &str = "all";

/// Scalar leaf of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => write!(f, "{}", s),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// One node of the filter tree sent to the content store.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    ContainsInsensitive { field: FieldPath, value: String },
    Gte { field: FieldPath, value: String },
    Lte { field: FieldPath, value: String },
    Eq { field: FieldPath, value: Scalar },
    In { field: FieldPath, values: Vec<String> },
}

/// Which of the store's two request grammars a descriptor uses.
///
/// Author matching is resolved server-side through a dedicated
/// contains-parameter, so author-driven queries issue flat filter
/// parameters instead of the nested predicate tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    Nested,
    AuthorContains,
}

/// One relation to populate and the fields to pull from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulateSpec {
    pub relation: &'static str,
    pub fields: &'static [&'static str],
}

/// Relations every story query must populate. Downstream normalization
/// depends on all of these being present in the response.
pub const STORY_POPULATE: &[PopulateSpec] = &[
    PopulateSpec { relation: "cover", fields: &["url"] },
    PopulateSpec { relation: "authors", fields: &["name"] },
    PopulateSpec { relation: "categories", fields: &["title", "slug"] },
    PopulateSpec { relation: "location", fields: &["name", "district", "state"] },
    PopulateSpec { relation: "localizations", fields: &["locale", "title", "strap", "slug"] },
];

/// Immutable description of one request against the content store.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    pub predicates: Vec<Predicate>,
    pub shape: RequestShape,
    pub populate: &'static [PopulateSpec],
    pub sort: &'static str,
    pub page: u32,
    pub page_size: u32,
    pub locale: String,
}

impl QueryDescriptor {
    /// The same query retargeted at another locale.
    pub fn with_locale(&self, locale: &str) -> Self {
        let mut next = self.clone();
        next.locale = locale.to_string();
        next
    }
}
