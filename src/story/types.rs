//! Type definitions for the story module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Story classification as stored by the content store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryKind {
    #[default]
    Article,
    Video,
    Audio,
}

impl From<&str> for StoryKind {
    fn from(s: &str) -> Self {
        match s {
            "video" => StoryKind::Video,
            "audio" => StoryKind::Audio,
            _ => StoryKind::Article,
        }
    }
}

impl fmt::Display for StoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryKind::Article => write!(f, "article"),
            StoryKind::Video => write!(f, "video"),
            StoryKind::Audio => write!(f, "audio"),
        }
    }
}

/// Category a story is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub title: String,
    pub slug: String,
}

/// One language edition of a story. A sibling reference to the same
/// content under its own slug, never ownership of the story itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizationVariant {
    pub locale: String,
    pub title: String,
    pub strap: String,
    pub slug: String,
}

/// A selectable language entry on a story card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageVariant {
    pub code: String,
    pub display_name: String,
    pub slug: String,
}

/// Canonical story record handed to the presentation layer. Fully
/// constructed before it leaves the engine; `available_languages` always
/// carries an entry for the active locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub slug: String,
    pub categories: Vec<CategoryRef>,
    pub authors: Vec<String>,
    pub localizations: Vec<LocalizationVariant>,
    pub location: String,
    pub date: String,
    pub kind: StoryKind,
    pub is_student_article: bool,
    pub available_languages: Vec<LanguageVariant>,
}
