//! Language availability for a story.

use lazy_static::lazy_static;
use std::collections::HashMap;

use super::types::{LanguageVariant, LocalizationVariant};

lazy_static! {
    // Locale code to native display name for the publication's editions.
    static ref LOCALE_NAMES: HashMap<&'static str, &'static str> = {
        let mut names = HashMap::new();
        names.insert("en", "English");
        names.insert("hi", "हिन्दी");
        names.insert("bn", "বাংলা");
        names.insert("ta", "தமிழ்");
        names.insert("te", "తెలుగు");
        names.insert("ml", "മലയാളം");
        names.insert("mr", "मराठी");
        names.insert("ur", "اردو");
        names.insert("pa", "ਪੰਜਾਬੀ");
        names.insert("gu", "ગુજરાતી");
        names
    };
}

/// Display name for a locale code; unknown codes fall back to the code
/// itself so the entry stays presentable.
pub fn display_name(code: &str) -> String {
    LOCALE_NAMES
        .get(code)
        .map(|name| (*name).to_string())
        .unwrap_or_else(|| code.to_string())
}

/// The selectable language variants for one story.
///
/// The active locale is always present: when the store never recorded
/// that localization, an entry pointing at the story's own slug is
/// synthesized and placed first. Store-provided entries keep their
/// order.
pub fn resolve_available_languages(
    localizations: &[LocalizationVariant],
    active_locale: &str,
    own_slug: &str,
) -> Vec<LanguageVariant> {
    let mut variants: Vec<LanguageVariant> = localizations
        .iter()
        .map(|localization| LanguageVariant {
            code: localization.locale.clone(),
            display_name: display_name(&localization.locale),
            slug: localization.slug.clone(),
        })
        .collect();

    if !variants.iter().any(|variant| variant.code == active_locale) {
        variants.insert(
            0,
            LanguageVariant {
                code: active_locale.to_string(),
                display_name: display_name(active_locale),
                slug: own_slug.to_string(),
            },
        );
    }

    variants
}
