use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cms::{ContentStore, FanoutExecutor, LocaleResult};
use crate::filter::{self, Facet, FacetValue, FilterState, FilterStore};
use crate::pagination::{PaginationCoordinator, PaginationState};
use crate::query::build_descriptors;
use crate::story::{resolve_available_languages, Story, StoryNormalizer};
use crate::{DEFAULT_LOCALE, TARGET_DISCOVERY};

/// What the presentation layer renders.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryOutcome {
    pub stories: Vec<Story>,
    pub pagination: PaginationState,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// How the current page was reached. A hard reload deliberately does not
/// carry filters over: the persisted slot is erased and the engine
/// starts from an empty state.
#[derive(Debug, Clone)]
pub enum Navigation {
    Routed(String),
    HardReload,
}

/// Owns the filter state, the pager, and the current story list, and
/// coordinates one fetch cycle at a time. Every fetch is tagged with a
/// generation number; completions that are no longer current are
/// discarded instead of overwriting newer state.
pub struct DiscoveryEngine<S: ContentStore + ?Sized> {
    executor: FanoutExecutor<S>,
    filter_store: Arc<dyn FilterStore>,
    normalizer: StoryNormalizer,
    filters: FilterState,
    active_locale: String,
    pagination: PaginationCoordinator,
    stories: Vec<Story>,
    is_loading: bool,
    error: Option<String>,
    generation: u64,
}

impl<S: ContentStore + ?Sized> DiscoveryEngine<S> {
    pub fn new(
        store: Arc<S>,
        filter_store: Arc<dyn FilterStore>,
        active_locale: &str,
        viewport_width: u32,
        navigation: Navigation,
    ) -> Self {
        let filters = match &navigation {
            Navigation::Routed(query) => filter::from_query(query),
            Navigation::HardReload => {
                filter_store.clear();
                FilterState::new()
            }
        };

        Self {
            executor: FanoutExecutor::new(store, DEFAULT_LOCALE),
            filter_store,
            normalizer: StoryNormalizer::new(),
            filters,
            active_locale: active_locale.to_string(),
            pagination: PaginationCoordinator::new(viewport_width),
            stories: Vec::new(),
            is_loading: false,
            error: None,
            generation: 0,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// The query string the page URL should carry for the current state.
    pub fn query_string(&self) -> String {
        filter::to_query(&self.filters)
    }

    pub fn set_filter(&mut self, value: FacetValue) {
        self.filters = self.filters.set(value);
        self.after_filter_change();
    }

    pub fn remove_filter(&mut self, value: &FacetValue) {
        self.filters = self.filters.remove(value);
        self.after_filter_change();
    }

    pub fn clear_facet(&mut self, facet: Facet) {
        self.filters = self.filters.clear(facet);
        self.after_filter_change();
    }

    /// Drop every facet and erase the persisted slot. Unlike the other
    /// mutations this does not save an empty state; clearing everything
    /// means forgetting, not remembering emptiness.
    pub fn clear_all(&mut self) {
        self.filters = FilterState::clear_all();
        self.filter_store.clear();
        self.pagination.reset();
        self.invalidate();
    }

    fn after_filter_change(&mut self) {
        self.filter_store.save(&self.filters);
        self.pagination.reset();
        self.invalidate();
    }

    pub fn set_viewport_width(&mut self, width_px: u32) {
        if self.pagination.set_viewport_width(width_px) {
            self.invalidate();
        }
    }

    pub fn go_to_page(&mut self, page: u32) {
        self.pagination.go_to(page);
        self.invalidate();
    }

    pub fn step_forward(&mut self) {
        self.pagination.step_forward();
        self.invalidate();
    }

    pub fn step_back(&mut self) {
        self.pagination.step_back();
        self.invalidate();
    }

    pub fn jump_forward(&mut self) {
        self.pagination.jump_forward();
        self.invalidate();
    }

    pub fn jump_back(&mut self) {
        self.pagination.jump_back();
        self.invalidate();
    }

    /// Run one full fetch cycle for the current state.
    pub async fn refresh(&mut self) -> DiscoveryOutcome {
        let generation = self.begin_fetch();
        let descriptors = build_descriptors(
            &self.filters,
            self.pagination.current_page(),
            self.pagination.page_size(),
            &self.active_locale,
        );
        let results = self.executor.execute(&descriptors).await;
        self.apply_results(generation, results);
        self.outcome()
    }

    pub fn outcome(&self) -> DiscoveryOutcome {
        DiscoveryOutcome {
            stories: self.stories.clone(),
            pagination: self.pagination.state(),
            is_loading: self.is_loading,
            error: self.error.clone(),
        }
    }

    // Any state change obsoletes responses still in flight.
    fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn begin_fetch(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.is_loading = true;
        self.generation
    }

    /// Apply completed results unless a newer fetch or a state mutation
    /// has superseded them.
    fn apply_results(&mut self, generation: u64, results: Vec<LocaleResult>) -> bool {
        if generation != self.generation {
            debug!(
                target: TARGET_DISCOVERY,
                "Discarding stale response (generation {}, current {})",
                generation,
                self.generation
            );
            return false;
        }

        self.is_loading = false;

        // Only a failed single-descriptor fetch is user-visible; a failed
        // fan-out leg just contributes nothing.
        self.error = match results.as_slice() {
            [only] if only.failed => Some("The story archive could not be reached.".to_string()),
            _ => None,
        };

        self.stories = results
            .iter()
            .flat_map(|result| result.records.iter())
            .map(|record| {
                let mut story = self.normalizer.normalize(record);
                story.available_languages = resolve_available_languages(
                    &story.localizations,
                    &self.active_locale,
                    &story.slug,
                );
                story
            })
            .collect();

        self.pagination.apply_results(&results);

        info!(
            target: TARGET_DISCOVERY,
            "Loaded {} story(ies) across {} request(s)",
            self.stories.len(),
            results.len()
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::{CmsPage, PageMeta, RawRecord};
    use crate::filter::MemoryFilterStore;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use crate::query::QueryDescriptor;
    use serde_json::json;
    use std::collections::HashMap;

    enum Scripted {
        Page(CmsPage),
        Fail,
    }

    struct ScriptedStore {
        by_locale: HashMap<String, Scripted>,
    }

    #[async_trait]
    impl ContentStore for ScriptedStore {
        async fn fetch(&self, descriptor: &QueryDescriptor) -> Result<CmsPage> {
            match self.by_locale.get(&descriptor.locale) {
                Some(Scripted::Page(page)) => Ok(page.clone()),
                Some(Scripted::Fail) => Err(anyhow!("connection refused")),
                None => Ok(CmsPage::default()),
            }
        }
    }

    fn page_of(locale: &str, count: usize, total: u64) -> CmsPage {
        let records = (0..count)
            .map(|i| {
                RawRecord(json!({
                    "id": i,
                    "attributes": {
                        "title": format!("{} story {}", locale, i),
                        "slug": format!("{}-story-{}", locale, i),
                    }
                }))
            })
            .collect();
        CmsPage {
            records,
            meta: PageMeta {
                page: 1,
                page_size: 20,
                page_count: 1,
                total,
            },
        }
    }

    fn engine_with(
        scripted: Vec<(&str, Scripted)>,
        navigation: Navigation,
    ) -> DiscoveryEngine<ScriptedStore> {
        let by_locale = scripted
            .into_iter()
            .map(|(locale, page)| (locale.to_string(), page))
            .collect();
        DiscoveryEngine::new(
            Arc::new(ScriptedStore { by_locale }),
            Arc::new(MemoryFilterStore::new()),
            "en",
            1280,
            navigation,
        )
    }

    #[tokio::test]
    async fn test_single_transport_failure_surfaces_error() {
        let mut engine = engine_with(vec![("en", Scripted::Fail)], Navigation::HardReload);
        let outcome = engine.refresh().await;

        assert!(outcome.stories.is_empty());
        assert!(outcome.error.is_some());
        assert!(!outcome.is_loading);
    }

    #[tokio::test]
    async fn test_failed_fanout_leg_keeps_survivors() {
        let mut engine = engine_with(
            vec![
                ("hi", Scripted::Fail),
                ("bn", Scripted::Page(page_of("bn", 3, 3))),
            ],
            Navigation::Routed("languages=hi,bn".to_string()),
        );
        let outcome = engine.refresh().await;

        assert_eq!(outcome.stories.len(), 3);
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.pagination.total_items, 3);
    }

    #[tokio::test]
    async fn test_fanout_totals_sum_across_languages() {
        let mut engine = engine_with(
            vec![
                ("hi", Scripted::Page(page_of("hi", 5, 5))),
                ("bn", Scripted::Page(page_of("bn", 3, 3))),
            ],
            Navigation::Routed("types=climate&languages=hi,bn".to_string()),
        );
        let outcome = engine.refresh().await;

        assert_eq!(outcome.stories.len(), 8);
        assert_eq!(outcome.pagination.total_items, 8);
        assert_eq!(outcome.error, None);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let mut engine = engine_with(vec![], Navigation::HardReload);
        let generation = engine.begin_fetch();

        // The state moved on before the response arrived
        engine.set_filter(FacetValue::Category("climate".into()));

        let stale = vec![LocaleResult {
            locale: "en".to_string(),
            records: page_of("en", 4, 4).records,
            meta: PageMeta::default(),
            failed: false,
        }];
        assert!(!engine.apply_results(generation, stale));
        assert!(engine.outcome().stories.is_empty());
    }

    #[tokio::test]
    async fn test_stories_always_carry_active_language() {
        let mut engine = engine_with(
            vec![("en", Scripted::Page(page_of("en", 1, 1)))],
            Navigation::HardReload,
        );
        let outcome = engine.refresh().await;

        let story = &outcome.stories[0];
        assert_eq!(story.available_languages.len(), 1);
        assert_eq!(story.available_languages[0].code, "en");
        assert_eq!(story.available_languages[0].slug, story.slug);
    }

    #[test]
    fn test_hard_reload_erases_persisted_filters() {
        let filter_store = Arc::new(MemoryFilterStore::new());
        filter_store.save(&FilterState::new().set(FacetValue::Category("climate".into())));

        let engine = DiscoveryEngine::new(
            Arc::new(ScriptedStore {
                by_locale: HashMap::new(),
            }),
            filter_store.clone(),
            "en",
            1280,
            Navigation::HardReload,
        );

        assert!(engine.filters().is_empty());
        assert_eq!(filter_store.load(), None);
    }

    #[test]
    fn test_routed_navigation_parses_query() {
        let engine = engine_with(
            vec![],
            Navigation::Routed("types=climate&author=Asha".to_string()),
        );
        assert!(engine.filters().categories.contains("climate"));
        assert_eq!(engine.filters().author.as_deref(), Some("Asha"));
    }

    #[test]
    fn test_mutations_persist_and_clear_all_forgets() {
        let filter_store = Arc::new(MemoryFilterStore::new());
        let mut engine = DiscoveryEngine::new(
            Arc::new(ScriptedStore {
                by_locale: HashMap::new(),
            }),
            filter_store.clone(),
            "en",
            1280,
            Navigation::HardReload,
        );

        engine.set_filter(FacetValue::Language("hi".into()));
        assert_eq!(filter_store.load(), Some(engine.filters().clone()));

        engine.clear_all();
        assert_eq!(filter_store.load(), None);
        assert_eq!(engine.query_string(), "");
    }
}
