//! Request fan-out across the requested languages.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::client::ContentStore;
use super::types::{CmsPage, PageMeta, RawRecord};
use crate::query::QueryDescriptor;
use crate::TARGET_CMS_REQUEST;

/// Outcome of one request, tagged with the locale it was issued for.
#[derive(Debug, Clone)]
pub struct LocaleResult {
    pub locale: String,
    pub records: Vec<RawRecord>,
    pub meta: PageMeta,
    pub failed: bool,
}

impl LocaleResult {
    fn from_page(locale: String, page: CmsPage) -> Self {
        Self {
            locale,
            records: page.records,
            meta: page.meta,
            failed: false,
        }
    }

    fn transport_failure(locale: String) -> Self {
        Self {
            locale,
            records: Vec::new(),
            meta: PageMeta::default(),
            failed: true,
        }
    }
}

/// Issues descriptors against the store: a single descriptor directly,
/// several concurrently with a join-all. Errors never propagate; a failed
/// request becomes an empty, marked result so the caller can always
/// render.
pub struct FanoutExecutor<S: ContentStore + ?Sized> {
    store: Arc<S>,
    default_locale: String,
}

impl<S: ContentStore + ?Sized> FanoutExecutor<S> {
    pub fn new(store: Arc<S>, default_locale: &str) -> Self {
        Self {
            store,
            default_locale: default_locale.to_string(),
        }
    }

    pub async fn execute(&self, descriptors: &[QueryDescriptor]) -> Vec<LocaleResult> {
        match descriptors {
            [] => Vec::new(),
            [single] => vec![self.fetch_with_fallback(single).await],
            many => join_all(many.iter().map(|d| self.fetch_leg(d))).await,
        }
    }

    /// Single-descriptor path. An empty result for a non-default locale
    /// triggers one re-fetch against the default locale.
    async fn fetch_with_fallback(&self, descriptor: &QueryDescriptor) -> LocaleResult {
        match self.store.fetch(descriptor).await {
            Ok(page) if page.records.is_empty() && descriptor.locale != self.default_locale => {
                info!(
                    target: TARGET_CMS_REQUEST,
                    "No records for locale {}, retrying against {}",
                    descriptor.locale,
                    self.default_locale
                );
                let fallback = descriptor.with_locale(&self.default_locale);
                match self.store.fetch(&fallback).await {
                    Ok(page) => LocaleResult::from_page(self.default_locale.clone(), page),
                    Err(err) => {
                        error!(
                            target: TARGET_CMS_REQUEST,
                            "Fallback request for locale {} failed: {}",
                            self.default_locale,
                            err
                        );
                        LocaleResult::transport_failure(self.default_locale.clone())
                    }
                }
            }
            Ok(page) => LocaleResult::from_page(descriptor.locale.clone(), page),
            Err(err) => {
                error!(
                    target: TARGET_CMS_REQUEST,
                    "Request for locale {} failed: {}",
                    descriptor.locale,
                    err
                );
                LocaleResult::transport_failure(descriptor.locale.clone())
            }
        }
    }

    /// One leg of a fan-out. A failure degrades to an empty result so the
    /// other languages still display; no locale fallback, since each leg
    /// already targets an explicitly requested language.
    async fn fetch_leg(&self, descriptor: &QueryDescriptor) -> LocaleResult {
        match self.store.fetch(descriptor).await {
            Ok(page) => LocaleResult::from_page(descriptor.locale.clone(), page),
            Err(err) => {
                warn!(
                    target: TARGET_CMS_REQUEST,
                    "Dropping locale {} from fan-out: {}",
                    descriptor.locale,
                    err
                );
                LocaleResult::transport_failure(descriptor.locale.clone())
            }
        }
    }
}
