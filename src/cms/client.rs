//! HTTP client creation and the content-store port.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use tracing::debug;

use super::types::{CmsPage, PageMeta, RawRecord};
use crate::query::{self, QueryDescriptor};
use crate::TARGET_CMS_REQUEST;

/// Read access to the content store. Injected into the executor so tests
/// can script responses without a network.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn fetch(&self, descriptor: &QueryDescriptor) -> Result<CmsPage>;
}

/// Create the client used for store requests. No request timeout is
/// configured; a hung request is left to the scope that issued it.
pub fn create_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .gzip(true)
        .redirect(reqwest::redirect::Policy::default())
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Vec<RawRecord>,
    #[serde(default)]
    meta: EnvelopeMeta,
}

#[derive(Default, Deserialize)]
struct EnvelopeMeta {
    #[serde(default)]
    pagination: PageMeta,
}

/// Store implementation against the CMS REST surface.
pub struct HttpContentStore {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    api_token: Option<String>,
}

impl HttpContentStore {
    pub fn new(base_url: &str, collection: &str) -> Result<Self> {
        Ok(Self {
            client: create_http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: collection.to_string(),
            api_token: None,
        })
    }

    pub fn with_token(mut self, token: &str) -> Self {
        if !token.is_empty() {
            self.api_token = Some(token.to_string());
        }
        self
    }

    fn endpoint(&self, descriptor: &QueryDescriptor) -> String {
        format!(
            "{}/api/{}?{}",
            self.base_url,
            self.collection,
            query::to_query_string(descriptor)
        )
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn fetch(&self, descriptor: &QueryDescriptor) -> Result<CmsPage> {
        let url = self.endpoint(descriptor);
        debug!(target: TARGET_CMS_REQUEST, "Requesting {}", url);

        let mut request = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        if !response.status().is_success() {
            bail!(
                "Content store returned status {} for {}",
                response.status(),
                url
            );
        }

        let envelope: Envelope = response
            .json()
            .await
            .with_context(|| format!("Failed to decode response from {}", url))?;

        debug!(
            target: TARGET_CMS_REQUEST,
            "Received {} record(s) for locale {}",
            envelope.data.len(),
            descriptor.locale
        );

        Ok(CmsPage {
            records: envelope.data,
            meta: envelope.meta.pagination,
        })
    }
}
