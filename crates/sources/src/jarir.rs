//! Jarir (books/electronics) adapter: autocomplete search against a hosted
//! index, strict trending/bestseller post-filter, and a suppress-to-empty
//! failure policy so that one flaky index never breaks an enrichment batch.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use giftroute_core::config::JarirConfig;
use giftroute_core::{cache_key, AdapterError, Product, ResultCache, Store};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::adapter::{SearchConstraints, SourceAdapter};

/// Only rows the index itself marks as currently hot are kept. When nothing
/// qualifies the adapter returns nothing: precision over recall, a stated
/// product decision, not a bug to fix with a fallback.
const KEPT_TAGS: &[&str] = &["Trending Now", "Best Sellers"];

const MAX_RETRIES: u32 = 2;

pub struct JarirAdapter {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    cache: Arc<ResultCache>,
}

impl JarirAdapter {
    pub fn new(http: reqwest::Client, config: &JarirConfig, cache: Arc<ResultCache>) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            cache,
        }
    }

    async fn fetch(
        &self,
        query: &str,
        constraints: &SearchConstraints,
    ) -> Result<Vec<RawRow>, AdapterError> {
        let response = self
            .http
            .get(&self.endpoint)
            .timeout(self.timeout)
            .query(&[("q", query), ("rows", &constraints.limit.to_string())])
            .send()
            .await
            .map_err(|error| AdapterError::Http {
                store: Store::Jarir,
                detail: error.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status { store: Store::Jarir, status: status.as_u16() });
        }

        let payload: AutocompleteResponse = response.json().await.map_err(|error| {
            AdapterError::Payload { store: Store::Jarir, detail: error.to_string() }
        })?;
        Ok(payload.response.products)
    }
}

#[async_trait]
impl SourceAdapter for JarirAdapter {
    fn store(&self) -> Store {
        Store::Jarir
    }

    async fn search(
        &self,
        query: &str,
        constraints: &SearchConstraints,
    ) -> Result<Vec<Product>, AdapterError> {
        let key = cache_key("products", &(Store::Jarir, query, constraints));
        if let Some(cached) = self.cache.get_as::<Vec<Product>>(&key) {
            return Ok(cached);
        }

        let mut attempt = 0u32;
        let products = loop {
            match self.fetch(query, constraints).await {
                Ok(rows) => break normalize_rows(rows),
                Err(error) if attempt < MAX_RETRIES => {
                    attempt += 1;
                    debug!(
                        event_name = "sources.jarir.retry",
                        attempt,
                        error = %error,
                        "jarir search failed, backing off"
                    );
                    tokio::time::sleep(backoff_delay(attempt)).await;
                }
                Err(error) => {
                    // Exhausted retries: this source degrades to "no results"
                    // rather than failing the recommendation it backs.
                    warn!(
                        event_name = "sources.jarir.suppressed",
                        error = %error,
                        %query,
                        "jarir search failed after retries, returning empty"
                    );
                    break Vec::new();
                }
            }
        };

        self.cache.insert_as(&key, &products);
        Ok(products)
    }
}

/// Linear backoff: 1s after the first failure, 2s after the second.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(u64::from(attempt))
}

#[derive(Debug, Default, Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    response: AutocompleteBody,
}

#[derive(Debug, Default, Deserialize)]
struct AutocompleteBody {
    #[serde(default)]
    products: Vec<RawRow>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawRow {
    #[serde(default)]
    pub(crate) sku: Option<String>,
    #[serde(default, alias = "title")]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) price: Option<serde_json::Value>,
    #[serde(default, alias = "imageUrl")]
    pub(crate) image_url: Option<String>,
    #[serde(default, alias = "productUrl")]
    pub(crate) product_url: Option<String>,
    #[serde(default)]
    pub(crate) brand: Option<String>,
    #[serde(default)]
    pub(crate) source: Option<String>,
    #[serde(default)]
    pub(crate) tags: Vec<String>,
}

/// Tag filter, tolerant normalization, then the source-agreement filter.
pub(crate) fn normalize_rows(rows: Vec<RawRow>) -> Vec<Product> {
    let products = rows
        .into_iter()
        .filter(is_trending_or_bestseller)
        .map(|row| Product {
            id: row.sku.unwrap_or_default(),
            name: row.name.unwrap_or_else(|| Product::FALLBACK_NAME.to_string()),
            price: row.price.as_ref().and_then(giftroute_core::domain::product::price_text),
            image: row.image_url,
            url: row.product_url,
            brand: row.brand,
            source: row
                .source
                .as_deref()
                .and_then(Store::parse)
                .unwrap_or(Store::Jarir),
            tags: row.tags,
            priority: None,
        })
        .collect();
    Product::retain_matching_source(products, Store::Jarir)
}

fn is_trending_or_bestseller(row: &RawRow) -> bool {
    row.tags.iter().any(|tag| KEPT_TAGS.iter().any(|kept| tag.eq_ignore_ascii_case(kept)))
}
