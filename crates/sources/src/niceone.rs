//! NiceOne (beauty) adapter: keyword search against the store's first-party
//! admin API. The API gates on a browser-looking client, so requests carry a
//! fixed fingerprint plus a configured session cookie. Failures propagate:
//! this adapter also backs direct user-facing search, where a silent empty
//! result would be indistinguishable from "no matches".

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use giftroute_core::config::NiceOneConfig;
use giftroute_core::{cache_key, AdapterError, Product, ResultCache, Store};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::adapter::{SearchConstraints, SourceAdapter};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub struct NiceOneAdapter {
    http: reqwest::Client,
    endpoint: String,
    session_cookie: Option<SecretString>,
    timeout: Duration,
    cache: Arc<ResultCache>,
}

impl NiceOneAdapter {
    pub fn new(http: reqwest::Client, config: &NiceOneConfig, cache: Arc<ResultCache>) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            session_cookie: config.session_cookie.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            cache,
        }
    }
}

#[async_trait]
impl SourceAdapter for NiceOneAdapter {
    fn store(&self) -> Store {
        Store::NiceOne
    }

    async fn search(
        &self,
        query: &str,
        constraints: &SearchConstraints,
    ) -> Result<Vec<Product>, AdapterError> {
        let key = cache_key("products", &(Store::NiceOne, query, constraints));
        if let Some(cached) = self.cache.get_as::<Vec<Product>>(&key) {
            return Ok(cached);
        }

        let mut request = self
            .http
            .get(&self.endpoint)
            .timeout(self.timeout)
            .query(&[
                ("route", "rest/product_admin/products"),
                ("search", query),
                ("sort", "p.popularity"),
                ("order", "DESC"),
                ("limit", &constraints.limit.to_string()),
            ])
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json, text/plain, */*")
            .header("Accept-Language", "en-US,en;q=0.9,ar;q=0.8")
            .header("X-Requested-With", "XMLHttpRequest");
        if let Some(cookie) = &self.session_cookie {
            request = request.header("Cookie", cookie.expose_secret());
        }

        let response = request.send().await.map_err(|error| AdapterError::Http {
            store: Store::NiceOne,
            detail: error.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status { store: Store::NiceOne, status: status.as_u16() });
        }

        let payload: AdminResponse = response.json().await.map_err(|error| {
            AdapterError::Payload { store: Store::NiceOne, detail: error.to_string() }
        })?;
        if payload.success != 1 {
            return Err(AdapterError::Payload {
                store: Store::NiceOne,
                detail: format!("admin API reported success={}", payload.success),
            });
        }

        let products = normalize_rows(payload.data);
        self.cache.insert_as(&key, &products);
        Ok(products)
    }
}

#[derive(Debug, Default, Deserialize)]
struct AdminResponse {
    #[serde(default)]
    success: i64,
    #[serde(default)]
    data: Vec<RawRow>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawRow {
    #[serde(default)]
    pub(crate) product_id: Option<serde_json::Value>,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) price: Option<serde_json::Value>,
    #[serde(default, alias = "image")]
    pub(crate) thumb: Option<String>,
    #[serde(default)]
    pub(crate) seo_url: Option<String>,
    #[serde(default)]
    pub(crate) manufacturer: Option<String>,
    #[serde(default)]
    pub(crate) source: Option<String>,
    #[serde(default)]
    pub(crate) popularity: Option<i64>,
}

pub(crate) fn normalize_rows(rows: Vec<RawRow>) -> Vec<Product> {
    let products = rows
        .into_iter()
        .map(|row| Product {
            id: row
                .product_id
                .as_ref()
                .map(id_text)
                .unwrap_or_default(),
            name: row.name.unwrap_or_else(|| Product::FALLBACK_NAME.to_string()),
            price: row.price.as_ref().and_then(giftroute_core::domain::product::price_text),
            image: row.thumb,
            url: row.seo_url,
            brand: row.manufacturer,
            source: row
                .source
                .as_deref()
                .and_then(Store::parse)
                .unwrap_or(Store::NiceOne),
            tags: Vec::new(),
            priority: row.popularity,
        })
        .collect();
    Product::retain_matching_source(products, Store::NiceOne)
}

fn id_text(raw: &serde_json::Value) -> String {
    match raw {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
