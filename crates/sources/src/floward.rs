//! Floward (flowers/luxury) adapter: faceted query against a hosted
//! search-as-a-service index. The filter expression is assembled locally
//! (AND across facet groups, OR inside each group); the luxury keyword boost
//! is applied by the caller before the query text reaches this adapter's
//! `search`. No retry here: the HTTP client's timeout is the only guard and
//! failures propagate to the orchestrator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use giftroute_core::config::FlowardConfig;
use giftroute_core::{cache_key, AdapterError, Product, ResultCache, Store};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::adapter::{SearchConstraints, SourceAdapter};

/// Optional OR-groups over the index's facets. Each group is independently
/// optional; groups are joined by AND, members within a group by OR.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FacetFilters {
    pub recipients: Vec<String>,
    pub occasions: Vec<String>,
    pub categories: Vec<String>,
    pub brands: Vec<String>,
    pub colors: Vec<String>,
}

pub struct FlowardAdapter {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
    timeout: Duration,
    cache: Arc<ResultCache>,
}

impl FlowardAdapter {
    pub fn new(http: reqwest::Client, config: &FlowardConfig, cache: Arc<ResultCache>) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            cache,
        }
    }

    pub async fn search_with_facets(
        &self,
        query: &str,
        constraints: &SearchConstraints,
        facets: &FacetFilters,
    ) -> Result<Vec<Product>, AdapterError> {
        let filter = build_filter_expression(constraints, facets);
        let key = cache_key("products", &(Store::Floward, query, constraints, &filter));
        if let Some(cached) = self.cache.get_as::<Vec<Product>>(&key) {
            return Ok(cached);
        }

        let body = QueryBody { q: query, filter: &filter, limit: constraints.limit };
        let mut request = self.http.post(&self.endpoint).timeout(self.timeout).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await.map_err(|error| AdapterError::Http {
            store: Store::Floward,
            detail: error.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status { store: Store::Floward, status: status.as_u16() });
        }

        let payload: QueryResponse = response.json().await.map_err(|error| {
            AdapterError::Payload { store: Store::Floward, detail: error.to_string() }
        })?;

        let products = normalize_rows(payload.hits);
        self.cache.insert_as(&key, &products);
        Ok(products)
    }
}

#[async_trait]
impl SourceAdapter for FlowardAdapter {
    fn store(&self) -> Store {
        Store::Floward
    }

    async fn search(
        &self,
        query: &str,
        constraints: &SearchConstraints,
    ) -> Result<Vec<Product>, AdapterError> {
        self.search_with_facets(query, constraints, &FacetFilters::default()).await
    }
}

/// Stock flags, price bounds, then one OR-group per non-empty facet list.
pub fn build_filter_expression(constraints: &SearchConstraints, facets: &FacetFilters) -> String {
    let mut groups = vec!["(isInStock:true OR isPreOrder:true)".to_string()];

    if let Some(min) = constraints.min_price {
        groups.push(format!("price >= {min}"));
    }
    if let Some(max) = constraints.max_price {
        groups.push(format!("price <= {max}"));
    }

    for (field, values) in [
        ("recipients", &facets.recipients),
        ("occasions", &facets.occasions),
        ("categories", &facets.categories),
        ("brands", &facets.brands),
        ("colors", &facets.colors),
    ] {
        if let Some(group) = or_group(field, values) {
            groups.push(group);
        }
    }

    groups.join(" AND ")
}

fn or_group(field: &str, values: &[String]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let members: Vec<String> = values
        .iter()
        .map(|value| format!("{field}:\"{}\"", value.replace('"', "")))
        .collect();
    Some(format!("({})", members.join(" OR ")))
}

#[derive(Serialize)]
struct QueryBody<'a> {
    q: &'a str,
    filter: &'a str,
    limit: usize,
}

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawHit {
    #[serde(default)]
    pub(crate) id: Option<serde_json::Value>,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) price: Option<serde_json::Value>,
    #[serde(default, alias = "imageUrl")]
    pub(crate) image: Option<String>,
    #[serde(default)]
    pub(crate) slug: Option<String>,
    #[serde(default)]
    pub(crate) brand: Option<String>,
    #[serde(default)]
    pub(crate) source: Option<String>,
    #[serde(default)]
    pub(crate) tags: Vec<String>,
    #[serde(default)]
    pub(crate) ranking: Option<i64>,
}

pub(crate) fn normalize_rows(hits: Vec<RawHit>) -> Vec<Product> {
    let products = hits
        .into_iter()
        .map(|hit| Product {
            id: hit.id.as_ref().map(id_text).unwrap_or_default(),
            name: hit.name.unwrap_or_else(|| Product::FALLBACK_NAME.to_string()),
            price: hit.price.as_ref().and_then(giftroute_core::domain::product::price_text),
            image: hit.image,
            url: hit.slug,
            brand: hit.brand,
            source: hit
                .source
                .as_deref()
                .and_then(Store::parse)
                .unwrap_or(Store::Floward),
            tags: hit.tags,
            priority: hit.ranking,
        })
        .collect();
    Product::retain_matching_source(products, Store::Floward)
}

fn id_text(raw: &serde_json::Value) -> String {
    match raw {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use giftroute_core::Store;

    use super::{build_filter_expression, normalize_rows, FacetFilters, RawHit};
    use crate::adapter::SearchConstraints;

    #[test]
    fn minimal_filter_is_just_the_stock_clause() {
        let filter =
            build_filter_expression(&SearchConstraints::default(), &FacetFilters::default());
        assert_eq!(filter, "(isInStock:true OR isPreOrder:true)");
    }

    #[test]
    fn price_bounds_and_facets_join_with_and() {
        let constraints = SearchConstraints {
            min_price: Some(250.0),
            max_price: Some(500.0),
            limit: 30,
        };
        let facets = FacetFilters {
            recipients: vec!["her".to_string()],
            occasions: vec!["anniversary".to_string(), "valentine".to_string()],
            ..FacetFilters::default()
        };
        let filter = build_filter_expression(&constraints, &facets);
        assert_eq!(
            filter,
            "(isInStock:true OR isPreOrder:true) AND price >= 250 AND price <= 500 AND \
             (recipients:\"her\") AND (occasions:\"anniversary\" OR occasions:\"valentine\")"
        );
    }

    #[test]
    fn quotes_in_facet_values_are_stripped() {
        let facets = FacetFilters {
            brands: vec!["say \"it\" with flowers".to_string()],
            ..FacetFilters::default()
        };
        let filter = build_filter_expression(&SearchConstraints::default(), &facets);
        assert!(filter.contains("brands:\"say it with flowers\""));
    }

    #[test]
    fn hits_normalize_tolerantly_and_keep_only_floward_rows() {
        let hits = vec![
            RawHit {
                id: Some(serde_json::json!("sku-1")),
                name: Some("Rose Box".to_string()),
                price: Some(serde_json::json!(399)),
                ranking: Some(1),
                ..RawHit::default()
            },
            RawHit {
                name: Some("Laptop".to_string()),
                source: Some("JARIR".to_string()),
                ..RawHit::default()
            },
            RawHit::default(),
        ];
        let products = normalize_rows(hits);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Rose Box");
        assert_eq!(products[0].price.as_deref(), Some("399"));
        assert_eq!(products[1].name, "Unknown Product");
        assert!(products.iter().all(|product| product.source == Store::Floward));
    }
}
