use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use giftroute_core::{AdapterError, Product, Store};
use serde::Serialize;

/// Effective search parameters shared by all three adapters. Price bounds come
/// from the normalized budget; `limit` caps how many rows an adapter asks for.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SearchConstraints {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub limit: usize,
}

impl Default for SearchConstraints {
    fn default() -> Self {
        Self { min_price: None, max_price: None, limit: 30 }
    }
}

/// One external product source behind a common search shape. Request shape,
/// auth, and response normalization are store-specific, so each store gets
/// its own implementation rather than one parameterized client.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn store(&self) -> Store;

    async fn search(
        &self,
        query: &str,
        constraints: &SearchConstraints,
    ) -> Result<Vec<Product>, AdapterError>;
}

/// Store-keyed lookup table; the orchestrator resolves target adapters here.
pub type AdapterRegistry = HashMap<Store, Arc<dyn SourceAdapter>>;

pub fn build_registry(adapters: Vec<Arc<dyn SourceAdapter>>) -> AdapterRegistry {
    adapters.into_iter().map(|adapter| (adapter.store(), adapter)).collect()
}


#[cfg(test)]
mod tests {
    use giftroute_core::Store;

    use super::testing::StubAdapter;
    use super::{build_registry, SearchConstraints};

    #[test]
    fn registry_is_keyed_by_store() {
        let registry = build_registry(vec![
            StubAdapter::new(Store::Jarir, Ok(Vec::new())),
            StubAdapter::new(Store::Floward, Ok(Vec::new())),
        ]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains_key(&Store::Jarir));
        assert!(registry.contains_key(&Store::Floward));
        assert!(!registry.contains_key(&Store::NiceOne));
    }

    #[test]
    fn default_constraints_cap_at_thirty() {
        let constraints = SearchConstraints::default();
        assert_eq!(constraints.limit, 30);
        assert_eq!(constraints.min_price, None);
    }
}
