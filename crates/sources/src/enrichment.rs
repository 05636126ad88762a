//! Fans recommendation entries out to their target adapters under a global
//! concurrency cap and merges products back per entry. Failures stay local:
//! a batch of N entries always yields N entries, each carrying either
//! products or its own diagnostic message.

use giftroute_core::{GiftRecommendation, NormalizedSignals, Store};
use tracing::{debug, warn};

use crate::adapter::{AdapterRegistry, SearchConstraints};
use crate::boost::boost_luxury_keywords;
use crate::limiter::Limiter;

pub struct EnrichmentOrchestrator {
    adapters: AdapterRegistry,
    limiter: Limiter,
    max_products: usize,
}

impl EnrichmentOrchestrator {
    pub fn new(adapters: AdapterRegistry, limiter: Limiter, max_products: usize) -> Self {
        Self { adapters, limiter, max_products }
    }

    /// Output order equals input order regardless of completion order;
    /// downstream entry identity is positional.
    pub async fn enrich(
        &self,
        gifts: Vec<GiftRecommendation>,
        signals: &NormalizedSignals,
    ) -> Vec<GiftRecommendation> {
        let work = gifts
            .into_iter()
            .enumerate()
            .map(|(index, gift)| self.enrich_entry(index, gift, signals));
        futures::future::join_all(work).await
    }

    async fn enrich_entry(
        &self,
        index: usize,
        mut gift: GiftRecommendation,
        signals: &NormalizedSignals,
    ) -> GiftRecommendation {
        gift.id = Some(format!("gift-{index}"));

        let Some(store) = Store::parse(&gift.store) else {
            warn!(
                event_name = "enrich.entry.unknown_store",
                store = %gift.store,
                index,
                "recommendation targets an unknown store, skipping lookup"
            );
            gift.error = Some(format!("unknown store \"{}\"", gift.store.trim()));
            return gift;
        };
        let Some(adapter) = self.adapters.get(&store) else {
            gift.error = Some(format!("no adapter registered for store {store}"));
            return gift;
        };

        // Store-specific query shaping happens before the call; only the
        // luxury source gets the keyword boost.
        let query = match store {
            Store::Floward => boost_luxury_keywords(&gift.search_context),
            Store::Jarir | Store::NiceOne => gift.search_context.clone(),
        };
        let constraints = SearchConstraints {
            min_price: signals.min_price,
            max_price: signals.max_price,
            limit: self.max_products,
        };

        let _permit = self.limiter.acquire().await;
        match adapter.search(&query, &constraints).await {
            Ok(mut products) => {
                products.truncate(self.max_products);
                debug!(
                    event_name = "enrich.entry.matched",
                    index,
                    store = %store,
                    product_count = products.len(),
                    "entry enriched"
                );
                gift.product = products.first().cloned();
                gift.products = products;
            }
            Err(error) => {
                warn!(
                    event_name = "enrich.entry.failed",
                    index,
                    store = %store,
                    error = %error,
                    "adapter call failed, annotating entry"
                );
                gift.error = Some(error.enrichment_message(&query));
            }
        }
        gift.query = Some(query);
        gift
    }
}
