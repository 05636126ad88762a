use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use giftroute_agent::{OpenAiChatClient, RecommendationGenerator};
use giftroute_core::config::AppConfig;
use giftroute_core::ResultCache;
use giftroute_sources::{
    build_registry, EnrichmentOrchestrator, FlowardAdapter, JarirAdapter, Limiter, NiceOneAdapter,
    SourceAdapter,
};
use tracing::{info, warn};

/// Everything the request handlers share. Built exactly once at startup;
/// caches and adapters are injected rather than reached for globally.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub generator: Option<Arc<RecommendationGenerator>>,
    pub orchestrator: Arc<EnrichmentOrchestrator>,
}

impl AppState {
    pub fn llm_configured(&self) -> bool {
        self.generator.is_some()
    }
}

pub fn bootstrap(config: AppConfig) -> Result<AppState> {
    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("failed to build shared http client")?;

    let recommendation_cache = Arc::new(ResultCache::new(Duration::from_secs(
        config.cache.recommendation_ttl_secs,
    )));
    let product_cache =
        Arc::new(ResultCache::new(Duration::from_secs(config.cache.product_ttl_secs)));

    let generator = match OpenAiChatClient::from_config(&config.llm)? {
        Some(client) => Some(Arc::new(RecommendationGenerator::new(
            Arc::new(client),
            recommendation_cache,
        ))),
        None => {
            warn!(
                event_name = "system.bootstrap.llm_missing",
                "no LLM API key configured, recommendation requests will fail until one is set"
            );
            None
        }
    };

    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(JarirAdapter::new(http.clone(), &config.sources.jarir, product_cache.clone())),
        Arc::new(NiceOneAdapter::new(
            http.clone(),
            &config.sources.niceone,
            product_cache.clone(),
        )),
        Arc::new(FlowardAdapter::new(http, &config.sources.floward, product_cache)),
    ];
    let orchestrator = Arc::new(EnrichmentOrchestrator::new(
        build_registry(adapters),
        Limiter::bounded(config.enrichment.max_concurrent),
        config.enrichment.max_products,
    ));

    info!(
        event_name = "system.bootstrap.ready",
        llm_configured = generator.is_some(),
        max_concurrent = config.enrichment.max_concurrent,
        "gift-routing state initialized"
    );

    Ok(AppState { config: Arc::new(config), generator, orchestrator })
}
