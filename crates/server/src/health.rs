use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::bootstrap::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub language_model: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let language_model = llm_check(&state);
    let ready = language_model.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "giftroute-server runtime initialized".to_string(),
        },
        language_model,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn llm_check(state: &AppState) -> HealthCheck {
    if state.llm_configured() {
        HealthCheck {
            status: "ready",
            detail: format!("model \"{}\" configured", state.config.llm.model),
        }
    } else {
        HealthCheck {
            status: "degraded",
            detail: "no language model API key configured".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};
    use giftroute_core::config::AppConfig;
    use giftroute_sources::{build_registry, EnrichmentOrchestrator, Limiter};

    use crate::bootstrap::AppState;
    use crate::health::health;

    fn state_without_llm() -> AppState {
        AppState {
            config: Arc::new(AppConfig::default()),
            generator: None,
            orchestrator: Arc::new(EnrichmentOrchestrator::new(
                build_registry(Vec::new()),
                Limiter::bounded(3),
                30,
            )),
        }
    }

    fn state_with_llm() -> AppState {
        use std::time::Duration;

        use anyhow::Result;
        use async_trait::async_trait;
        use giftroute_agent::{ChatMessage, LlmClient, RecommendationGenerator};
        use giftroute_core::ResultCache;

        struct SilentLlm;

        #[async_trait]
        impl LlmClient for SilentLlm {
            async fn chat(&self, _messages: &[ChatMessage], _json: bool) -> Result<String> {
                Ok(String::new())
            }
        }

        AppState {
            generator: Some(Arc::new(RecommendationGenerator::new(
                Arc::new(SilentLlm),
                Arc::new(ResultCache::new(Duration::from_secs(3600))),
            ))),
            ..state_without_llm()
        }
    }

    #[tokio::test]
    async fn health_degrades_when_no_language_model_is_configured() {
        let (status, Json(payload)) = health(State(state_without_llm())).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.service.status, "ready");
        assert_eq!(payload.language_model.status, "degraded");
    }

    #[tokio::test]
    async fn health_reports_ready_with_a_configured_model() {
        let (status, Json(payload)) = health(State(state_with_llm())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert!(payload.language_model.detail.contains("configured"));
    }
}
