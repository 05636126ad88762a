//! The single user-facing operation: questionnaire preferences in, an
//! enriched recommendation set out. Generation failures are the only
//! top-level errors; enrichment failures ride along per entry.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use giftroute_core::{normalize_user_signals, GenerationError, GiftRecommendation, UserPreferences};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use crate::bootstrap::AppState;

#[derive(Debug, Serialize)]
pub struct GiftsResponse {
    pub gifts: Vec<GiftRecommendation>,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/api/recommendations", post(recommendations)).with_state(state)
}

async fn recommendations(
    State(state): State<AppState>,
    Json(preferences): Json<UserPreferences>,
) -> (StatusCode, Json<Value>) {
    let correlation_id = Uuid::new_v4().to_string();
    let signals = normalize_user_signals(&preferences);

    info!(
        event_name = "api.recommendations.received",
        correlation_id = %correlation_id,
        budget_band = ?signals.budget_band,
        relationship_tier = ?signals.relationship_tier,
        occasion_tier = ?signals.occasion_tier,
        enrich = preferences.enrich_with_products,
        "recommendation request accepted"
    );

    let Some(generator) = state.generator.as_ref() else {
        return generation_failure(&correlation_id, &GenerationError::NotConfigured);
    };

    let gifts = match generator.generate(&preferences, &signals).await {
        Ok(gifts) => gifts,
        Err(generation_error) => return generation_failure(&correlation_id, &generation_error),
    };

    let gifts = if preferences.enrich_with_products {
        state.orchestrator.enrich(gifts, &signals).await
    } else {
        gifts
    };

    let failed_entries = gifts.iter().filter(|gift| gift.error.is_some()).count();
    info!(
        event_name = "api.recommendations.completed",
        correlation_id = %correlation_id,
        gift_count = gifts.len(),
        failed_entries,
        "recommendation request completed"
    );

    (StatusCode::OK, Json(json!(GiftsResponse { gifts })))
}

fn generation_failure(
    correlation_id: &str,
    generation_error: &GenerationError,
) -> (StatusCode, Json<Value>) {
    error!(
        event_name = "api.recommendations.generation_failed",
        correlation_id = %correlation_id,
        error = %generation_error,
        "recommendation generation failed"
    );
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": generation_error.to_string() })))
}
