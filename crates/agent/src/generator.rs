use std::sync::Arc;

use giftroute_core::{
    cache_key, GenerationError, GiftRecommendation, NormalizedSignals, ResultCache, Store,
    UserPreferences,
};
use tracing::{debug, info, warn};

use crate::llm::LlmClient;
use crate::{parse, prompt};

/// Drives the model through the Generate → Repair → Nudge ladder and caches
/// accepted results for the TTL configured on the injected cache.
pub struct RecommendationGenerator {
    llm: Arc<dyn LlmClient>,
    cache: Arc<ResultCache>,
}

impl RecommendationGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, cache: Arc<ResultCache>) -> Self {
        Self { llm, cache }
    }

    pub async fn generate(
        &self,
        preferences: &UserPreferences,
        signals: &NormalizedSignals,
    ) -> Result<Vec<GiftRecommendation>, GenerationError> {
        let key = cache_key("recommendations", &(preferences, signals));
        if let Some(cached) = self.cache.get_as::<Vec<GiftRecommendation>>(&key) {
            debug!(event_name = "gifts.generate.cache_hit", cache_key = %key, "returning cached recommendation set");
            return Ok(cached);
        }

        let messages = prompt::generate_messages(preferences, signals);
        let raw = self
            .llm
            .chat(&messages, true)
            .await
            .map_err(|error| GenerationError::Upstream { detail: error.to_string() })?;

        let plan = match parse::parse_gift_plan(&raw) {
            Ok(plan) => plan,
            Err(parse_error) => {
                warn!(
                    event_name = "gifts.generate.repair",
                    error = %parse_error,
                    "model output failed schema parse, issuing one repair re-prompt"
                );
                let repair = prompt::repair_messages(&messages, &raw);
                let repaired_raw = self
                    .llm
                    .chat(&repair, true)
                    .await
                    .map_err(|error| GenerationError::Upstream { detail: error.to_string() })?;
                parse::parse_gift_plan(&repaired_raw).map_err(|error| {
                    GenerationError::Malformed { detail: error.to_string() }
                })?
            }
        };

        if plan.gifts.is_empty() {
            return Err(GenerationError::Empty);
        }

        let gifts = self.enforce_luxury_rule(plan.gifts, preferences, signals).await;

        self.cache.insert_as(&key, &gifts);
        info!(
            event_name = "gifts.generate.accepted",
            gift_count = gifts.len(),
            "recommendation set accepted"
        );
        Ok(gifts)
    }

    /// One nudged re-generation when a qualifying context came back without a
    /// luxury entry. The nudged output only replaces the first pass when it
    /// parses and actually fixes the omission; otherwise the first pass
    /// stands, since a usable set beats a failed correction.
    async fn enforce_luxury_rule(
        &self,
        gifts: Vec<GiftRecommendation>,
        preferences: &UserPreferences,
        signals: &NormalizedSignals,
    ) -> Vec<GiftRecommendation> {
        if !prompt::should_include_luxury(signals) || has_luxury_entry(&gifts) {
            return gifts;
        }

        info!(
            event_name = "gifts.generate.nudge",
            "qualifying context lacks a FLOWARD entry, issuing one nudged call"
        );
        match self.llm.chat(&prompt::nudge_messages(preferences, signals), true).await {
            Ok(raw) => match parse::parse_gift_plan(&raw) {
                Ok(nudged) if !nudged.gifts.is_empty() && has_luxury_entry(&nudged.gifts) => {
                    nudged.gifts
                }
                Ok(_) => {
                    warn!(
                        event_name = "gifts.generate.nudge_unsatisfied",
                        "nudged output still lacks a FLOWARD entry, keeping first pass"
                    );
                    gifts
                }
                Err(error) => {
                    warn!(
                        event_name = "gifts.generate.nudge_malformed",
                        error = %error,
                        "nudged output failed to parse, keeping first pass"
                    );
                    gifts
                }
            },
            Err(error) => {
                warn!(
                    event_name = "gifts.generate.nudge_failed",
                    error = %error,
                    "nudge call failed, keeping first pass"
                );
                gifts
            }
        }
    }
}

fn has_luxury_entry(gifts: &[GiftRecommendation]) -> bool {
    gifts.iter().any(|gift| Store::parse(&gift.store) == Some(Store::Floward))
}
