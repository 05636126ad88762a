use thiserror::Error;

use crate::domain::product::Store;

/// Failures in the recommendation-generation phase. There is nothing to
/// enrich without recommendations, so every variant is fatal for the request.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("language model client is not configured")]
    NotConfigured,
    #[error("model output failed schema validation after repair: {detail}")]
    Malformed { detail: String },
    #[error("model produced zero recommendations")]
    Empty,
    #[error("language model call failed: {detail}")]
    Upstream { detail: String },
}

/// Failures talking to one external store. Policy differs per adapter: Jarir
/// retries then suppresses to an empty result, NiceOne and Floward propagate.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("{store} request failed: {detail}")]
    Http { store: Store, detail: String },
    #[error("{store} returned status {status}")]
    Status { store: Store, status: u16 },
    #[error("{store} payload could not be interpreted: {detail}")]
    Payload { store: Store, detail: String },
}

impl AdapterError {
    pub fn store(&self) -> Store {
        match self {
            Self::Http { store, .. } | Self::Payload { store, .. } | Self::Status { store, .. } => {
                *store
            }
        }
    }

    /// The per-entry annotation the orchestrator attaches when this adapter
    /// failure must not abort the batch.
    pub fn enrichment_message(&self, query: &str) -> String {
        format!("product lookup for \"{query}\" failed: {self}")
    }
}

#[cfg(test)]
mod tests {
    use super::{AdapterError, GenerationError};
    use crate::domain::product::Store;

    #[test]
    fn adapter_errors_carry_their_store() {
        let error = AdapterError::Status { store: Store::NiceOne, status: 502 };
        assert_eq!(error.store(), Store::NiceOne);
        assert_eq!(error.to_string(), "NICEONE returned status 502");
    }

    #[test]
    fn enrichment_message_names_the_attempted_query() {
        let error =
            AdapterError::Http { store: Store::Floward, detail: "connection reset".to_string() };
        let message = error.enrichment_message("luxury rose bouquet");
        assert!(message.contains("luxury rose bouquet"));
        assert!(message.contains("FLOWARD"));
    }

    #[test]
    fn generation_errors_render_operator_friendly_text() {
        assert_eq!(
            GenerationError::Empty.to_string(),
            "model produced zero recommendations"
        );
        assert!(GenerationError::Malformed { detail: "missing gifts".to_string() }
            .to_string()
            .contains("after repair"));
    }
}
