//! Domain types and deterministic building blocks for the gift-routing
//! pipeline: questionnaire preferences, normalized decision signals, the
//! shared result cache, the error taxonomy, and process configuration.
//!
//! Everything here is side-effect free; network I/O lives in the `agent`
//! (language model) and `sources` (store adapters) crates.

pub mod cache;
pub mod config;
pub mod domain;
pub mod errors;
pub mod signals;

pub use cache::{cache_key, ResultCache};
pub use domain::preferences::UserPreferences;
pub use domain::product::{Product, Store};
pub use domain::recommendation::{GiftPlan, GiftRecommendation, GIFT_CATEGORIES};
pub use errors::{AdapterError, GenerationError};
pub use signals::{
    normalize_user_signals, BudgetBand, NormalizedSignals, OccasionTier, RelationshipTier,
};
