//! Recommendation generation: prompt assembly, the chat-completion client,
//! salvage parsing of model output, and the Generate → Repair → Nudge ladder.
//!
//! The model is the decision engine for routing gifts to stores, but the
//! rules it applies are supplied verbatim by [`prompt`] and its output is
//! validated locally; nothing downstream trusts free-form model text.

pub mod generator;
pub mod llm;
pub mod parse;
pub mod prompt;

pub use generator::RecommendationGenerator;
pub use llm::{ChatMessage, LlmClient, OpenAiChatClient};
