//! Prompt assembly for the three generator stages. Each builder is a pure
//! function from inputs to a message list, so the Generate → Repair → Nudge
//! ladder stays auditable and testable without a live model.

use giftroute_core::{
    BudgetBand, NormalizedSignals, OccasionTier, RelationshipTier, UserPreferences,
    GIFT_CATEGORIES,
};

use crate::llm::ChatMessage;

/// The deterministic rule set the model must apply. The model makes the
/// decisions; this text is the single source of the rules, so it must state
/// them precisely enough to be reproducible.
fn system_prompt() -> String {
    format!(
        "You are a gift-routing engine for a Saudi gifting service. Respond with ONE JSON \
         object only, matching exactly: {{\"gifts\": [{{\"category\": string, \"store\": \
         string, \"search_context\": string, \"modifier\": string}}]}}. Return 6 to 8 gift \
         entries.\n\
         Rules:\n\
         - Budget bands (SAR): Low is under 200, Mid is 200-499, High is 500 and above.\n\
         - Store values are exactly JARIR, NICEONE, or FLOWARD.\n\
         - Category to store mapping is fixed: flowers and luxury gifting go to FLOWARD; \
         tech, books, office and gaming go to JARIR; makeup, skincare, lenses, fragrance, \
         nails and home scents go to NICEONE.\n\
         - Romantic, formal, or close-relationship contexts prefer FLOWARD when the budget \
         allows. Practical or professional contexts prefer JARIR. Casual everyday beauty \
         prefers NICEONE.\n\
         - category must be one of: {}.\n\
         - Any flower or arrangement concept must use the category \"Gifts\".\n\
         - search_context carries 3 to 6 search keywords. FLOWARD entries may add quality \
         words like \"premium\" or \"luxury\"; JARIR entries \"bestseller\" or \
         \"trending\"; NICEONE entries \"affordable\" or \"popular\".\n\
         - modifier is a short human label for the card (e.g. \"For the avid reader\").",
        GIFT_CATEGORIES.join(", ")
    )
}

fn describe_band(band: BudgetBand) -> &'static str {
    match band {
        BudgetBand::Low => "low",
        BudgetBand::Mid => "mid",
        BudgetBand::High => "high",
    }
}

fn describe_relationship(tier: RelationshipTier) -> &'static str {
    match tier {
        RelationshipTier::Close => "close",
        RelationshipTier::Professional => "professional",
        RelationshipTier::Casual => "casual",
    }
}

fn describe_occasion(tier: OccasionTier) -> &'static str {
    match tier {
        OccasionTier::RomanticFormal => "romantic/formal",
        OccasionTier::Practical => "practical",
        OccasionTier::Casual => "casual",
    }
}

fn user_prompt(preferences: &UserPreferences, signals: &NormalizedSignals) -> String {
    let mut lines = vec!["Recipient profile:".to_string()];
    let mut push_field = |label: &str, value: &Option<String>| {
        if let Some(text) = value.as_deref().filter(|text| !text.trim().is_empty()) {
            lines.push(format!("- {label}: {text}"));
        }
    };
    push_field("age", &preferences.age);
    push_field("gender", &preferences.gender);
    push_field("relationship", &preferences.relationship);
    push_field("category", &preferences.category);
    push_field("budget", &preferences.budget);
    push_field("interests", &preferences.interests);
    push_field("notes", &preferences.description);

    lines.push(format!(
        "Derived signals: budget band {} (min {}, max {}), relationship {}, occasion {}, \
         gifts category allowed: {}.",
        describe_band(signals.budget_band),
        signals.min_price.map_or("none".to_string(), |price| price.to_string()),
        signals.max_price.map_or("none".to_string(), |price| price.to_string()),
        describe_relationship(signals.relationship_tier),
        describe_occasion(signals.occasion_tier),
        signals.allows_gifts_category,
    ));
    lines.push("Propose the gift set now.".to_string());
    lines.join("\n")
}

pub fn generate_messages(
    preferences: &UserPreferences,
    signals: &NormalizedSignals,
) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt()),
        ChatMessage::user(user_prompt(preferences, signals)),
    ]
}

/// Replays the failed conversation with the malformed output attached, asking
/// for the same content as valid JSON. Used exactly once, on parse failure.
pub fn repair_messages(original: &[ChatMessage], malformed: &str) -> Vec<ChatMessage> {
    let mut messages = original.to_vec();
    messages.push(ChatMessage::assistant(malformed));
    messages.push(ChatMessage::user(
        "The previous reply was not valid JSON for the required schema. Return the same \
         gift set as ONE valid JSON object matching {\"gifts\": [...]} and nothing else.",
    ));
    messages
}

/// Amended conversation for the luxury-inclusion rule. Same schema and count,
/// with an explicit instruction to include a FLOWARD Gifts entry.
pub fn nudge_messages(
    preferences: &UserPreferences,
    signals: &NormalizedSignals,
) -> Vec<ChatMessage> {
    let amended = format!(
        "{}\n- This recipient context qualifies for a luxury gesture: include at least one \
         entry with store FLOWARD and category \"Gifts\" (a premium flower arrangement or \
         luxury gift).",
        system_prompt()
    );
    vec![ChatMessage::system(amended), ChatMessage::user(user_prompt(preferences, signals))]
}

/// The conditional business rule: a luxury entry is expected for qualifying
/// contexts, but never forced on a Low budget or a blocked gifts category.
pub fn should_include_luxury(signals: &NormalizedSignals) -> bool {
    signals.allows_gifts_category
        && signals.budget_band != BudgetBand::Low
        && (signals.budget_band == BudgetBand::High
            || signals.relationship_tier == RelationshipTier::Close
            || signals.occasion_tier == OccasionTier::RomanticFormal)
}
