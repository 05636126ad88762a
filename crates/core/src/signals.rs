//! Turns noisy questionnaire text into the canonical decision variables the
//! routing rules operate on. Pure functions, no I/O, deterministic defaults
//! for every absent input.

use serde::{Deserialize, Serialize};

use crate::domain::preferences::UserPreferences;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetBand {
    Low,
    Mid,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipTier {
    Close,
    Professional,
    Casual,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccasionTier {
    RomanticFormal,
    Practical,
    Casual,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSignals {
    pub budget_band: BudgetBand,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub relationship_tier: RelationshipTier,
    pub occasion_tier: OccasionTier,
    pub allows_gifts_category: bool,
}

impl Default for NormalizedSignals {
    fn default() -> Self {
        Self {
            budget_band: BudgetBand::Mid,
            min_price: None,
            max_price: None,
            relationship_tier: RelationshipTier::Casual,
            occasion_tier: OccasionTier::Casual,
            allows_gifts_category: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParsedBudget {
    pub budget_band: BudgetBand,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

const CLOSE_RELATION_WORDS: &[&str] = &[
    "wife", "husband", "spouse", "fiance", "fiancee", "partner", "girlfriend", "boyfriend",
    "mother", "mom", "father", "dad", "parent", "sister", "brother", "sibling", "son", "daughter",
    "child", "kids", "family", "grandmother", "grandfather", "grandma", "grandpa",
];

const PROFESSIONAL_RELATION_WORDS: &[&str] = &[
    "colleague", "coworker", "co-worker", "boss", "manager", "client", "customer", "teacher",
    "mentor", "professor", "employee", "doctor", "business",
];

const ROMANTIC_FORMAL_WORDS: &[&str] = &[
    "anniversary", "wedding", "valentine", "romantic", "romance", "engagement", "proposal",
    "love", "formal", "elegant", "graduation",
];

const PRACTICAL_WORDS: &[&str] =
    &["work", "office", "practical", "useful", "study", "school", "desk", "everyday"];

/// Categories that exclude the dedicated gifts/luxury routing. "gifts" and
/// "premium" are always permitted even though they look like members of the
/// same taxonomy.
const NON_GIFT_CATEGORIES: &[&str] = &[
    "devices",
    "perfume",
    "makeup",
    "personal care",
    "personal-care",
    "health & nutrition",
    "health and nutrition",
    "health-nutrition",
    "nails",
    "lenses",
    "home scents",
    "home-scents",
    "food & drink",
    "food and drink",
    "food-drink",
];

/// Fallback used for band classification when no number parses at all.
const DEFAULT_BUDGET_HINT: f64 = 300.0;

pub fn normalize_user_signals(preferences: &UserPreferences) -> NormalizedSignals {
    let budget = normalize_budget(preferences.budget.as_deref().unwrap_or(""));
    NormalizedSignals {
        budget_band: budget.budget_band,
        min_price: budget.min_price,
        max_price: budget.max_price,
        relationship_tier: normalize_relationship(
            preferences.relationship.as_deref().unwrap_or(""),
        ),
        occasion_tier: normalize_occasion(preferences.description.as_deref().unwrap_or("")),
        allows_gifts_category: allows_gifts_category(
            preferences.category.as_deref().unwrap_or(""),
        ),
    }
}

/// Parses a free-text budget: ranges ("300-450", "300 to 450"), bounded
/// forms ("under 200", "> 500"), approximations ("~300", "around 300"), or a
/// bare number. Anything unparseable degrades to the Mid default.
pub fn normalize_budget(text: &str) -> ParsedBudget {
    let normalized = text.replace(',', "").replace(char::is_whitespace, "").to_lowercase();

    let (min_price, max_price) = if normalized.is_empty() {
        (None, None)
    } else if let Some((low, high)) = split_range(&normalized) {
        (parse_number(low), parse_number(high))
    } else if let Some(rest) =
        normalized.strip_prefix("under").or_else(|| normalized.strip_prefix('<'))
    {
        (None, parse_number(rest))
    } else if let Some(rest) =
        normalized.strip_prefix("over").or_else(|| normalized.strip_prefix('>'))
    {
        (parse_number(rest), None)
    } else if let Some(rest) =
        normalized.strip_prefix('~').or_else(|| normalized.strip_prefix("around"))
    {
        match parse_number(rest) {
            Some(center) => (Some((center - 50.0).max(0.0)), Some(center + 50.0)),
            None => (None, None),
        }
    } else {
        let bare = parse_number(&normalized);
        (bare, bare)
    };

    let effective = max_price.or(min_price).unwrap_or(DEFAULT_BUDGET_HINT);
    let budget_band = if effective < 200.0 {
        BudgetBand::Low
    } else if effective >= 500.0 {
        BudgetBand::High
    } else {
        BudgetBand::Mid
    };

    ParsedBudget { budget_band, min_price, max_price }
}

pub fn normalize_relationship(text: &str) -> RelationshipTier {
    let normalized = text.to_lowercase();
    if normalized.is_empty() {
        return RelationshipTier::Casual;
    }
    // Close relations win over professional when both match ("family doctor").
    if CLOSE_RELATION_WORDS.iter().any(|word| normalized.contains(word)) {
        return RelationshipTier::Close;
    }
    if PROFESSIONAL_RELATION_WORDS.iter().any(|word| normalized.contains(word)) {
        return RelationshipTier::Professional;
    }
    RelationshipTier::Casual
}

pub fn normalize_occasion(text: &str) -> OccasionTier {
    let normalized = text.to_lowercase();
    if normalized.is_empty() {
        return OccasionTier::Casual;
    }
    if ROMANTIC_FORMAL_WORDS.iter().any(|word| normalized.contains(word)) {
        return OccasionTier::RomanticFormal;
    }
    if PRACTICAL_WORDS.iter().any(|word| normalized.contains(word)) {
        return OccasionTier::Practical;
    }
    OccasionTier::Casual
}

pub fn allows_gifts_category(category: &str) -> bool {
    let normalized = category.trim().to_lowercase();
    if normalized.is_empty() || normalized == "gifts" || normalized == "premium" {
        return true;
    }
    !NON_GIFT_CATEGORIES.contains(&normalized.as_str())
}

fn split_range(normalized: &str) -> Option<(&str, &str)> {
    if let Some((low, high)) = normalized.split_once('-') {
        if !low.is_empty() && !high.is_empty() {
            return Some((low, high));
        }
    }
    // "300to450" after whitespace stripping.
    if let Some((low, high)) = normalized.split_once("to") {
        if !low.is_empty() && !high.is_empty() && low.chars().all(|c| c.is_ascii_digit() || c == '.')
        {
            return Some((low, high));
        }
    }
    None
}

fn parse_number(raw: &str) -> Option<f64> {
    let digits: String =
        raw.chars().filter(|character| character.is_ascii_digit() || *character == '.').collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok().filter(|value| value.is_finite() && *value >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::{
        allows_gifts_category, normalize_budget, normalize_occasion, normalize_relationship,
        normalize_user_signals, BudgetBand, NormalizedSignals, OccasionTier, RelationshipTier,
    };
    use crate::domain::preferences::UserPreferences;

    #[test]
    fn parses_hyphenated_and_worded_ranges() {
        let parsed = normalize_budget("300-450");
        assert_eq!(parsed.min_price, Some(300.0));
        assert_eq!(parsed.max_price, Some(450.0));
        assert_eq!(parsed.budget_band, BudgetBand::Mid);

        let parsed = normalize_budget("300 to 450");
        assert_eq!(parsed.min_price, Some(300.0));
        assert_eq!(parsed.max_price, Some(450.0));

        let parsed = normalize_budget("1,000 - 1,500");
        assert_eq!(parsed.min_price, Some(1000.0));
        assert_eq!(parsed.max_price, Some(1500.0));
        assert_eq!(parsed.budget_band, BudgetBand::High);
    }

    #[test]
    fn parses_bounded_forms() {
        let parsed = normalize_budget("under 200");
        assert_eq!(parsed.min_price, None);
        assert_eq!(parsed.max_price, Some(200.0));
        assert_eq!(parsed.budget_band, BudgetBand::Mid);

        let parsed = normalize_budget("< 150 SAR");
        assert_eq!(parsed.max_price, Some(150.0));
        assert_eq!(parsed.budget_band, BudgetBand::Low);

        let parsed = normalize_budget("over 500");
        assert_eq!(parsed.min_price, Some(500.0));
        assert_eq!(parsed.max_price, None);
        assert_eq!(parsed.budget_band, BudgetBand::High);
    }

    #[test]
    fn parses_approximate_budget_as_center_plus_minus_fifty() {
        let parsed = normalize_budget("~300");
        assert_eq!(parsed.min_price, Some(250.0));
        assert_eq!(parsed.max_price, Some(350.0));
        assert_eq!(parsed.budget_band, BudgetBand::Mid);

        let parsed = normalize_budget("around 600");
        assert_eq!(parsed.min_price, Some(550.0));
        assert_eq!(parsed.max_price, Some(650.0));
        assert_eq!(parsed.budget_band, BudgetBand::High);
    }

    #[test]
    fn bare_number_is_both_bounds() {
        let parsed = normalize_budget("600");
        assert_eq!(parsed.min_price, Some(600.0));
        assert_eq!(parsed.max_price, Some(600.0));
        assert_eq!(parsed.budget_band, BudgetBand::High);
    }

    #[test]
    fn empty_or_garbage_budget_yields_the_mid_default() {
        for raw in ["", "   ", "whatever fits"] {
            let parsed = normalize_budget(raw);
            assert_eq!(parsed.budget_band, BudgetBand::Mid, "input {raw:?}");
            assert_eq!(parsed.min_price, None);
            assert_eq!(parsed.max_price, None);
        }
    }

    #[test]
    fn band_boundaries_are_inclusive_exactly_as_contracted() {
        assert_eq!(normalize_budget("199").budget_band, BudgetBand::Low);
        assert_eq!(normalize_budget("200").budget_band, BudgetBand::Mid);
        assert_eq!(normalize_budget("499").budget_band, BudgetBand::Mid);
        assert_eq!(normalize_budget("500").budget_band, BudgetBand::High);
    }

    #[test]
    fn relationship_keywords_map_to_tiers() {
        assert_eq!(normalize_relationship("my wife"), RelationshipTier::Close);
        assert_eq!(normalize_relationship("Grandmother"), RelationshipTier::Close);
        assert_eq!(normalize_relationship("my boss at work"), RelationshipTier::Professional);
        assert_eq!(normalize_relationship("a client"), RelationshipTier::Professional);
        assert_eq!(normalize_relationship("friend"), RelationshipTier::Casual);
        assert_eq!(normalize_relationship(""), RelationshipTier::Casual);
    }

    #[test]
    fn close_relation_wins_when_both_lists_match() {
        assert_eq!(normalize_relationship("family doctor"), RelationshipTier::Close);
    }

    #[test]
    fn occasion_keywords_map_to_tiers() {
        assert_eq!(normalize_occasion("our wedding anniversary"), OccasionTier::RomanticFormal);
        assert_eq!(normalize_occasion("something useful for the office"), OccasionTier::Practical);
        assert_eq!(normalize_occasion("just because"), OccasionTier::Casual);
        assert_eq!(normalize_occasion(""), OccasionTier::Casual);
    }

    #[test]
    fn restrictive_categories_disable_gifts_routing() {
        assert!(!allows_gifts_category("Devices"));
        assert!(!allows_gifts_category("home scents"));
        assert!(!allows_gifts_category("Food & Drink"));
        assert!(allows_gifts_category("Gifts"));
        assert!(allows_gifts_category("premium"));
        assert!(allows_gifts_category(""));
        assert!(allows_gifts_category("Books"));
    }

    #[test]
    fn normalization_is_idempotent_over_the_same_preferences() {
        let preferences = UserPreferences {
            budget: Some("300-450".to_string()),
            relationship: Some("Wife".to_string()),
            description: Some("anniversary dinner".to_string()),
            category: Some("Devices".to_string()),
            ..UserPreferences::default()
        };
        let first = normalize_user_signals(&preferences);
        let second = normalize_user_signals(&preferences);
        assert_eq!(first, second);
        assert_eq!(first.relationship_tier, RelationshipTier::Close);
        assert_eq!(first.occasion_tier, OccasionTier::RomanticFormal);
        assert!(!first.allows_gifts_category);
    }

    #[test]
    fn absent_preferences_yield_the_documented_defaults() {
        let signals = normalize_user_signals(&UserPreferences::default());
        assert_eq!(signals, NormalizedSignals::default());
    }

    #[test]
    fn high_budget_close_relationship_scenario() {
        let preferences = UserPreferences {
            budget: Some("600".to_string()),
            relationship: Some("wife".to_string()),
            category: Some(String::new()),
            ..UserPreferences::default()
        };
        let signals = normalize_user_signals(&preferences);
        assert_eq!(signals.budget_band, BudgetBand::High);
        assert_eq!(signals.relationship_tier, RelationshipTier::Close);
        assert!(signals.allows_gifts_category);
    }
}
