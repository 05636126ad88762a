use serde::{Deserialize, Serialize};

/// Raw questionnaire input, exactly as the UI submits it. Every text field is
/// free-form; normalization into decision variables happens in
/// [`crate::signals`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub interests: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_enrich")]
    pub enrich_with_products: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            age: None,
            gender: None,
            relationship: None,
            category: None,
            budget: None,
            interests: None,
            description: None,
            enrich_with_products: true,
        }
    }
}

fn default_enrich() -> bool {
    true
}
