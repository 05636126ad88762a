use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

/// Categories the model is allowed to emit. Flower and arrangement concepts
/// are folded into "Gifts" before this list is consulted.
pub const GIFT_CATEGORIES: &[&str] = &[
    "Gifts",
    "Premium",
    "Devices",
    "Perfume",
    "Makeup",
    "Skincare",
    "Personal Care",
    "Health & Nutrition",
    "Nails",
    "Lenses",
    "Home Scents",
    "Food & Drink",
    "Books",
    "Office Supplies",
    "Gaming",
];

pub fn is_known_category(category: &str) -> bool {
    GIFT_CATEGORIES.iter().any(|known| known.eq_ignore_ascii_case(category.trim()))
}

/// One model-proposed gift idea. The model fills the first four fields; the
/// enrichment pass fills the rest in place. `store` stays a raw string so an
/// out-of-contract store name can flow through to a per-entry annotation
/// instead of a deserialization failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GiftRecommendation {
    pub category: String,
    pub store: String,
    pub search_context: String,
    #[serde(default)]
    pub modifier: Option<String>,

    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl GiftRecommendation {
    pub fn new(category: &str, store: &str, search_context: &str) -> Self {
        Self {
            category: category.to_string(),
            store: store.to_string(),
            search_context: search_context.to_string(),
            modifier: None,
            id: None,
            products: Vec::new(),
            product: None,
            query: None,
            error: None,
        }
    }
}

/// The response contract the model must satisfy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GiftPlan {
    pub gifts: Vec<GiftRecommendation>,
}
