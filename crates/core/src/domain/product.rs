use serde::{Deserialize, Serialize};

/// The three product sources a recommendation may be routed to.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Store {
    Jarir,
    NiceOne,
    Floward,
}

impl Store {
    /// Forgiving parse for store names coming back from the model or from
    /// upstream payloads. Unknown values stay unparsed; callers decide how to
    /// annotate them.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "jarir" => Some(Self::Jarir),
            "niceone" | "nice_one" | "nice one" => Some(Self::NiceOne),
            "floward" => Some(Self::Floward),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jarir => "JARIR",
            Self::NiceOne => "NICEONE",
            Self::Floward => "FLOWARD",
        }
    }
}

impl std::fmt::Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One normalized external listing. Prices stay currency-agnostic strings at
/// this layer; the three upstream APIs disagree on numeric vs. string prices
/// and the UI renders them verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    pub source: Store,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: Option<i64>,
}

impl Product {
    pub const FALLBACK_NAME: &'static str = "Unknown Product";

    /// Keeps only rows whose declared source matches the querying adapter.
    /// Upstream indexes occasionally leak cross-catalog rows; those are
    /// dropped here rather than surfaced as errors.
    pub fn retain_matching_source(products: Vec<Product>, expected: Store) -> Vec<Product> {
        products.into_iter().filter(|product| product.source == expected).collect()
    }
}

/// Renders an upstream price field (number or string) as a display string.
pub fn price_text(raw: &serde_json::Value) -> Option<String> {
    match raw {
        serde_json::Value::String(text) if !text.trim().is_empty() => {
            Some(text.trim().to_string())
        }
        serde_json::Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{price_text, Product, Store};

    fn product(id: &str, source: Store) -> Product {
        Product {
            id: id.to_string(),
            name: Product::FALLBACK_NAME.to_string(),
            price: None,
            image: None,
            url: None,
            brand: None,
            source,
            tags: Vec::new(),
            priority: None,
        }
    }

    #[test]
    fn parses_store_names_ignoring_case_and_whitespace() {
        assert_eq!(Store::parse("  FLOWARD "), Some(Store::Floward));
        assert_eq!(Store::parse("NiceOne"), Some(Store::NiceOne));
        assert_eq!(Store::parse("nice one"), Some(Store::NiceOne));
        assert_eq!(Store::parse("jarir"), Some(Store::Jarir));
        assert_eq!(Store::parse("amazon"), None);
    }

    #[test]
    fn cross_catalog_rows_are_filtered_out() {
        let rows = vec![
            product("a", Store::Jarir),
            product("b", Store::Floward),
            product("c", Store::Jarir),
        ];
        let kept = Product::retain_matching_source(rows, Store::Jarir);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|row| row.source == Store::Jarir));
    }

    #[test]
    fn price_text_accepts_numbers_and_strings() {
        assert_eq!(price_text(&serde_json::json!(149.5)), Some("149.5".to_string()));
        assert_eq!(price_text(&serde_json::json!(" 99 SAR ")), Some("99 SAR".to_string()));
        assert_eq!(price_text(&serde_json::json!(null)), None);
        assert_eq!(price_text(&serde_json::json!("")), None);
    }
}
