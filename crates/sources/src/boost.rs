//! Luxury keyword boost for Floward queries. The Floward index ranks premium
//! stock well above the generic catalog, so queries that arrive without a
//! luxury adjective get one injected before they are sent.

const LUXURY_WORDS: &[&str] = &["luxury", "premium", "elegant", "exclusive", "deluxe"];

const FLOWER_WORDS: &[&str] = &[
    "flower", "flowers", "rose", "roses", "bouquet", "orchid", "tulip", "lily", "arrangement",
    "floral",
];

pub fn boost_luxury_keywords(query: &str) -> String {
    let lowered = query.to_lowercase();
    if LUXURY_WORDS.iter().any(|word| lowered.contains(word)) {
        return query.to_string();
    }
    if FLOWER_WORDS.iter().any(|word| lowered.contains(word)) {
        format!("premium {query} luxury bouquet arrangement")
    } else {
        format!("luxury {query} premium elegant")
    }
}

#[cfg(test)]
mod tests {
    use super::boost_luxury_keywords;

    #[test]
    fn flower_queries_get_the_bouquet_flavored_boost() {
        let boosted = boost_luxury_keywords("red rose gift");
        assert!(boosted.contains("premium"));
        assert!(boosted.contains("luxury bouquet arrangement"));
        assert!(boosted.contains("red rose gift"));
    }

    #[test]
    fn non_flower_queries_get_the_generic_boost() {
        let boosted = boost_luxury_keywords("chocolate box");
        assert_eq!(boosted, "luxury chocolate box premium elegant");
    }

    #[test]
    fn queries_already_carrying_a_luxury_word_are_untouched() {
        assert_eq!(boost_luxury_keywords("luxury rose bouquet"), "luxury rose bouquet");
        assert_eq!(boost_luxury_keywords("Premium watch"), "Premium watch");
        assert_eq!(boost_luxury_keywords("elegant vase"), "elegant vase");
    }
}
