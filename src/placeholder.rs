use crate::{PlaceholderRegistry, RegexTable};
use std::collections::HashMap;

/// Default placeholder pool size for categories without an explicit cap.
pub const DEFAULT_CAP: usize = 5;

/// Explicit placeholder pool sizes. A parse needing more occurrences of a category than its
/// cap is not guaranteed; the overflow tally on the outcome reports such cases.
const CAPS: &[(&str, usize)] = &[
    ("CLOUDS", 6),
    ("FEATURE", 8),
    ("INTNUMBER", 9),
    ("PHONETICALPHABET", 6),
    ("REQUESTINSTRUCTION", 8),
    ("RUNWAY", 6),
    ("SIDE", 9),
    ("STATUS", 8),
    ("TO", 6),
    ("WORDNUMBER", 30),
];

/// Pool size for a category.
pub fn cap_of(category: &str) -> usize {
    CAPS.iter()
        .find(|(name, _)| *name == category)
        .map_or(DEFAULT_CAP, |(_, cap)| *cap)
}

impl PlaceholderRegistry {
    /// Build the placeholder pools `cat1..catCap(cat)` for every category of the table.
    pub fn new(table: &RegexTable) -> Self {
        let mut pools = Vec::with_capacity(table.categories().len());
        let mut category_of = HashMap::new();
        for category in table.categories() {
            let lowered = category.to_lowercase();
            let pool: Vec<String> = (1..=cap_of(category))
                .map(|i| format!("{}{}", lowered, i))
                .collect();
            for placeholder in &pool {
                category_of.insert(placeholder.clone(), category.clone());
            }
            pools.push((category.clone(), pool));
        }
        Self { pools, category_of }
    }

    /// Pools in category first-appearance order.
    pub fn pools(&self) -> &[(String, Vec<String>)] {
        &self.pools
    }

    pub fn placeholders(&self, category: &str) -> Option<&[String]> {
        self.pools
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, pool)| pool.as_slice())
    }

    pub fn category_of(&self, placeholder: &str) -> Option<&str> {
        self.category_of.get(placeholder).map(|s| s.as_str())
    }

    pub fn cap(&self, category: &str) -> usize {
        cap_of(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pools_are_capped_prefixes() {
        let table = RegexTable::parse("#INTNUMBER\nr\"\\b\\d+\\b\"\n#SIDE\nr\"\\bleft\\b\"\n#VIA\nr\"\\bvia\\b\"\n").unwrap();
        let registry = PlaceholderRegistry::new(&table);
        assert_eq!(registry.placeholders("INTNUMBER").unwrap().len(), 9);
        assert_eq!(registry.placeholders("SIDE").unwrap().len(), 9);
        assert_eq!(registry.placeholders("VIA").unwrap().len(), 5);
        assert_eq!(registry.placeholders("INTNUMBER").unwrap()[0], "intnumber1");
        assert_eq!(registry.category_of("via3"), Some("VIA"));
        assert_eq!(registry.category_of("via6"), None);
    }
}
