//! Device-name normalization

use std::sync::LazyLock;

use viewstats_common::DeviceCategory;
use viewstats_config::{DeviceRule, DevicesConfig};

/// Built-in table. Order matters: the first category with a matching pattern wins.
const BUILTIN_RULES: [(DeviceCategory, &[&str]); 6] = [
    (
        DeviceCategory::Tv,
        &["TV", "Smart TV", "Roku", "Fire TV", "Apple TV", "Chromecast"],
    ),
    (
        DeviceCategory::Phone,
        &["iPhone", "Mobile", "Android", "iOS", "Samsung"],
    ),
    (DeviceCategory::Tablet, &["iPad"]),
    (DeviceCategory::Laptop, &["MAC", "Mac", "Macbook", "Firefox"]),
    (DeviceCategory::Pc, &["PC", "iMac"]),
    (DeviceCategory::Videogame, &["PS4", "Wii", "Xbox"]),
];

static BUILTIN: LazyLock<DeviceClassifier> = LazyLock::new(|| {
    DeviceClassifier::from_table(
        BUILTIN_RULES
            .iter()
            .map(|(category, patterns)| (*category, patterns.iter().map(|p| p.to_string()).collect())),
    )
});

/// Maps free-text device strings onto [`DeviceCategory`] buckets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceClassifier {
    /// Lower-cased patterns per category, in priority order
    rules: Vec<(DeviceCategory, Vec<String>)>,
}

impl DeviceClassifier {
    /// Classifier using the built-in table
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Classifier for configured rules; the built-in table when none are configured
    pub fn from_config(config: &DevicesConfig) -> Self {
        if config.categories.is_empty() {
            Self::builtin()
        } else {
            Self::from_rules(&config.categories)
        }
    }

    pub fn from_rules(rules: &[DeviceRule]) -> Self {
        Self::from_table(
            rules
                .iter()
                .map(|rule| (rule.category, rule.patterns.clone())),
        )
    }

    fn from_table(table: impl IntoIterator<Item = (DeviceCategory, Vec<String>)>) -> Self {
        let rules = table
            .into_iter()
            .map(|(category, patterns)| {
                let patterns = patterns
                    .iter()
                    .map(|p| p.trim().to_lowercase())
                    .filter(|p| !p.is_empty())
                    .collect();
                (category, patterns)
            })
            .collect();
        Self { rules }
    }

    /// Category of a raw device string.
    ///
    /// Matching is a case-insensitive substring test; no match, including an
    /// empty string, yields [`DeviceCategory::Other`].
    pub fn categorize(&self, device: &str) -> DeviceCategory {
        let device = device.to_lowercase();
        self.rules
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| device.contains(p.as_str())))
            .map(|(category, _)| *category)
            .unwrap_or(DeviceCategory::Other)
    }
}

impl Default for DeviceClassifier {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Categorize with the built-in table
pub fn categorize_device(device: &str) -> DeviceCategory {
    BUILTIN.categorize(device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_builtin_categories() {
        let cases = [
            ("Samsung 2015 Smart TV", DeviceCategory::Tv),
            ("Roku 3", DeviceCategory::Tv),
            ("Google Chromecast", DeviceCategory::Tv),
            ("Apple iPhone 12", DeviceCategory::Phone),
            ("Netflix Windows App - Cadmium Windows Mobile", DeviceCategory::Phone),
            ("Android DefaultWidevineL3Phone", DeviceCategory::Phone),
            ("Apple iPad Air", DeviceCategory::Tablet),
            ("Chrome MAC", DeviceCategory::Laptop),
            ("Firefox Windows", DeviceCategory::Laptop),
            ("Chrome PC (Cadmium)", DeviceCategory::Pc),
            ("Sony PS4", DeviceCategory::Videogame),
            ("Microsoft Xbox One", DeviceCategory::Videogame),
            ("Toaster 3000", DeviceCategory::Other),
            ("", DeviceCategory::Other),
        ];

        for (raw, expected) in cases {
            assert_eq!(categorize_device(raw), expected, "device {raw:?}");
        }
    }

    #[test]
    fn test_first_matching_category_wins() {
        // "Samsung" is a phone pattern but the TV patterns are tried first
        assert_eq!(categorize_device("Samsung Smart TV"), DeviceCategory::Tv);
        // "iMac" contains "Mac", and Laptop precedes PC
        assert_eq!(categorize_device("Apple iMac"), DeviceCategory::Laptop);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(categorize_device("APPLE IPHONE"), DeviceCategory::Phone);
        assert_eq!(categorize_device("sony ps4 pro"), DeviceCategory::Videogame);
    }

    #[test]
    fn test_configured_rules_replace_builtin() {
        let config = DevicesConfig {
            categories: vec![
                DeviceRule {
                    category: DeviceCategory::Videogame,
                    patterns: vec!["Switch".to_string()],
                },
                DeviceRule {
                    category: DeviceCategory::Tv,
                    patterns: vec!["Bravia".to_string()],
                },
            ],
        };
        let classifier = DeviceClassifier::from_config(&config);

        assert_eq!(classifier.categorize("Nintendo Switch"), DeviceCategory::Videogame);
        assert_eq!(classifier.categorize("Sony Bravia 4K"), DeviceCategory::Tv);
        // Built-in patterns are no longer consulted
        assert_eq!(classifier.categorize("Apple iPhone"), DeviceCategory::Other);
    }

    #[test]
    fn test_empty_config_uses_builtin() {
        let classifier = DeviceClassifier::from_config(&DevicesConfig::default());
        assert_eq!(classifier, DeviceClassifier::builtin());
    }

    proptest! {
        #[test]
        fn prop_categorize_never_panics(raw in "\\PC*") {
            let _ = categorize_device(&raw);
        }

        #[test]
        fn prop_case_does_not_matter(raw in "[a-zA-Z0-9 ]{0,24}") {
            prop_assert_eq!(
                categorize_device(&raw.to_uppercase()),
                categorize_device(&raw.to_lowercase())
            );
        }
    }
}
