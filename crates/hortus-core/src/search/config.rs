//! Search configuration.

use serde::{Deserialize, Serialize};

/// Settings that shape how searches interpret and post-process results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Replace synonym results with their accepted record; when false,
    /// synonyms are dropped from the results instead.
    pub accepted_for_synonyms: bool,
    /// Null tests (`is None`, `!= None`, ...) also treat `""` as null.
    pub empty_string_is_null: bool,
    pub binomial: BinomialConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            accepted_for_synonyms: true,
            empty_string_is_null: true,
            binomial: BinomialConfig::default(),
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accepted_for_synonyms(mut self, enabled: bool) -> Self {
        self.accepted_for_synonyms = enabled;
        self
    }

    pub fn with_empty_string_is_null(mut self, enabled: bool) -> Self {
        self.empty_string_is_null = enabled;
        self
    }

    pub fn with_binomial(mut self, binomial: BinomialConfig) -> Self {
        self.binomial = binomial;
        self
    }
}

/// Where the two-word genus/epithet shorthand looks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinomialConfig {
    pub genus_entity: String,
    pub genus_column: String,
    pub species_entity: String,
    /// Relation from a species to its genus.
    pub genus_relation: String,
    /// Species columns matched against the second word.
    pub epithet_columns: Vec<String>,
}

impl Default for BinomialConfig {
    fn default() -> Self {
        Self {
            genus_entity: "genus".to_string(),
            genus_column: "genus".to_string(),
            species_entity: "species".to_string(),
            genus_relation: "genus".to_string(),
            epithet_columns: vec!["sp".to_string(), "cultivar_epithet".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert!(config.accepted_for_synonyms);
        assert!(config.empty_string_is_null);
        assert_eq!(config.binomial.epithet_columns, vec!["sp", "cultivar_epithet"]);
    }

    #[test]
    fn test_partial_json() {
        let config: SearchConfig = serde_json::from_str(
            r#"{ "accepted_for_synonyms": false, "binomial": { "epithet_columns": ["epithet"] } }"#,
        )
        .unwrap();
        assert!(!config.accepted_for_synonyms);
        assert!(config.empty_string_is_null);
        assert_eq!(config.binomial.genus_entity, "genus");
        assert_eq!(config.binomial.epithet_columns, vec!["epithet"]);
    }

    #[test]
    fn test_builders() {
        let config = SearchConfig::new()
            .with_accepted_for_synonyms(false)
            .with_empty_string_is_null(false);
        assert!(!config.accepted_for_synonyms);
        assert!(!config.empty_string_is_null);
    }
}
