//! Topic detection for context augmentation.
//!
//! Before a run, the user brief is scanned against an ordered keyword
//! ruleset to pick an optional topic-specific instruction addendum.
//! Matching is case-insensitive substring, first matching category in
//! priority order wins, and no match leaves the prompt unaugmented.
//! The default ruleset covers Flemish tax, housing-policy and
//! construction terms; deployments can override it from YAML without
//! changing the selection semantics.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One topic category: an addendum id plus the keywords that select it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRule {
    /// Addendum identifier; also the file stem under
    /// `prompts/special_instructions/`
    pub id: String,

    /// Keywords that select this category (matched case-insensitively)
    pub keywords: Vec<String>,
}

/// Ordered set of topic rules; order is match priority
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRuleset {
    pub rules: Vec<TopicRule>,
}

impl Default for TopicRuleset {
    fn default() -> Self {
        Self::default_rules()
    }
}

impl TopicRuleset {
    /// The built-in ruleset: tax terms first, then housing policy, then
    /// construction.
    pub fn default_rules() -> Self {
        let rule = |id: &str, keywords: &[&str]| TopicRule {
            id: id.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        };

        Self {
            rules: vec![
                rule(
                    "tax_analysis",
                    &["verkooprecht", "registratierecht", "belasting", "fiscaal"],
                ),
                rule(
                    "housing_policy",
                    &["woonbeleid", "betaalbaarheid", "wonen", "huisvesting"],
                ),
                rule(
                    "construction",
                    &["bouw", "constructie", "renovatie", "verbouwing"],
                ),
            ],
        }
    }

    /// Parse a ruleset override from YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse topic ruleset YAML")
    }

    /// Select the addendum category for a user brief.
    ///
    /// Pure and deterministic: the same brief and ruleset always yield
    /// the same category.
    pub fn select(&self, brief: &str) -> Option<&TopicRule> {
        let haystack = brief.to_lowercase();
        self.rules.iter().find(|rule| {
            rule.keywords
                .iter()
                .any(|kw| haystack.contains(&kw.to_lowercase()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_keywords_select_tax_analysis() {
        let rules = TopicRuleset::default_rules();
        assert_eq!(rules.select("verkooprecht stijgt").unwrap().id, "tax_analysis");
        assert_eq!(
            rules.select("Nieuwe regels rond registratierecht").unwrap().id,
            "tax_analysis"
        );
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let rules = TopicRuleset::default_rules();
        assert_eq!(rules.select("FISCAAL beleid herzien").unwrap().id, "tax_analysis");
    }

    #[test]
    fn test_priority_order_wins_on_multi_topic_brief() {
        // Brief mentions both housing and tax terms; tax comes first
        let rules = TopicRuleset::default_rules();
        let brief = "woonbeleid en belasting op nieuwbouw";
        assert_eq!(rules.select(brief).unwrap().id, "tax_analysis");
    }

    #[test]
    fn test_housing_and_construction_categories() {
        let rules = TopicRuleset::default_rules();
        assert_eq!(
            rules.select("betaalbaarheid van wonen in Vlaanderen").unwrap().id,
            "housing_policy"
        );
        assert_eq!(
            rules.select("renovatie van schoolgebouwen").unwrap().id,
            "construction"
        );
    }

    #[test]
    fn test_no_match_returns_none() {
        let rules = TopicRuleset::default_rules();
        assert!(rules.select("mobiliteit en openbaar vervoer").is_none());
    }

    #[test]
    fn test_selection_is_deterministic() {
        let rules = TopicRuleset::default_rules();
        for _ in 0..10 {
            assert_eq!(rules.select("verkooprecht stijgt").unwrap().id, "tax_analysis");
        }
    }

    #[test]
    fn test_ruleset_from_yaml() {
        let yaml = r#"
rules:
  - id: mobility
    keywords: [mobiliteit, verkeer]
  - id: energy
    keywords: [energie]
"#;
        let rules = TopicRuleset::from_yaml(yaml).unwrap();
        assert_eq!(rules.select("files en verkeer").unwrap().id, "mobility");
        assert_eq!(rules.select("energie besparen").unwrap().id, "energy");
    }
}
