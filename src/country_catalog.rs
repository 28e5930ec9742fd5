//! Country risk catalog for synthetic transaction generation
//!
//! Provides the static (country, risk score) table that generated transfers are
//! tagged with, plus the risk-skewed subsets used for suspicious transfers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Risk score above which the dashboard treats a jurisdiction as high risk
pub const DASHBOARD_RISK_THRESHOLD: f64 = 0.7;

/// Country risk entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    /// Static fraud-propensity weight in [0, 1]
    pub risk_score: f64,
}

impl Country {
    pub fn new(name: impl Into<String>, risk_score: f64) -> Self {
        Self {
            name: name.into(),
            risk_score,
        }
    }

    /// Check if the country is at or above a risk threshold
    pub fn is_high_risk(&self, threshold: f64) -> bool {
        self.risk_score >= threshold
    }
}

/// Ordered catalog of countries and their risk scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCatalog {
    countries: Vec<Country>,
}

impl CountryCatalog {
    /// Create a catalog from an ordered list of entries
    pub fn new(countries: Vec<Country>) -> Self {
        Self { countries }
    }

    /// Catalog used by the fraud analytics demo
    pub fn default_catalog() -> Self {
        Self::new(vec![
            Country::new("USA", 0.2),
            Country::new("UK", 0.3),
            Country::new("Germany", 0.25),
            Country::new("Canada", 0.2),
            Country::new("Singapore", 0.35),
            Country::new("Cayman Islands", 0.9),
            Country::new("Panama", 0.85),
            Country::new("India", 0.25),
            Country::new("France", 0.3),
            Country::new("UAE", 0.4),
        ])
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// Get a country entry by name
    pub fn get(&self, name: &str) -> Option<&Country> {
        self.countries.iter().find(|c| c.name == name)
    }

    /// Check that a (country, risk) pair matches the catalog exactly
    pub fn is_consistent(&self, name: &str, risk_score: f64) -> bool {
        self.get(name).is_some_and(|c| c.risk_score == risk_score)
    }

    /// Countries with risk at or above the threshold, in catalog order
    pub fn at_or_above(&self, threshold: f64) -> Vec<&Country> {
        self.countries
            .iter()
            .filter(|c| c.is_high_risk(threshold))
            .collect()
    }

    /// Countries with risk strictly above the threshold, highest risk first
    pub fn above_sorted(&self, threshold: f64) -> Vec<&Country> {
        let mut risky: Vec<&Country> = self
            .countries
            .iter()
            .filter(|c| c.risk_score > threshold)
            .collect();
        risky.sort_by(|a, b| {
            b.risk_score
                .partial_cmp(&a.risk_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        risky
    }

    /// Check catalog well-formedness, returning a description of the first problem
    pub fn check(&self) -> Result<(), String> {
        if self.countries.is_empty() {
            return Err("country catalog is empty".to_string());
        }

        let mut seen = HashSet::new();
        for country in &self.countries {
            if country.name.trim().is_empty() {
                return Err("country catalog contains an empty name".to_string());
            }
            if !(0.0..=1.0).contains(&country.risk_score) {
                return Err(format!(
                    "risk score {} for {} is outside [0, 1]",
                    country.risk_score, country.name
                ));
            }
            if !seen.insert(country.name.as_str()) {
                return Err(format!("duplicate country {}", country.name));
            }
        }

        Ok(())
    }
}

impl Default for CountryCatalog {
    fn default() -> Self {
        Self::default_catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = CountryCatalog::default();

        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.countries()[0].name, "USA");
        assert!(catalog.check().is_ok());
    }

    #[test]
    fn test_lookup() {
        let catalog = CountryCatalog::default();

        let cayman = catalog.get("Cayman Islands").unwrap();
        assert_eq!(cayman.risk_score, 0.9);
        assert!(catalog.get("Atlantis").is_none());
    }

    #[test]
    fn test_consistency() {
        let catalog = CountryCatalog::default();

        assert!(catalog.is_consistent("Panama", 0.85));
        assert!(!catalog.is_consistent("Panama", 0.9));
        assert!(!catalog.is_consistent("Atlantis", 0.2));
    }

    #[test]
    fn test_risk_skewed_subset() {
        let catalog = CountryCatalog::default();

        let names: Vec<&str> = catalog
            .at_or_above(0.85)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Cayman Islands", "Panama"]);
    }

    #[test]
    fn test_dashboard_high_risk_sorted() {
        let catalog = CountryCatalog::default();

        let risky = catalog.above_sorted(DASHBOARD_RISK_THRESHOLD);
        assert_eq!(risky.len(), 2);
        assert_eq!(risky[0].name, "Cayman Islands");
        assert_eq!(risky[1].name, "Panama");
    }

    #[test]
    fn test_check_rejects_bad_entries() {
        assert!(CountryCatalog::new(vec![]).check().is_err());
        assert!(CountryCatalog::new(vec![Country::new("X", 1.5)])
            .check()
            .is_err());
        assert!(CountryCatalog::new(vec![Country::new(" ", 0.5)])
            .check()
            .is_err());
        assert!(CountryCatalog::new(vec![
            Country::new("X", 0.5),
            Country::new("X", 0.6),
        ])
        .check()
        .is_err());
    }
}
