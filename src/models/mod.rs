use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod profile;

pub use profile::{ItemProfiles, ProfileEntry};

/// A single review as loaded from the data source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawReview {
    pub review_id: String,
    pub business_id: String,
    pub text: String,
}

impl RawReview {
    pub fn new(
        review_id: impl Into<String>,
        business_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            review_id: review_id.into(),
            business_id: business_id.into(),
            text: text.into(),
        }
    }
}

/// The categories field exactly as it appears in source data
///
/// Sources disagree on its shape: a JSON list, a comma separated string,
/// a Python-style list literal, or nothing at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(untagged)]
pub enum CategoriesField {
    List(Vec<String>),
    Text(String),
    #[default]
    Missing,
    Other(serde_json::Value),
}

/// An item that can be recommended
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Business {
    pub business_id: String,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub stars: Option<f32>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub categories: CategoriesField,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Business {
    /// Creates a business with only the fields the recommender needs
    pub fn new(
        business_id: impl Into<String>,
        name: impl Into<String>,
        categories: CategoriesField,
    ) -> Self {
        Self {
            business_id: business_id.into(),
            name: name.into(),
            city: None,
            state: None,
            stars: None,
            review_count: None,
            categories,
            latitude: None,
            longitude: None,
        }
    }
}

/// business_id → space-joined review text
pub type AggregatedText = HashMap<String, String>;

/// business_id → mean comparative sentiment of its reviews
pub type SentimentScores = HashMap<String, f64>;

/// One comparative sentiment value per analysed text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SentimentReport {
    pub comparative: f64,
}

/// Ranked recommendations plus the trace of how they were produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RecommendationResult {
    pub business_ids: Vec<String>,
    pub is_fallback: bool,
    pub log: Vec<String>,
}

impl RecommendationResult {
    pub fn is_empty(&self) -> bool {
        self.business_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_categories_field_shapes() {
        let list: CategoriesField = serde_json::from_value(json!(["Bars", "Pubs"])).unwrap();
        assert_eq!(
            list,
            CategoriesField::List(vec!["Bars".to_string(), "Pubs".to_string()])
        );

        let text: CategoriesField = serde_json::from_value(json!("Bars, Pubs")).unwrap();
        assert_eq!(text, CategoriesField::Text("Bars, Pubs".to_string()));

        let null: CategoriesField = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(null, CategoriesField::Missing);

        let number: CategoriesField = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(number, CategoriesField::Other(json!(42)));
    }

    #[test]
    fn test_business_defaults_optional_fields() {
        let business: Business = serde_json::from_value(json!({
            "business_id": "b1",
            "name": "Luigi's"
        }))
        .unwrap();

        assert_eq!(business.categories, CategoriesField::Missing);
        assert!(business.city.is_none());
    }
}
