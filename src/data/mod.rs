use std::collections::HashMap;

use crate::{
    config::Config,
    error::AppResult,
    models::{Business, RawReview},
};

pub mod yelp;

/// Read-only business and review data, loaded once per process
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    businesses: Vec<Business>,
    index: HashMap<String, usize>,
    reviews: Vec<RawReview>,
}

impl Catalog {
    /// Builds a catalog; later duplicates of a business_id are ignored
    pub fn new(businesses: Vec<Business>, reviews: Vec<RawReview>) -> Self {
        let mut unique = Vec::with_capacity(businesses.len());
        let mut index = HashMap::with_capacity(businesses.len());

        for business in businesses {
            if index.contains_key(&business.business_id) {
                tracing::warn!(business_id = %business.business_id, "Duplicate business record ignored");
                continue;
            }
            index.insert(business.business_id.clone(), unique.len());
            unique.push(business);
        }

        Self {
            businesses: unique,
            index,
            reviews,
        }
    }

    /// Loads the configured dataset files
    pub fn load(config: &Config) -> AppResult<Self> {
        let businesses = yelp::load_businesses(&config.business_path())?;
        let reviews = yelp::load_reviews(&config.review_path())?;
        Ok(Self::new(businesses, reviews))
    }

    pub fn get(&self, business_id: &str) -> Option<&Business> {
        self.index.get(business_id).map(|&pos| &self.businesses[pos])
    }

    /// Businesses in source order
    pub fn businesses(&self) -> &[Business] {
        &self.businesses
    }

    pub fn reviews(&self) -> &[RawReview] {
        &self.reviews
    }

    pub fn len(&self) -> usize {
        self.businesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.businesses.is_empty()
    }
}
