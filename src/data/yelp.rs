//! JSON-lines loader for the Yelp academic dataset layout.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    error::{AppError, AppResult},
    models::{Business, CategoriesField, RawReview},
};

#[derive(Debug, Deserialize)]
struct BusinessRecord {
    business_id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    stars: Option<f32>,
    #[serde(default)]
    review_count: Option<u32>,
    #[serde(default)]
    categories: CategoriesField,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    coordinates: Option<Coordinates>,
}

#[derive(Debug, Deserialize)]
struct Coordinates {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ReviewRecord {
    review_id: Option<String>,
    business_id: Option<String>,
    #[serde(default, alias = "review_text")]
    text: Option<String>,
}

impl BusinessRecord {
    fn into_business(self) -> Option<Business> {
        let business_id = self.business_id.filter(|id| !id.is_empty())?;
        let name = self.name?;

        // Older dumps nest the location under `coordinates`
        let (latitude, longitude) = match (self.latitude, self.longitude, self.coordinates) {
            (None, None, Some(c)) => (c.latitude, c.longitude),
            (lat, lon, _) => (lat, lon),
        };

        Some(Business {
            business_id,
            name,
            city: self.city,
            state: self.state,
            stars: self.stars,
            review_count: self.review_count,
            categories: self.categories,
            latitude,
            longitude,
        })
    }
}

impl ReviewRecord {
    fn into_review(self) -> Option<RawReview> {
        Some(RawReview {
            review_id: self.review_id.filter(|id| !id.is_empty())?,
            business_id: self.business_id.filter(|id| !id.is_empty())?,
            text: self.text?,
        })
    }
}

/// Loads business records, dropping those without an id or name
pub fn load_businesses(path: &Path) -> AppResult<Vec<Business>> {
    let records: Vec<BusinessRecord> = read_json_lines(path)?;
    let total = records.len();
    let businesses: Vec<Business> = records
        .into_iter()
        .filter_map(BusinessRecord::into_business)
        .collect();

    if businesses.len() < total {
        tracing::warn!(
            dropped = total - businesses.len(),
            "Skipped business records missing business_id or name"
        );
    }
    tracing::info!(path = %path.display(), count = businesses.len(), "Loaded businesses");

    Ok(businesses)
}

/// Loads review records, dropping those without ids or text
pub fn load_reviews(path: &Path) -> AppResult<Vec<RawReview>> {
    let records: Vec<ReviewRecord> = read_json_lines(path)?;
    let total = records.len();
    let reviews: Vec<RawReview> = records
        .into_iter()
        .filter_map(ReviewRecord::into_review)
        .collect();

    if reviews.len() < total {
        tracing::warn!(
            dropped = total - reviews.len(),
            "Skipped review records missing review_id, business_id or text"
        );
    }
    tracing::info!(path = %path.display(), count = reviews.len(), "Loaded reviews");

    Ok(reviews)
}

fn read_json_lines<T: DeserializeOwned>(path: &Path) -> AppResult<Vec<T>> {
    let file = File::open(path).map_err(|e| AppError::source_data(path, e))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| AppError::source_data(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .map_err(|e| AppError::source_data(path, format!("line {}: {}", line_no + 1, e)))?;
        records.push(record);
    }

    Ok(records)
}
