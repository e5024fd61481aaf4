use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::Business,
    services::{categories::parse_categories, Recompute},
    store::ArtifactKey,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub seed_ids: Vec<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub business_id: String,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub stars: Option<f32>,
    pub categories: Vec<String>,
}

impl From<&Business> for ItemResponse {
    fn from(business: &Business) -> Self {
        Self {
            business_id: business.business_id.clone(),
            name: business.name.clone(),
            city: business.city.clone(),
            state: business.state.clone(),
            stars: business.stars,
            categories: parse_categories(&business.categories),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub business_ids: Vec<String>,
    pub is_fallback: bool,
    pub log: Vec<String>,
    pub items: Vec<ItemResponse>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactName {
    AggregatedText,
    SentimentScores,
    ItemProfiles,
}

#[derive(Debug, Default, Deserialize)]
pub struct RebuildRequest {
    #[serde(default)]
    pub artifacts: Option<Vec<ArtifactName>>,
}

#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    pub recomputed: Vec<ArtifactName>,
    pub profiles: usize,
    pub vector_len: usize,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Recommends businesses similar to the given seed businesses
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> AppResult<Json<RecommendResponse>> {
    let Json(request) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    tracing::info!(
        request_id = %request_id,
        seeds = request.seed_ids.len(),
        limit = ?request.limit,
        "Processing recommendation request"
    );

    let profiles = state.profiles(Recompute::none()).await?;
    let catalog = &state.inner.catalog;
    let result = state
        .inner
        .recommender
        .recommend(&request.seed_ids, &profiles, catalog, request.limit);

    let items = result
        .business_ids
        .iter()
        .filter_map(|id| {
            let business = catalog.get(id);
            if business.is_none() {
                tracing::warn!(request_id = %request_id, business_id = %id, "Recommended id has no metadata");
            }
            business
        })
        .map(ItemResponse::from)
        .collect();

    tracing::info!(
        request_id = %request_id,
        results = result.business_ids.len(),
        is_fallback = result.is_fallback,
        "Recommendation completed"
    );

    Ok(Json(RecommendResponse {
        business_ids: result.business_ids,
        is_fallback: result.is_fallback,
        log: result.log,
        items,
    }))
}

/// Forces recomputation of cached pipeline artifacts
///
/// An empty body rebuilds everything; a body that does not parse is rejected.
pub async fn rebuild_profiles(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Bytes,
) -> AppResult<Json<RebuildResponse>> {
    let request = parse_rebuild_request(&body)?;
    let recomputed = request.artifacts.unwrap_or_else(|| {
        vec![
            ArtifactName::AggregatedText,
            ArtifactName::SentimentScores,
            ArtifactName::ItemProfiles,
        ]
    });

    let recompute = Recompute {
        aggregated_text: recomputed.contains(&ArtifactName::AggregatedText),
        sentiment: recomputed.contains(&ArtifactName::SentimentScores),
        profiles: recomputed.contains(&ArtifactName::ItemProfiles),
    };

    tracing::info!(request_id = %request_id, ?recompute, "Rebuilding artifacts");
    let profiles = state.profiles(recompute).await?;

    Ok(Json(RebuildResponse {
        recomputed,
        profiles: profiles.len(),
        vector_len: profiles.vector_len(),
    }))
}

fn parse_rebuild_request(body: &[u8]) -> AppResult<RebuildRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RebuildRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidInput(format!("invalid rebuild request: {}", e)))
}

/// Drops one cached artifact; it is recomputed when next needed
///
/// Artifacts built from it stay cached until they are invalidated too.
pub async fn invalidate_artifact(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(name): Path<ArtifactName>,
) -> StatusCode {
    let builder = &state.inner.profile_builder;
    let key = match name {
        ArtifactName::AggregatedText => ArtifactKey::AggregatedText,
        ArtifactName::SentimentScores => ArtifactKey::SentimentScores,
        ArtifactName::ItemProfiles => builder.profile_key(),
    };

    tracing::info!(request_id = %request_id, artifact = %key, "Invalidating artifact");
    builder.cache().invalidate(&key).await;

    StatusCode::NO_CONTENT
}

/// Looks up one business
pub async fn get_item(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
) -> AppResult<Json<ItemResponse>> {
    state
        .inner
        .catalog
        .get(&business_id)
        .map(|business| Json(ItemResponse::from(business)))
        .ok_or_else(|| AppError::NotFound(format!("business {}", business_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rebuild_request() {
        assert!(parse_rebuild_request(b"").unwrap().artifacts.is_none());
        assert!(parse_rebuild_request(b" \n").unwrap().artifacts.is_none());

        let request = parse_rebuild_request(br#"{"artifacts":["item_profiles"]}"#).unwrap();
        assert_eq!(request.artifacts, Some(vec![ArtifactName::ItemProfiles]));

        let err = parse_rebuild_request(br#"{"artifacts":["bogus_name"]}"#).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(parse_rebuild_request(b"{oops").is_err());
    }
}
