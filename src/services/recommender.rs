use std::collections::{HashMap, HashSet};

use crate::{
    data::Catalog,
    models::{ItemProfiles, RecommendationResult},
    services::{
        categories::parse_categories,
        similarity::{cosine_similarity, top_k},
    },
};

/// Ranks businesses by profile similarity to a set of seed businesses
///
/// Each seed contributes its `per_seed` nearest neighbours (positive cosine
/// similarity only) with linearly decreasing weight `per_seed - rank`.
/// Scores accumulate across seeds. When nothing survives, businesses are
/// ranked by how many categories they share with the seeds instead.
#[derive(Debug, Clone)]
pub struct Recommender {
    limit: usize,
    per_seed: usize,
}

impl Recommender {
    pub fn new(limit: usize, per_seed: usize) -> Self {
        Self { limit, per_seed }
    }

    pub fn recommend(
        &self,
        seed_ids: &[String],
        profiles: &ItemProfiles,
        catalog: &Catalog,
        limit: Option<usize>,
    ) -> RecommendationResult {
        let limit = limit.filter(|&n| n > 0).unwrap_or(self.limit);
        let mut log = Vec::new();

        let seed_set: HashSet<&str> = seed_ids.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        let mut valid: Vec<&str> = Vec::new();
        let mut invalid: Vec<&str> = Vec::new();

        for id in seed_ids.iter().map(String::as_str) {
            if !seen.insert(id) {
                continue;
            }
            if profiles.contains(id) {
                valid.push(id);
            } else {
                tracing::warn!(business_id = %id, "Seed id has no profile, skipping");
                invalid.push(id);
            }
        }

        log.push(format!(
            "Received {} seed ids: {} valid, {} invalid",
            seed_ids.len(),
            valid.len(),
            invalid.len()
        ));
        if !invalid.is_empty() {
            log.push(format!("Skipped unknown seed ids: {}", invalid.join(", ")));
        }
        if valid.is_empty() {
            log.push("No valid seed ids, returning empty result".to_string());
            return RecommendationResult {
                business_ids: Vec::new(),
                is_fallback: false,
                log,
            };
        }

        log.push(format!("Candidate pool: {} profiled businesses", profiles.len()));

        let ranked = self.rank_by_similarity(&valid, profiles, &mut log);
        let business_ids: Vec<String> = ranked
            .into_iter()
            .filter(|id| !seed_set.contains(id))
            .take(limit)
            .map(str::to_string)
            .collect();

        if !business_ids.is_empty() {
            log.push(format!(
                "Strategy: similarity, {} recommendations",
                business_ids.len()
            ));
            tracing::info!(
                seeds = valid.len(),
                results = business_ids.len(),
                "Similarity recommendations produced"
            );
            return RecommendationResult {
                business_ids,
                is_fallback: false,
                log,
            };
        }

        log.push("Similarity search found no candidates, falling back to category overlap".to_string());
        let business_ids = self.rank_by_categories(&valid, &seed_set, catalog, limit, &mut log);
        log.push(format!(
            "Strategy: category fallback, {} recommendations",
            business_ids.len()
        ));
        tracing::info!(
            seeds = valid.len(),
            results = business_ids.len(),
            "Category fallback recommendations produced"
        );

        RecommendationResult {
            business_ids,
            is_fallback: true,
            log,
        }
    }

    /// Candidates ordered by accumulated rank score, ties by first appearance
    fn rank_by_similarity<'a>(
        &self,
        seeds: &[&'a str],
        profiles: &'a ItemProfiles,
        log: &mut Vec<String>,
    ) -> Vec<&'a str> {
        let mut order: Vec<&'a str> = Vec::new();
        let mut scores: HashMap<&'a str, usize> = HashMap::new();

        for &seed in seeds {
            let Some(seed_vector) = profiles.get(seed) else {
                continue;
            };

            let scored: Vec<(&'a str, f64)> = profiles
                .iter()
                .filter(|entry| entry.business_id != seed)
                .map(|entry| {
                    (
                        entry.business_id.as_str(),
                        cosine_similarity(seed_vector, &entry.vector),
                    )
                })
                .filter(|(_, sim)| *sim > 0.0)
                .collect();

            let neighbours = top_k(scored, self.per_seed);
            log.push(format!("Seed {}: {} similar candidates", seed, neighbours.len()));

            for (rank, (id, _)) in neighbours.into_iter().enumerate() {
                let contribution = self.per_seed - rank;
                match scores.get_mut(id) {
                    Some(score) => *score += contribution,
                    None => {
                        order.push(id);
                        scores.insert(id, contribution);
                    }
                }
            }
        }

        let mut ranked: Vec<(&'a str, usize)> =
            order.into_iter().map(|id| (id, scores[id])).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().map(|(id, _)| id).collect()
    }

    fn rank_by_categories(
        &self,
        seeds: &[&str],
        seed_set: &HashSet<&str>,
        catalog: &Catalog,
        limit: usize,
        log: &mut Vec<String>,
    ) -> Vec<String> {
        let mut seed_categories: HashSet<String> = HashSet::new();
        for &seed in seeds {
            match catalog.get(seed) {
                Some(business) => seed_categories.extend(parse_categories(&business.categories)),
                None => {
                    tracing::warn!(business_id = %seed, "Seed id has no metadata, skipping");
                    log.push(format!("Seed {} has no metadata", seed));
                }
            }
        }
        log.push(format!("Seed categories: {}", seed_categories.len()));

        if seed_categories.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(&str, usize)> = Vec::new();
        for business in catalog.businesses() {
            if seed_set.contains(business.business_id.as_str()) {
                continue;
            }
            let categories: HashSet<String> =
                parse_categories(&business.categories).into_iter().collect();
            let overlap = categories
                .iter()
                .filter(|c| seed_categories.contains(*c))
                .count();
            if overlap > 0 {
                scored.push((business.business_id.as_str(), overlap));
            }
        }
        log.push(format!("Category overlap candidates: {}", scored.len()));

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored
            .into_iter()
            .take(limit)
            .map(|(id, _)| id.to_string())
            .collect()
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new(10, 5)
    }
}
