use std::sync::Arc;

use crate::{
    cached,
    error::{AppError, AppResult},
    models::{AggregatedText, Business, ItemProfiles, RawReview, SentimentScores},
    services::{aggregator::aggregate, embedding::Embedder, sentiment, sentiment::SentimentAnalyzer},
    store::{ArtifactCache, ArtifactKey},
};

/// Which cached artifacts to rebuild instead of loading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Recompute {
    pub aggregated_text: bool,
    pub sentiment: bool,
    pub profiles: bool,
}

impl Recompute {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            aggregated_text: true,
            sentiment: true,
            profiles: true,
        }
    }

    fn any(&self) -> bool {
        self.aggregated_text || self.sentiment || self.profiles
    }
}

/// Builds the per-business content profiles
///
/// A profile is the embedding of the business's aggregated review text
/// followed by its mean sentiment. Aggregated text, sentiment scores and the
/// finished profiles are each cached under their own artifact key.
pub struct ProfileBuilder {
    cache: Arc<ArtifactCache>,
    embedder: Arc<dyn Embedder>,
    sentiment: Arc<dyn SentimentAnalyzer>,
}

impl ProfileBuilder {
    pub fn new(
        cache: Arc<ArtifactCache>,
        embedder: Arc<dyn Embedder>,
        sentiment: Arc<dyn SentimentAnalyzer>,
    ) -> Self {
        Self {
            cache,
            embedder,
            sentiment,
        }
    }

    pub fn cache(&self) -> &Arc<ArtifactCache> {
        &self.cache
    }

    /// Embedding dimension D
    pub fn dimensions(&self) -> usize {
        self.embedder.dimensions()
    }

    pub fn profile_key(&self) -> ArtifactKey {
        ArtifactKey::ItemProfiles {
            dimensions: self.dimensions(),
        }
    }

    /// Returns profiles for `businesses`, computing whatever is not cached
    ///
    /// Forcing any upstream artifact also rebuilds the profiles.
    pub async fn build(
        &self,
        businesses: &[Business],
        reviews: &[RawReview],
        recompute: Recompute,
    ) -> AppResult<Arc<ItemProfiles>> {
        let key = self.profile_key();
        cached!(self.cache, key, recompute.any(), async {
            self.compute(businesses, reviews, recompute).await
        })
    }

    async fn compute(
        &self,
        businesses: &[Business],
        reviews: &[RawReview],
        recompute: Recompute,
    ) -> AppResult<ItemProfiles> {
        let texts: Arc<AggregatedText> = cached!(
            self.cache,
            ArtifactKey::AggregatedText,
            recompute.aggregated_text,
            async { Ok::<_, AppError>(aggregate(reviews)) }
        )?;

        let scores: Arc<SentimentScores> = cached!(
            self.cache,
            ArtifactKey::SentimentScores,
            recompute.sentiment,
            async { Ok::<_, AppError>(sentiment::score(self.sentiment.as_ref(), reviews).await) }
        )?;

        let batch: Vec<String> = businesses
            .iter()
            .map(|b| texts.get(&b.business_id).cloned().unwrap_or_default())
            .collect();

        let dims = self.dimensions();
        let embeddings = match self.embedder.embed(&batch).await {
            Ok(embeddings) => embeddings,
            Err(e) => {
                tracing::warn!(
                    embedder = self.embedder.name(),
                    error = %e,
                    "Embedding call failed, profiles get zero embeddings"
                );
                Vec::new()
            }
        };
        if !embeddings.is_empty() && embeddings.len() != batch.len() {
            tracing::warn!(
                embedder = self.embedder.name(),
                expected = batch.len(),
                returned = embeddings.len(),
                "Embedder returned a misaligned batch"
            );
        }

        let mut profiles = ItemProfiles::new(dims);
        let mut zero_filled = 0usize;

        for (i, business) in businesses.iter().enumerate() {
            let mut vector = match embeddings.get(i) {
                Some(v) if v.len() == dims => v.clone(),
                _ => {
                    zero_filled += 1;
                    vec![0.0; dims]
                }
            };
            let sentiment = scores.get(&business.business_id).copied().unwrap_or(0.0);
            vector.push(sentiment as f32);
            profiles.insert(business.business_id.clone(), vector);
        }

        if zero_filled > 0 {
            tracing::warn!(
                embedder = self.embedder.name(),
                count = zero_filled,
                "Missing embeddings replaced with zero vectors"
            );
        }
        tracing::info!(
            businesses = profiles.len(),
            vector_len = profiles.vector_len(),
            "Built item profiles"
        );

        Ok(profiles)
    }
}
