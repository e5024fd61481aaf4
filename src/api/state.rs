use std::sync::Arc;

use crate::{
    config::Config,
    data::Catalog,
    error::AppResult,
    models::ItemProfiles,
    services::{
        embedding::{Embedder, HashingEmbedder, OpenAiEmbedder},
        sentiment::{LexiconSentiment, SentimentAnalyzer},
        ProfileBuilder, Recommender, Recompute,
    },
    store::{ArtifactCache, FileArtifactStore},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

/// Components shared by every request
///
/// The catalog is read-only after startup; profile state lives in the
/// artifact cache owned by the profile builder.
pub struct AppStateInner {
    pub catalog: Catalog,
    pub profile_builder: ProfileBuilder,
    pub recommender: Recommender,
}

impl AppState {
    pub fn new(catalog: Catalog, profile_builder: ProfileBuilder, recommender: Recommender) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                catalog,
                profile_builder,
                recommender,
            }),
        }
    }

    /// Loads the dataset and wires collaborators from configuration
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let catalog = Catalog::load(config)?;

        let store = FileArtifactStore::new(config.cache_root());
        tracing::info!(cache_root = %store.root().display(), "Using artifact cache");
        let cache = Arc::new(ArtifactCache::new(Arc::new(store)));

        let embedder: Arc<dyn Embedder> = match &config.embedding_api_url {
            Some(url) => Arc::new(OpenAiEmbedder::new(
                url,
                config.embedding_api_key.as_deref(),
                config.embedding_model.clone(),
                config.feature_count,
            )?),
            None => Arc::new(HashingEmbedder::new(config.feature_count)),
        };
        let sentiment: Arc<dyn SentimentAnalyzer> = Arc::new(LexiconSentiment::new());
        tracing::info!(
            embedder = embedder.name(),
            sentiment = sentiment.name(),
            dimensions = config.feature_count,
            "Configured collaborators"
        );

        let profile_builder = ProfileBuilder::new(cache, embedder, sentiment);
        let recommender = Recommender::new(config.recommendation_limit, config.seed_top_k);

        Ok(Self::new(catalog, profile_builder, recommender))
    }

    /// Current profiles; a cache hit once they have been built
    pub async fn profiles(&self, recompute: Recompute) -> AppResult<Arc<ItemProfiles>> {
        let inner = &self.inner;
        inner
            .profile_builder
            .build(inner.catalog.businesses(), inner.catalog.reviews(), recompute)
            .await
    }

    /// Builds or loads profiles ahead of the first request
    pub async fn warm_up(&self) -> AppResult<()> {
        let profiles = self.profiles(Recompute::none()).await?;
        tracing::info!(
            businesses = self.inner.catalog.len(),
            profiles = profiles.len(),
            "Profiles ready"
        );
        Ok(())
    }
}
