use std::any::Any;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::RwLock;

use super::file::{ArtifactStore, StoreError};

/// Names of the persisted pipeline artifacts
///
/// Artifacts are keyed by name, not by a hash of their inputs. After the
/// source data changes a caller has to force recomputation explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArtifactKey {
    AggregatedText,
    SentimentScores,
    ItemProfiles { dimensions: usize },
}

impl Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKey::AggregatedText => write!(f, "aggregated_text"),
            ArtifactKey::SentimentScores => write!(f, "sentiment_scores"),
            ArtifactKey::ItemProfiles { dimensions } => write!(f, "item_profiles_d{}", dimensions),
        }
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    key: &'a str,
    computed_at: DateTime<Utc>,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    key: String,
    computed_at: DateTime<Utc>,
    payload: T,
}

type Memo = HashMap<String, Arc<dyn Any + Send + Sync>>;

/// Compute-or-load memoization over named artifacts
///
/// Lookups go memo → store → compute. Store failures are logged and
/// swallowed so the cache can never fail a request. There is no per-key
/// locking: concurrent first callers may each compute and write the same
/// artifact, and the last writer wins.
pub struct ArtifactCache {
    store: Arc<dyn ArtifactStore>,
    memo: RwLock<Memo>,
}

impl ArtifactCache {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            store,
            memo: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the artifact stored under `key`, computing and persisting it when needed
    ///
    /// With `force` set the memo and the store are bypassed and `compute`
    /// always runs. Errors from `compute` propagate untouched and nothing is
    /// cached for them.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &ArtifactKey,
        force: bool,
        compute: F,
    ) -> Result<Arc<T>, E>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let name = key.to_string();

        if !force {
            if let Some(hit) = self.memo_get::<T>(&name).await {
                tracing::debug!(artifact = %name, "Artifact memo hit");
                return Ok(hit);
            }

            match self.load::<T>(&name).await {
                Ok(Some(value)) => {
                    tracing::debug!(artifact = %name, "Artifact loaded from store");
                    let value = Arc::new(value);
                    self.memo_put(&name, value.clone()).await;
                    return Ok(value);
                }
                Ok(None) => tracing::debug!(artifact = %name, "Artifact cache miss"),
                Err(e) => {
                    tracing::error!(artifact = %name, error = %e, "Failed to read cached artifact")
                }
            }
        } else {
            tracing::info!(artifact = %name, "Forced artifact recomputation");
        }

        let value = Arc::new(compute().await?);

        if let Err(e) = self.persist(&name, value.clone()).await {
            tracing::error!(artifact = %name, error = %e, "Failed to persist artifact");
        }
        self.memo_put(&name, value.clone()).await;

        Ok(value)
    }

    /// Drops the artifact from the memo and the store
    pub async fn invalidate(&self, key: &ArtifactKey) {
        let name = key.to_string();
        self.memo.write().await.remove(&name);

        let store = Arc::clone(&self.store);
        let target = name.clone();
        if let Err(e) = blocking(move || store.remove(&target)).await {
            tracing::error!(artifact = %name, error = %e, "Failed to remove cached artifact");
        } else {
            tracing::info!(artifact = %name, "Artifact invalidated");
        }
    }

    /// Whether a persisted copy of the artifact exists
    pub fn is_persisted(&self, key: &ArtifactKey) -> bool {
        self.store.exists(&key.to_string())
    }

    async fn memo_get<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        let entry = self.memo.read().await.get(name).cloned()?;
        match entry.downcast::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(artifact = %name, "Memoized artifact has an unexpected type");
                None
            }
        }
    }

    async fn memo_put<T: Send + Sync + 'static>(&self, name: &str, value: Arc<T>) {
        self.memo.write().await.insert(name.to_string(), value);
    }

    /// Reads and decodes the persisted envelope off the async runtime
    async fn load<T>(&self, name: &str) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let name = name.to_string();
        blocking(move || decode(&*store, &name)).await
    }

    async fn persist<T>(&self, name: &str, value: Arc<T>) -> Result<(), StoreError>
    where
        T: Serialize + Send + Sync + 'static,
    {
        let store = Arc::clone(&self.store);
        let name = name.to_string();
        blocking(move || {
            let envelope = EnvelopeRef {
                key: &name,
                computed_at: Utc::now(),
                payload: value.as_ref(),
            };
            let bytes = serde_json::to_vec(&envelope)?;
            store.write(&name, &bytes)
        })
        .await
    }
}

/// Runs store I/O on the blocking pool
async fn blocking<R, F>(f: F) -> Result<R, StoreError>
where
    F: FnOnce() -> Result<R, StoreError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

fn decode<T: DeserializeOwned>(store: &dyn ArtifactStore, name: &str) -> Result<Option<T>, StoreError> {
    let Some(bytes) = store.read(name)? else {
        return Ok(None);
    };

    let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
    if envelope.key != name {
        return Err(StoreError::KeyMismatch {
            expected: name.to_string(),
            found: envelope.key,
        });
    }

    tracing::debug!(
        artifact = %name,
        computed_at = %envelope.computed_at,
        "Decoded cached artifact"
    );
    Ok(Some(envelope.payload))
}
