use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding the raw JSON-lines dataset
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Business records file, relative to `data_dir`
    #[serde(default = "default_business_file")]
    pub business_file: String,

    /// Review records file, relative to `data_dir`
    #[serde(default = "default_review_file")]
    pub review_file: String,

    /// Root directory for persisted cache artifacts
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Keeps test runs in their own cache subdirectory
    #[serde(default)]
    pub testing: bool,

    /// Embedding dimension D; profiles are D + 1 long
    #[serde(default = "default_feature_count")]
    pub feature_count: usize,

    /// Default number of recommendations returned
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: usize,

    /// Neighbours kept per seed before score aggregation
    #[serde(default = "default_seed_top_k")]
    pub seed_top_k: usize,

    /// OpenAI-compatible embeddings endpoint; local hashing embedder when unset
    #[serde(default)]
    pub embedding_api_url: Option<String>,

    #[serde(default)]
    pub embedding_api_key: Option<String>,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/raw/json")
}

fn default_business_file() -> String {
    "yelp_academic_dataset_business.json".to_string()
}

fn default_review_file() -> String {
    "yelp_academic_dataset_review.json".to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("data/cache")
}

fn default_feature_count() -> usize {
    50
}

fn default_recommendation_limit() -> usize {
    10
}

fn default_seed_top_k() -> usize {
    5
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn business_path(&self) -> PathBuf {
        self.data_dir.join(&self.business_file)
    }

    pub fn review_path(&self) -> PathBuf {
        self.data_dir.join(&self.review_file)
    }

    /// Directory artifacts are persisted under
    pub fn cache_root(&self) -> PathBuf {
        if self.testing {
            self.cache_dir.join("test")
        } else {
            self.cache_dir.clone()
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(vars: Vec<(&str, &str)>) -> Config {
        envy::from_iter::<_, Config>(
            vars.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config_from(vec![]);
        assert_eq!(config.feature_count, 50);
        assert_eq!(config.recommendation_limit, 10);
        assert_eq!(config.seed_top_k, 5);
        assert!(config.embedding_api_url.is_none());
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(
            config.business_path(),
            PathBuf::from("data/raw/json/yelp_academic_dataset_business.json")
        );
    }

    #[test]
    fn test_testing_flag_isolates_cache() {
        let config = config_from(vec![("TESTING", "true"), ("CACHE_DIR", "/tmp/recs")]);
        assert_eq!(config.cache_root(), PathBuf::from("/tmp/recs/test"));

        let config = config_from(vec![("CACHE_DIR", "/tmp/recs")]);
        assert_eq!(config.cache_root(), PathBuf::from("/tmp/recs"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(vec![("FEATURE_COUNT", "8"), ("PORT", "8080")]);
        assert_eq!(config.feature_count, 8);
        assert_eq!(config.port, 8080);
    }
}
