//! Text embedding collaborators
//!
//! The profile builder only depends on the [`Embedder`] trait. A local
//! feature-hashing embedder works offline; the OpenAI-compatible client is
//! used when an endpoint is configured.

use crate::error::AppResult;

pub mod hashing;
pub mod openai;

pub use hashing::HashingEmbedder;
pub use openai::OpenAiEmbedder;

/// Batch embedding collaborator
///
/// Returns one vector per input text, aligned by position. A vector that is
/// empty or has the wrong length marks a text the embedder could not handle;
/// callers substitute zeros for it.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Length of each returned vector
    fn dimensions(&self) -> usize;

    /// Embedder name for logging and debugging
    fn name(&self) -> &'static str;
}
