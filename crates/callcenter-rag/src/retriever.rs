//! Retrieval boundary - the embedding model and vector index live behind this trait.

use anyhow::Result;
use async_trait::async_trait;

use crate::types::Retrieval;

/// Nearest-neighbour search over the indexed knowledge base.
///
/// Implementations return at most `k` documents ordered by ascending distance,
/// with `min_distance` set iff at least one document came back. Errors are
/// propagated to the caller of the pipeline untouched.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Retrieval>;
}

#[async_trait]
impl<T: Retriever + ?Sized> Retriever for std::sync::Arc<T> {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Retrieval> {
        (**self).retrieve(query, k).await
    }
}

#[async_trait]
impl<T: Retriever + ?Sized> Retriever for Box<T> {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Retrieval> {
        (**self).retrieve(query, k).await
    }
}
