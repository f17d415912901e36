//! High-level recommendation service.
//!
//! Composes the encoder and ranker: embed the query, batch-embed every
//! catalog description, rank by cosine similarity, attach scores back onto
//! the items. Candidate embeddings are recomputed per call; acceptable while
//! catalogs stay small (tens of items). A precomputed vector index would
//! slot in behind the same interface if that ever changes.

use std::collections::HashSet;
use std::sync::Arc;

use crate::catalog::{Item, Scored};
use crate::embeddings::{Encoder, EncoderError};
use crate::rank::{self, RankError};

/// Errors that can occur while serving a recommendation.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("Encoder error: {0}")]
    Encoder(#[from] EncoderError),

    #[error("Rank error: {0}")]
    Rank(#[from] RankError),

    #[error("Catalog is empty")]
    EmptyCatalog,

    #[error("Item {id} has an empty description and cannot be scored")]
    EmptyDescription { id: u64 },

    #[error("Duplicate item id {id} in catalog")]
    DuplicateId { id: u64 },
}

/// Recommendation engine over a caller-supplied catalog.
///
/// Holds a shared encoder handle; the engine itself is stateless across
/// requests and safe to use from concurrent callers.
pub struct Recommender<E: Encoder> {
    encoder: Arc<E>,
}

impl<E: Encoder> Recommender<E> {
    pub fn new(encoder: Arc<E>) -> Self {
        Self { encoder }
    }

    /// Returns a reference to the encoder.
    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Rank `items` against `query`, returning the top `limit` with scores.
    ///
    /// Results are in non-increasing score order; ties keep catalog order.
    /// A `limit` larger than the catalog returns every item. Display fields
    /// on the items pass through unchanged.
    pub fn recommend(
        &self,
        query: &str,
        items: &[Item],
        limit: usize,
    ) -> Result<Vec<Scored>, RecommendError> {
        if items.is_empty() {
            return Err(RecommendError::EmptyCatalog);
        }

        let mut seen = HashSet::with_capacity(items.len());
        for item in items {
            if item.description.trim().is_empty() {
                return Err(RecommendError::EmptyDescription { id: item.id });
            }
            if !seen.insert(item.id) {
                return Err(RecommendError::DuplicateId { id: item.id });
            }
        }

        // Empty query surfaces as EncoderError::EmptyInput here
        let query_embedding = self.encoder.embed(query)?;

        let descriptions: Vec<String> =
            items.iter().map(|item| item.description.clone()).collect();
        let candidate_embeddings = self.encoder.embed_batch(&descriptions)?;

        let ranked = rank::rank(&query_embedding, &candidate_embeddings, limit)?;

        log::debug!(
            "Ranked {} items against {} char query, returning {}",
            items.len(),
            query.len(),
            ranked.len()
        );

        Ok(ranked
            .into_iter()
            .map(|r| Scored {
                item: items[r.index].clone(),
                score: r.score,
            })
            .collect())
    }
}
