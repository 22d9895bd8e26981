// Approaches: turn a user query plus overrides into search results

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AuthClaims, Document, Overrides, VectorQuery};

pub mod options;
pub mod search;

pub use options::{RetrievalMode, SearchOptions};
pub use search::{ApproachSettings, SearchApproach};

/// Everything the search backend needs to execute one query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub top: usize,
    pub query_text: String,
    pub filter: Option<String>,
    pub vectors: Vec<VectorQuery>,
    pub use_text_search: bool,
    pub use_vector_search: bool,
    pub use_semantic_ranker: bool,
    pub use_semantic_captions: bool,
    pub minimum_search_score: f64,
    pub minimum_reranker_score: f64,
    pub query_language: String,
    pub query_speller: String,
    pub sourcepage_field: String,
    pub content_field: String,
}

#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn compute_text_embedding(&self, text: &str) -> Result<VectorQuery>;
}

/// Executes a query against the index. Implementations return documents
/// already ranked and filtered by the minimum score thresholds.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Document>>;
}

pub trait FilterBuilder: Send + Sync {
    fn build_filter(&self, overrides: &Overrides, auth_claims: &AuthClaims) -> Result<Option<String>>;
}
