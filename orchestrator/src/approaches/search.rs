// Search approach: retrieves documents from the index without generating an answer

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{EmbeddingClient, FilterBuilder, SearchBackend, SearchOptions, SearchQuery};
use crate::error::{ApiError, Result};
use crate::metrics;
use crate::models::{ApproachContext, AuthClaims, Message, Overrides, SearchResult};

#[derive(Debug, Clone)]
pub struct ApproachSettings {
    pub chatgpt_model: String,
    pub chatgpt_deployment: Option<String>,
    pub embedding_model: String,
    pub embedding_deployment: Option<String>,
    pub embedding_dimensions: usize,
    pub sourcepage_field: String,
    pub content_field: String,
    pub query_language: String,
    pub query_speller: String,
}

pub struct SearchApproach {
    search_client: Arc<dyn SearchBackend>,
    embedding_client: Arc<dyn EmbeddingClient>,
    filter_builder: Arc<dyn FilterBuilder>,
    settings: ApproachSettings,
}

impl SearchApproach {
    pub fn new(
        search_client: Arc<dyn SearchBackend>,
        embedding_client: Arc<dyn EmbeddingClient>,
        filter_builder: Arc<dyn FilterBuilder>,
        settings: ApproachSettings,
    ) -> Self {
        info!(
            chatgpt_model = %settings.chatgpt_model,
            chatgpt_deployment = ?settings.chatgpt_deployment,
            embedding_model = %settings.embedding_model,
            embedding_deployment = ?settings.embedding_deployment,
            embedding_dimensions = settings.embedding_dimensions,
            "Search approach configured"
        );
        Self {
            search_client,
            embedding_client,
            filter_builder,
            settings,
        }
    }

    /// Runs a search for the content of the most recent message.
    /// `session_state` is accepted for parity with the chat approaches and ignored.
    pub async fn run(
        &self,
        messages: &[Message],
        _session_state: Option<&Value>,
        context: &ApproachContext,
    ) -> Result<Vec<SearchResult>> {
        let last = messages
            .last()
            .ok_or_else(|| ApiError::InvalidInput("messages must not be empty".to_string()))?;
        let query = match &last.content {
            Value::String(s) => s.as_str(),
            _ => {
                return Err(ApiError::InvalidInput(
                    "The most recent message content must be a string.".to_string(),
                ))
            }
        };

        let overrides_json = Value::Object(context.overrides.clone());
        info!(query = %query, overrides = %overrides_json, "Running search approach");

        self.execute_search(query, &context.overrides, &context.auth_claims)
            .await
    }

    pub async fn execute_search(
        &self,
        query: &str,
        overrides: &Overrides,
        auth_claims: &AuthClaims,
    ) -> Result<Vec<SearchResult>> {
        let overrides_json = Value::Object(overrides.clone());
        debug!(overrides = %overrides_json, "Received overrides");

        let options = SearchOptions::from_overrides(overrides)?;
        info!(top = options.top, "Parsed top");

        let filter = self.filter_builder.build_filter(overrides, auth_claims)?;

        metrics::SEARCH_REQUESTS
            .with_label_values(&[options.mode.as_str()])
            .inc();
        let _timer = metrics::SEARCH_DURATION.start_timer();

        let mut vectors = Vec::new();
        if options.mode.use_vector_search() {
            let vector = self
                .embedding_client
                .compute_text_embedding(query)
                .await
                .map_err(|e| upstream("embedding", e))?;
            vectors.push(vector);
        }

        let search_query = SearchQuery {
            top: options.top,
            query_text: query.to_string(),
            filter,
            vectors,
            use_text_search: options.mode.use_text_search(),
            use_vector_search: options.mode.use_vector_search(),
            use_semantic_ranker: options.use_semantic_ranker,
            use_semantic_captions: options.use_semantic_captions,
            minimum_search_score: options.minimum_search_score,
            minimum_reranker_score: options.minimum_reranker_score,
            query_language: self.settings.query_language.clone(),
            query_speller: self.settings.query_speller.clone(),
            sourcepage_field: self.settings.sourcepage_field.clone(),
            content_field: self.settings.content_field.clone(),
        };

        info!(
            top = search_query.top,
            filter = ?search_query.filter,
            use_text_search = search_query.use_text_search,
            use_vector_search = search_query.use_vector_search,
            use_semantic_ranker = search_query.use_semantic_ranker,
            use_semantic_captions = search_query.use_semantic_captions,
            minimum_search_score = search_query.minimum_search_score,
            minimum_reranker_score = search_query.minimum_reranker_score,
            "Executing search"
        );

        let documents = self
            .search_client
            .search(&search_query)
            .await
            .map_err(|e| upstream("search", e))?;

        let results: Vec<SearchResult> = documents.into_iter().map(SearchResult::from).collect();

        info!(result_count = results.len(), "Search completed");
        match results.first() {
            Some(first) => debug!(title = %first.title, similarity = first.similarity, "First result"),
            None => info!("No results found"),
        }

        Ok(results)
    }
}

fn upstream(stage: &str, err: ApiError) -> ApiError {
    metrics::UPSTREAM_ERRORS.with_label_values(&[stage]).inc();
    warn!(stage, error = %err, "Upstream call failed");
    match err {
        ApiError::HttpError(e) => ApiError::Upstream(format!("{} request failed: {}", stage, e)),
        other => other,
    }
}
