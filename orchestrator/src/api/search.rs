use std::sync::Arc;

use serde_json::json;
use tracing::{info, Instrument};
use uuid::Uuid;
use warp::{Rejection, Reply};

use crate::approaches::options::{RetrievalMode, DEFAULT_TOP};
use crate::approaches::SearchApproach;
use crate::auth::AuthHelper;
use crate::error::ApiError;
use crate::models::{ApproachContext, Message, Overrides, RunRequest, SearchRequest, SearchResult};

/// Translates the search page's form into approach overrides.
pub fn overrides_from_request(request: &SearchRequest) -> Overrides {
    let mut overrides = Overrides::new();

    let search_type = request
        .search_type
        .as_deref()
        .map(str::to_lowercase);
    if let Some(mode) = &search_type {
        overrides.insert("retrieval_mode".to_string(), json!(mode));
    }
    overrides.insert(
        "semantic_ranker".to_string(),
        json!(request.use_semantic_ranker),
    );

    let top = request
        .max_results
        .filter(|n| *n > 0)
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_TOP);
    overrides.insert("top".to_string(), json!(top));

    // Keyword scores are BM25 and not comparable to a similarity cutoff.
    let keyword_only = search_type
        .as_deref()
        .and_then(|mode| mode.parse::<RetrievalMode>().ok())
        == Some(RetrievalMode::Text);
    if !keyword_only {
        if let Some(min) = request.min_similarity {
            overrides.insert("minimum_search_score".to_string(), json!(min));
        }
    }

    overrides
}

pub async fn handle_search(
    request: SearchRequest,
    authorization: Option<String>,
    approach: Arc<SearchApproach>,
    auth_helper: Arc<AuthHelper>,
) -> Result<impl Reply, Rejection> {
    let request_id = Uuid::new_v4();

    let results = search(request, authorization.as_deref(), &approach, &auth_helper)
        .instrument(tracing::info_span!("search", %request_id))
        .await
        .map_err(warp::reject::custom)?;

    Ok(warp::reply::json(&results))
}

async fn search(
    request: SearchRequest,
    authorization: Option<&str>,
    approach: &SearchApproach,
    auth_helper: &AuthHelper,
) -> Result<Vec<SearchResult>, ApiError> {
    if request.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }
    info!(query = %request.query, "Processing search request");

    let context = ApproachContext {
        overrides: overrides_from_request(&request),
        auth_claims: auth_helper.get_auth_claims_if_enabled(authorization)?,
    };
    let messages = [Message::user(request.query)];

    approach.run(&messages, None, &context).await
}

pub async fn handle_run(
    request: RunRequest,
    authorization: Option<String>,
    approach: Arc<SearchApproach>,
    auth_helper: Arc<AuthHelper>,
) -> Result<impl Reply, Rejection> {
    let request_id = Uuid::new_v4();

    let results = run(request, authorization.as_deref(), &approach, &auth_helper)
        .instrument(tracing::info_span!("run", %request_id))
        .await
        .map_err(warp::reject::custom)?;

    Ok(warp::reply::json(&results))
}

async fn run(
    request: RunRequest,
    authorization: Option<&str>,
    approach: &SearchApproach,
    auth_helper: &AuthHelper,
) -> Result<Vec<SearchResult>, ApiError> {
    info!(messages = request.messages.len(), "Processing approach run");

    // Claims only ever come from the token, never from the request body.
    let context = ApproachContext {
        overrides: request.context.overrides,
        auth_claims: auth_helper.get_auth_claims_if_enabled(authorization)?,
    };

    approach.run(&request.messages, None, &context).await
}
