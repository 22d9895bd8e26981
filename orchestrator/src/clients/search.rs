use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::error_for_status;
use crate::approaches::{SearchBackend, SearchQuery};
use crate::config::Config;
use crate::error::Result;
use crate::models::Document;

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub endpoint: String,
    pub index: String,
    pub api_key: Option<String>,
    pub api_version: String,
}

impl SearchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.search_endpoint.clone(),
            index: config.search_index.clone(),
            api_key: config.search_key.clone(),
            api_version: config.search_api_version.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<Map<String, Value>>,
}

/// Azure AI Search over its REST API.
pub struct AzureSearchClient {
    http: reqwest::Client,
    settings: SearchSettings,
}

impl AzureSearchClient {
    pub fn new(http: reqwest::Client, settings: SearchSettings) -> Self {
        Self { http, settings }
    }

    fn url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.index,
            self.settings.api_version
        )
    }
}

/// Builds the JSON body for `docs/search`.
pub fn build_request_body(query: &SearchQuery) -> Value {
    let mut body = json!({ "top": query.top });

    if query.use_text_search {
        body["search"] = json!(query.query_text);
    }
    if let Some(filter) = &query.filter {
        body["filter"] = json!(filter);
    }
    if query.use_vector_search && !query.vectors.is_empty() {
        body["vectorQueries"] = query
            .vectors
            .iter()
            .map(|v| {
                json!({
                    "kind": "vector",
                    "vector": v.vector,
                    "k": v.k_nearest_neighbors,
                    "fields": v.fields,
                })
            })
            .collect();
    }
    // Semantic ranking reranks the lexical results, so it needs text search.
    if query.use_semantic_ranker && query.use_text_search {
        body["queryType"] = json!("semantic");
        body["semanticConfiguration"] = json!("default");
        body["queryLanguage"] = json!(query.query_language);
        body["speller"] = json!(query.query_speller);
        if query.use_semantic_captions {
            body["captions"] = json!("extractive|highlight-false");
        }
    }

    body
}

fn string_field(doc: &Map<String, Value>, key: &str) -> Option<String> {
    doc.get(key).and_then(Value::as_str).map(str::to_string)
}

pub fn parse_document(doc: &Map<String, Value>, query: &SearchQuery) -> Document {
    Document {
        content: string_field(doc, &query.content_field),
        sourcepage: string_field(doc, &query.sourcepage_field),
        sourcefile: string_field(doc, "sourcefile"),
        score: doc.get("@search.score").and_then(Value::as_f64),
        reranker_score: doc.get("@search.rerankerScore").and_then(Value::as_f64),
    }
}

/// Missing scores count as zero against the thresholds.
pub fn meets_thresholds(doc: &Document, query: &SearchQuery) -> bool {
    doc.score.unwrap_or(0.0) >= query.minimum_search_score
        && doc.reranker_score.unwrap_or(0.0) >= query.minimum_reranker_score
}

#[async_trait]
impl SearchBackend for AzureSearchClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Document>> {
        let body = build_request_body(query);
        debug!(index = %self.settings.index, "Sending search request");

        let mut request = self.http.post(self.url()).json(&body);
        if let Some(key) = &self.settings.api_key {
            request = request.header("api-key", key);
        }

        let response = error_for_status("search service", request.send().await?).await?;
        let parsed: SearchResponse = response.json().await?;
        let returned = parsed.value.len();

        let documents: Vec<Document> = parsed
            .value
            .iter()
            .map(|doc| parse_document(doc, query))
            .filter(|doc| meets_thresholds(doc, query))
            .collect();

        debug!(returned, kept = documents.len(), "Applied score thresholds");
        Ok(documents)
    }
}
