use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Overrides = Map<String, Value>;
pub type AuthClaims = Map<String, Value>;

/// One chat turn. `content` stays a raw JSON value so a non-string payload
/// can be rejected explicitly instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Value,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Value::String(content.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApproachContext {
    #[serde(default)]
    pub overrides: Overrides,
    #[serde(default)]
    pub auth_claims: AuthClaims,
}

// Search index records

/// A document as returned by the search backend. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: Option<String>,
    pub sourcepage: Option<String>,
    pub sourcefile: Option<String>,
    pub score: Option<f64>,
    pub reranker_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorQuery {
    pub vector: Vec<f32>,
    pub k_nearest_neighbors: usize,
    pub fields: String,
}

// API Request/Response models

/// Flat record handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub content: String,
    pub similarity: f64,
    pub sourcepage: String,
    pub sourcefile: String,
}

impl From<Document> for SearchResult {
    fn from(doc: Document) -> Self {
        Self {
            title: doc.sourcepage.clone().unwrap_or_default(),
            content: doc.content.unwrap_or_default(),
            similarity: doc.score.unwrap_or(0.0),
            sourcepage: doc.sourcepage.unwrap_or_default(),
            sourcefile: doc.sourcefile.unwrap_or_default(),
        }
    }
}

/// Body sent by the search page of the web frontend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub search_type: Option<String>,
    #[serde(default)]
    pub use_semantic_ranker: bool,
    #[serde(default)]
    pub max_results: Option<u32>,
    #[serde(default)]
    pub min_similarity: Option<f64>,
}

/// Body for the approach-level endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub context: RunContext,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunContext {
    #[serde(default)]
    pub overrides: Overrides,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_document_fields_project_to_defaults() {
        let doc = Document {
            content: Some("abc".to_string()),
            ..Default::default()
        };

        let result = SearchResult::from(doc);

        assert_eq!(result.title, "");
        assert_eq!(result.content, "abc");
        assert_eq!(result.similarity, 0.0);
        assert_eq!(result.sourcepage, "");
        assert_eq!(result.sourcefile, "");
    }

    #[test]
    fn sourcepage_doubles_as_title() {
        let doc = Document {
            sourcepage: Some("Benefits-3.pdf".to_string()),
            sourcefile: Some("Benefits.pdf".to_string()),
            score: Some(0.82),
            ..Default::default()
        };

        let result = SearchResult::from(doc);

        assert_eq!(result.title, "Benefits-3.pdf");
        assert_eq!(result.sourcepage, "Benefits-3.pdf");
        assert_eq!(result.sourcefile, "Benefits.pdf");
        assert_eq!(result.similarity, 0.82);
    }

    #[test]
    fn frontend_request_uses_camel_case() {
        let request: SearchRequest = serde_json::from_value(serde_json::json!({
            "query": "find cats",
            "searchType": "vector",
            "useSemanticRanker": true,
            "maxResults": 5,
            "minSimilarity": 0.7
        }))
        .unwrap();

        assert_eq!(request.search_type.as_deref(), Some("vector"));
        assert!(request.use_semantic_ranker);
        assert_eq!(request.max_results, Some(5));
        assert_eq!(request.min_similarity, Some(0.7));
    }
}
