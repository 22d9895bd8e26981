use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::models::Overrides;

pub const DEFAULT_TOP: usize = 3;
/// Largest page the search service returns in one request.
pub const MAX_TOP: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    Text,
    Vectors,
    Hybrid,
}

impl RetrievalMode {
    /// A missing or null `retrieval_mode` means hybrid.
    pub fn from_overrides(overrides: &Overrides) -> Result<Self> {
        match overrides.get("retrieval_mode") {
            None | Some(Value::Null) => Ok(RetrievalMode::Hybrid),
            Some(Value::String(mode)) => mode.parse(),
            Some(other) => Err(ApiError::InvalidInput(format!(
                "retrieval_mode must be a string, got {}",
                other
            ))),
        }
    }

    pub fn use_text_search(self) -> bool {
        matches!(self, RetrievalMode::Text | RetrievalMode::Hybrid)
    }

    pub fn use_vector_search(self) -> bool {
        matches!(self, RetrievalMode::Vectors | RetrievalMode::Hybrid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RetrievalMode::Text => "text",
            RetrievalMode::Vectors => "vectors",
            RetrievalMode::Hybrid => "hybrid",
        }
    }
}

impl std::str::FromStr for RetrievalMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "keyword" => Ok(RetrievalMode::Text),
            "vector" | "vectors" => Ok(RetrievalMode::Vectors),
            "hybrid" => Ok(RetrievalMode::Hybrid),
            other => Err(ApiError::InvalidInput(format!(
                "unknown retrieval_mode '{}'",
                other
            ))),
        }
    }
}

/// Typed view over the recognized override keys.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub mode: RetrievalMode,
    pub use_semantic_ranker: bool,
    pub use_semantic_captions: bool,
    pub top: usize,
    pub minimum_search_score: f64,
    pub minimum_reranker_score: f64,
}

impl SearchOptions {
    pub fn from_overrides(overrides: &Overrides) -> Result<Self> {
        Ok(Self {
            mode: RetrievalMode::from_overrides(overrides)?,
            use_semantic_ranker: flag(overrides, "semantic_ranker")?,
            use_semantic_captions: flag(overrides, "semantic_captions")?,
            top: top(overrides)?,
            minimum_search_score: score(overrides, "minimum_search_score")?,
            minimum_reranker_score: score(overrides, "minimum_reranker_score")?,
        })
    }
}

fn flag(overrides: &Overrides, key: &str) -> Result<bool> {
    match overrides.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(true),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(false),
        Some(other) => Err(ApiError::InvalidInput(format!(
            "{} must be a boolean, got {}",
            key, other
        ))),
    }
}

fn top(overrides: &Overrides) -> Result<usize> {
    let invalid = |v: &Value| {
        ApiError::InvalidInput(format!(
            "top must be an integer between 0 and {}, got {}",
            MAX_TOP, v
        ))
    };

    let top = match overrides.get("top") {
        None | Some(Value::Null) => return Ok(DEFAULT_TOP),
        Some(v @ Value::Number(n)) => match n.as_u64() {
            Some(u) => u,
            // 2.0 and friends truncate like an int() cast
            None => n
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && *f <= MAX_TOP as f64)
                .map(|f| f as u64)
                .ok_or_else(|| invalid(v))?,
        },
        Some(v @ Value::String(s)) => s.trim().parse::<u64>().map_err(|_| invalid(v))?,
        Some(v) => return Err(invalid(v)),
    };

    if top > MAX_TOP as u64 {
        return Err(ApiError::InvalidInput(format!(
            "top must be an integer between 0 and {}, got {}",
            MAX_TOP, top
        )));
    }
    Ok(top as usize)
}

fn score(overrides: &Overrides, key: &str) -> Result<f64> {
    let invalid = |v: &Value| {
        ApiError::InvalidInput(format!("{} must be a finite number, got {}", key, v))
    };

    match overrides.get(key) {
        None | Some(Value::Null) => Ok(0.0),
        Some(v @ Value::Number(n)) => n.as_f64().ok_or_else(|| invalid(v)),
        Some(v @ Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or_else(|| invalid(v)),
        Some(v) => Err(invalid(v)),
    }
}
