//! Search orchestrator: keyword, vector and hybrid retrieval over a hosted
//! search index, with optional semantic reranking.

pub mod api;
pub mod approaches;
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod models;
