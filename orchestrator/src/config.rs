use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiHost {
    Azure,
    OpenAi,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub log_level: String,

    // Azure AI Search
    pub search_endpoint: String,
    pub search_index: String,
    pub search_key: Option<String>,
    pub search_api_version: String,
    pub query_language: String,
    pub query_speller: String,
    pub sourcepage_field: String,
    pub content_field: String,
    pub embedding_field: String,

    // OpenAI / Azure OpenAI
    pub openai_host: OpenAiHost,
    pub openai_endpoint: String,
    pub openai_api_version: String,
    pub openai_api_key: Option<String>,
    pub chatgpt_model: String,
    pub chatgpt_deployment: Option<String>,
    pub embedding_model: String,
    pub embedding_deployment: Option<String>,
    pub embedding_dimensions: usize,

    // Auth
    pub use_authentication: bool,
    pub enforce_access_control: bool,
    pub jwt_secret: String,
    pub server_app_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let openai_host = match var_or("OPENAI_HOST", "azure").as_str() {
            "azure" => OpenAiHost::Azure,
            "openai" => OpenAiHost::OpenAi,
            other => anyhow::bail!("OPENAI_HOST must be 'azure' or 'openai', got '{}'", other),
        };
        let default_openai_endpoint = match openai_host {
            OpenAiHost::Azure => "https://localhost.openai.azure.com",
            OpenAiHost::OpenAi => "https://api.openai.com/v1",
        };

        Ok(Config {
            port: var_or("PORT", "8080")
                .parse()
                .context("PORT must be a valid port number")?,
            log_level: var_or("LOG_LEVEL", "info"),
            search_endpoint: var_or("AZURE_SEARCH_ENDPOINT", "https://localhost.search.windows.net"),
            search_index: var_or("AZURE_SEARCH_INDEX", "gptkbindex"),
            search_key: env::var("AZURE_SEARCH_KEY").ok(),
            search_api_version: var_or("AZURE_SEARCH_API_VERSION", "2024-07-01"),
            query_language: var_or("AZURE_SEARCH_QUERY_LANGUAGE", "en-us"),
            query_speller: var_or("AZURE_SEARCH_QUERY_SPELLER", "lexicon"),
            sourcepage_field: var_or("KB_FIELDS_SOURCEPAGE", "sourcepage"),
            content_field: var_or("KB_FIELDS_CONTENT", "content"),
            embedding_field: var_or("AZURE_SEARCH_EMBEDDING_FIELD", "embedding"),
            openai_host,
            openai_endpoint: var_or("AZURE_OPENAI_ENDPOINT", default_openai_endpoint),
            openai_api_version: var_or("AZURE_OPENAI_API_VERSION", "2024-06-01"),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            chatgpt_model: var_or("AZURE_OPENAI_CHATGPT_MODEL", "gpt-35-turbo"),
            chatgpt_deployment: env::var("AZURE_OPENAI_CHATGPT_DEPLOYMENT").ok(),
            embedding_model: var_or("AZURE_OPENAI_EMB_MODEL_NAME", "text-embedding-ada-002"),
            embedding_deployment: env::var("AZURE_OPENAI_EMB_DEPLOYMENT").ok(),
            embedding_dimensions: var_or("AZURE_OPENAI_EMB_DIMENSIONS", "1536")
                .parse()
                .context("AZURE_OPENAI_EMB_DIMENSIONS must be an integer")?,
            use_authentication: parse_bool("AZURE_USE_AUTHENTICATION")?,
            enforce_access_control: parse_bool("AZURE_ENFORCE_ACCESS_CONTROL")?,
            jwt_secret: var_or("JWT_SECRET", "dev-secret-change-in-production"),
            server_app_id: env::var("AZURE_SERVER_APP_ID").ok(),
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(key: &str) -> Result<bool> {
    match env::var(key) {
        Ok(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            other => anyhow::bail!("{} must be true or false, got '{}'", key, other),
        },
        Err(_) => Ok(false),
    }
}
