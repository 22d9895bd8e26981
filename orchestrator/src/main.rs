use std::sync::Arc;

use search_orchestrator::approaches::{ApproachSettings, SearchApproach};
use search_orchestrator::auth::AuthHelper;
use search_orchestrator::clients::{
    AzureSearchClient, EmbeddingSettings, OpenAiEmbeddingClient, SearchSettings,
};
use search_orchestrator::{api, config, metrics, middleware};
use tracing::info;
use warp::Filter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first so LOG_LEVEL can seed the filter
    let config = config::Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!("Starting search orchestrator");
    info!(
        search_endpoint = %config.search_endpoint,
        index = %config.search_index,
        "Configuration loaded"
    );

    let http = reqwest::Client::builder().build()?;

    let search_client = Arc::new(AzureSearchClient::new(
        http.clone(),
        SearchSettings::from_config(&config),
    ));
    let embedding_client = Arc::new(OpenAiEmbeddingClient::new(
        http,
        EmbeddingSettings::from_config(&config),
    ));
    let auth_helper = Arc::new(AuthHelper::from_config(&config));

    let approach = Arc::new(SearchApproach::new(
        search_client,
        embedding_client,
        auth_helper.clone(),
        ApproachSettings {
            chatgpt_model: config.chatgpt_model.clone(),
            chatgpt_deployment: config.chatgpt_deployment.clone(),
            embedding_model: config.embedding_model.clone(),
            embedding_deployment: config.embedding_deployment.clone(),
            embedding_dimensions: config.embedding_dimensions,
            sourcepage_field: config.sourcepage_field.clone(),
            content_field: config.content_field.clone(),
            query_language: config.query_language.clone(),
            query_speller: config.query_speller.clone(),
        },
    ));

    // Build API routes
    let api_routes = api::routes(approach, auth_helper)
        .with(warp::log("api"))
        .with(middleware::cors());

    // Health check route
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({"status": "healthy"})));

    // Metrics route
    let metrics_route = warp::path("metrics").and(warp::get()).map(|| {
        let (buffer, content_type) = metrics::render();
        warp::reply::with_header(buffer, "Content-Type", content_type)
    });

    let routes = health.or(metrics_route).or(api_routes);

    // Start server
    let addr = ([0, 0, 0, 0], config.port);
    info!("Server listening on {}", addr.1);

    warp::serve(routes).run(addr).await;

    Ok(())
}
