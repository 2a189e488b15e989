//! # tunecast-server
//!
//! REST API server for asynchronous parameter tuning. Searches are
//! submitted as batches, fan out into one job per (sku, model) pair, and
//! run on a background worker that streams progress into the job feed.

use axum::http::StatusCode;
use axum::{
    routing::{get, post},
    Json, Router,
};
use dashmap::DashMap;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tunecast_cache::OptimizationCache;
use tunecast_models::standard_registry;
use tuner_facade::{ModelRegistry, ParamSet};

mod routes;
mod store;
mod worker;

use store::{JobStore, SearchOptions};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub jobs: Arc<JobStore>,
    pub cache: Arc<OptimizationCache>,
    /// Latest submitted series per sku
    pub series: Arc<DashMap<String, Arc<Vec<f64>>>>,
    /// Hash of the latest series per sku
    pub hashes: Arc<DashMap<String, String>>,
    /// Search options per submission batch
    pub batches: Arc<DashMap<String, SearchOptions>>,
}

/// Liveness probe - is the server running?
async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe - is the server ready to handle requests?
async fn readiness(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> (StatusCode, Json<serde_json::Value>) {
    // Verify the catalog can still build and fit a model.
    let check = state
        .registry
        .get("ses")
        .and_then(|spec| spec.build_model(&ParamSet::new().with("alpha", 0.3), 1))
        .and_then(|mut model| model.train(&[1.0, 2.0, 3.0]));
    match check {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ready",
                "version": env!("CARGO_PKG_VERSION"),
                "models": state.registry.len(),
                "jobs": state.jobs.len()
            })),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "not ready",
                "error": err.to_string()
            })),
        ),
    }
}

#[tokio::main]
async fn main() {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunecast_server=info,tower_http=info".into()),
        )
        .init();

    // Create application state
    let state = AppState {
        registry: Arc::new(standard_registry()),
        jobs: Arc::new(JobStore::new()),
        cache: Arc::new(OptimizationCache::new()),
        series: Arc::new(DashMap::new()),
        hashes: Arc::new(DashMap::new()),
        batches: Arc::new(DashMap::new()),
    };

    // Background worker draining the job queue
    worker::spawn(state.clone());

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with middleware
    let app = Router::new()
        // Health endpoints (Kubernetes-compatible)
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        // API endpoints
        .route("/api/v1/searches", post(routes::submit_searches))
        .route("/api/v1/jobs", get(routes::list_jobs))
        .route("/api/v1/jobs/:id/cancel", post(routes::cancel_job))
        .route("/api/v1/best-results", get(routes::best_results))
        // Middleware layers
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Server configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("PORT must be a valid number");
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Invalid HOST:PORT configuration");

    tracing::info!(
        "tunecast-server v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
