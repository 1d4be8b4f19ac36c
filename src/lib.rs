use axum::{Router, extract::FromRef, http::HeaderName};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Listing-filter gate, leaf-first.
pub mod filter;
pub mod privilege;
pub mod policy;
pub mod listing;

// Collaborators and plumbing.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Routes grouped by how they treat credentials.
pub mod routes;
use routes::{feeds, listing as listing_routes, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use policy::FilterPolicy;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every listing endpoint, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_channel_videos, handlers::list_account_videos, handlers::list_videos,
        handlers::search_videos, handlers::list_playlist_videos, handlers::get_videos_feed
    ),
    components(
        schemas(models::Video, models::VideoPrivacy, models::ErrorBody)
    ),
    tags(
        (name = "video-listing-gate", description = "Filtered video listings")
    )
)]
struct ApiDoc;

/// PolicyState
///
/// The filter rule table, shared read-only by every request.
pub type PolicyState = Arc<FilterPolicy>;

/// AppState
///
/// Shared, immutable application state: the collaborators, the configuration and
/// the filter policy built from it at startup.
#[derive(Clone)]
pub struct AppState {
    /// User lookup and video corpus.
    pub repo: RepositoryState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
    /// Filter rule table.
    pub policy: PolicyState,
}

impl AppState {
    /// Builds the state, deriving the filter policy from `config`.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        let policy = Arc::new(config.filter_policy());
        Self {
            repo,
            config,
            policy,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, applies the observability layers and registers
/// the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    // Listings and feeds are read by third-party front-ends and feed readers.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(listing_routes::listing_routes())
        .merge(feeds::feed_routes())
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing, correlated by the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one HTTP request, carrying the `x-request-id` so every log line of the
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
