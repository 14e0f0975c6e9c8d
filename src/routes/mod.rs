use std::{sync::Arc, time::Instant};

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    middleware::{
        rate_limit::{rate_limit_middleware, ClientRateLimiter},
        request_id::{make_span_with_request_id, request_id_middleware},
    },
    services::{CatalogProvider, RecommendationSettings, TextGenerator},
};

pub mod health;
pub mod recommendations;

/// Shared application state
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    pub generator: Arc<dyn TextGenerator>,
    pub settings: RecommendationSettings,
    pub rate_limiter: Arc<ClientRateLimiter>,
    pub started_at: Instant,
    pub environment: String,
    pub tmdb_configured: bool,
    pub openai_configured: bool,
}

impl AppState {
    pub fn new(
        config: &Config,
        catalog: Arc<dyn CatalogProvider>,
        generator: Arc<dyn TextGenerator>,
    ) -> AppResult<Self> {
        let rate_limiter = ClientRateLimiter::new(
            config.rate_limit_max,
            config.rate_limit_window(),
            config.trust_forwarded_for,
        )?;

        Ok(Self {
            catalog,
            generator,
            settings: RecommendationSettings {
                recommendation_count: config.recommendation_count,
                ..Default::default()
            },
            rate_limiter: Arc::new(rate_limiter),
            started_at: Instant::now(),
            environment: config.environment.clone(),
            tmdb_configured: config.has_tmdb_credentials(),
            openai_configured: !config.openai_api_key.trim().is_empty(),
        })
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>, cors: CorsLayer, static_dir: Option<&str>) -> Router {
    let router = Router::new().nest("/api", api_routes(&state));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.with_state(state).layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
            .layer(cors),
    )
}

/// API routes under /api
fn api_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let rate_limited = middleware::from_fn_with_state(
        Arc::clone(&state.rate_limiter),
        rate_limit_middleware,
    );

    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/recommendations",
            post(recommendations::recommend).route_layer(rate_limited),
        )
        .fallback(api_not_found)
}

async fn api_not_found() -> AppError {
    AppError::NotFound("API endpoint not found".to_string())
}

/// CORS policy for the configured browser origins
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
