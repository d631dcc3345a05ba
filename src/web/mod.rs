use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::db::store::BacklogStore;
use crate::server::config::ServerConfig;
use crate::services::{BacklogService, LineClient, UserDirectory};
use crate::web::{middleware::auth, routes::*};

pub use error::AppError;

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub backlog: BacklogService,
    pub users: UserDirectory,
    pub line_client: Arc<LineClient>,
}

async fn health_check_handler() -> &'static str {
    "OK"
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin.");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

pub fn create_axum_router(
    store: Arc<dyn BacklogStore>,
    line_client: Arc<LineClient>,
    config: Arc<ServerConfig>,
) -> Router {
    let app_state = Arc::new(AppState {
        backlog: BacklogService::new(store.clone()),
        users: UserDirectory::new(store),
        line_client,
    });

    let protected = Router::new()
        .nest("/users", user_routes::create_user_router())
        .nest("/tsundokus", tsundoku_routes::create_tsundoku_router())
        .nest("/tags", tag_routes::create_tags_router())
        .nest("/time", time_routes::create_time_router())
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth));

    Router::new()
        .route("/api/health", get(health_check_handler))
        .nest("/api", auth_routes::create_auth_router().merge(protected))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
}
