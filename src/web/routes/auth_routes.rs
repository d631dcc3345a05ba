use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use std::sync::Arc;
use tracing::info;

use crate::web::middleware::auth::bearer_header;
use crate::web::models::UserResponse;
use crate::web::{AppError, AppState};

pub fn create_auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/line_login", post(line_login_handler))
        .route("/line_logout", post(line_logout_handler))
}

/// Verifies the LINE token and returns the local user, creating it on first login.
async fn line_login_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, AppError> {
    let authorization = bearer_header(&headers)?;
    let profile = app_state.line_client.authenticate(&authorization).await?;
    let user = app_state.users.resolve_or_create(&profile).await?;
    info!(user_id = user.id, "User logged in with LINE.");
    Ok(Json(UserResponse::from(user)))
}

async fn line_logout_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<(StatusCode, &'static str), AppError> {
    let authorization = bearer_header(&headers)?;
    app_state.line_client.revoke(&authorization).await?;
    Ok((StatusCode::OK, "logout"))
}
