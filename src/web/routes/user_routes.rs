use axum::{
    Json, Router,
    extract::{Extension, State},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;

use crate::web::models::{AuthenticatedUser, UserResponse};
use crate::web::{AppError, AppState};

pub fn create_user_router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/",
        get(get_users_handler)
            .post(create_user_handler)
            .delete(delete_user_handler),
    )
}

/// Only the caller is visible.
async fn get_users_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let user = app_state.users.get_user(auth_user.id).await?;
    Ok(Json(vec![UserResponse::from(user)]))
}

/// The auth layer has already resolved-or-created the caller, so this is idempotent.
async fn create_user_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = app_state.users.get_user(auth_user.id).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

async fn delete_user_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<(StatusCode, &'static str), AppError> {
    app_state.users.delete_user(auth_user.id).await?;
    Ok((StatusCode::OK, "deleted"))
}
