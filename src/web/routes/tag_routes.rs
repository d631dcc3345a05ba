use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;

use crate::web::models::{AuthenticatedUser, CreateTagRequest, TagResponse};
use crate::web::{AppError, AppState};

// --- Route Handlers ---

async fn create_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateTagRequest>, AppError>,
) -> Result<(StatusCode, Json<TagResponse>), AppError> {
    let tag = app_state
        .backlog
        .create_tag(authenticated_user.id, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(TagResponse::from(tag))))
}

async fn get_user_tags_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<TagResponse>>, AppError> {
    let tags = app_state.backlog.list_tags(authenticated_user.id).await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

async fn delete_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(tag_id), _): WithRejection<Path<i32>, AppError>,
) -> Result<(StatusCode, &'static str), AppError> {
    app_state
        .backlog
        .delete_tag(authenticated_user.id, tag_id)
        .await?;
    Ok((StatusCode::OK, "deleted"))
}

// --- Router ---

pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_user_tags_handler).post(create_tag_handler))
        .route("/{tag_id}", delete(delete_tag_handler))
}
