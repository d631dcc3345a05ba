use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;

use crate::web::models::{
    AttachTagRequest, AuthenticatedUser, CreateTsundokuRequest, TagResponse, TsundokuResponse,
};
use crate::web::{AppError, AppState};

pub fn create_tsundoku_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tsundokus_handler).post(create_tsundoku_handler))
        .route("/{tsundoku_id}", delete(delete_tsundoku_handler))
        .route(
            "/{tsundoku_id}/tags",
            get(list_tsundoku_tags_handler).post(attach_tag_handler),
        )
        .route("/{tsundoku_id}/tags/{tag_id}", delete(detach_tag_handler))
}

async fn list_tsundokus_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<TsundokuResponse>>, AppError> {
    let tsundokus = app_state.backlog.list_tsundokus(auth_user.id).await?;
    Ok(Json(tsundokus.into_iter().map(TsundokuResponse::from).collect()))
}

async fn create_tsundoku_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateTsundokuRequest>, AppError>,
) -> Result<(StatusCode, Json<TsundokuResponse>), AppError> {
    let created = app_state.backlog.create_tsundoku(auth_user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(TsundokuResponse::from(created))))
}

async fn delete_tsundoku_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(tsundoku_id), _): WithRejection<Path<i32>, AppError>,
) -> Result<(StatusCode, &'static str), AppError> {
    app_state.backlog.delete_tsundoku(auth_user.id, tsundoku_id).await?;
    Ok((StatusCode::OK, "deleted"))
}

async fn list_tsundoku_tags_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(tsundoku_id), _): WithRejection<Path<i32>, AppError>,
) -> Result<Json<Vec<TagResponse>>, AppError> {
    let tags = app_state.backlog.tags_for_tsundoku(auth_user.id, tsundoku_id).await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

async fn attach_tag_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(tsundoku_id), _): WithRejection<Path<i32>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<AttachTagRequest>, AppError>,
) -> Result<(StatusCode, Json<TagResponse>), AppError> {
    let tag = match (payload.tag_id, payload.name) {
        (Some(tag_id), None) => {
            app_state.backlog.attach_tag(auth_user.id, tsundoku_id, tag_id).await?
        }
        (None, Some(name)) => {
            app_state
                .backlog
                .create_and_attach_tag(auth_user.id, tsundoku_id, &name)
                .await?
        }
        _ => {
            return Err(AppError::InvalidInput(
                "Provide exactly one of tagId or name.".to_string(),
            ));
        }
    };
    Ok((StatusCode::CREATED, Json(TagResponse::from(tag))))
}

async fn detach_tag_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path((tsundoku_id, tag_id)), _): WithRejection<Path<(i32, i32)>, AppError>,
) -> Result<(StatusCode, &'static str), AppError> {
    app_state.backlog.detach_tag(auth_user.id, tsundoku_id, tag_id).await?;
    Ok((StatusCode::OK, "deleted"))
}
