use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    routing::get,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;

use crate::web::models::{AuthenticatedUser, TsundokuResponse};
use crate::web::{AppError, AppState};

pub fn create_time_router() -> Router<Arc<AppState>> {
    Router::new().route("/{minutes}", get(free_time_handler))
}

/// Site tsundokus that can be read in `minutes`.
async fn free_time_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(minutes), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<Vec<TsundokuResponse>>, AppError> {
    let budget: u32 = minutes.trim().parse().map_err(|_| {
        AppError::InvalidInput(format!("{minutes:?} is not a non-negative number of minutes"))
    })?;
    let tsundokus = app_state.backlog.free_tsundokus(auth_user.id, budget).await?;
    Ok(Json(tsundokus.into_iter().map(TsundokuResponse::from).collect()))
}
