use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::web::models::AuthenticatedUser;
use crate::web::{AppState, error::AppError};

/// Resolves the `Authorization` header to a local user, or rejects the
/// request before any handler runs.
pub async fn auth(
    State(state): State<Arc<AppState>>,
    mut req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    let authorization = bearer_header(req.headers())?;

    let profile = state.line_client.authenticate(&authorization).await.map_err(|e| {
        warn!(error = %e, path = %req.uri().path(), "LINE authentication failed.");
        AppError::from(e)
    })?;
    let user = state.users.resolve_or_create(&profile).await?;

    req.extensions_mut().insert(AuthenticatedUser {
        id: user.id,
        name: user.name,
    });
    Ok(next.run(req).await)
}

/// Raw `Authorization` header value; validation of its shape is left to the LINE client.
pub fn bearer_header(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
        .ok_or_else(|| AppError::Unauthenticated("Missing Authorization header".to_string()))
}
