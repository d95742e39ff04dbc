use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};

use crate::{auth::verify_jwt, error::AppError, state::AppState};

/// Resolves the bearer token to the caller's user id and stores it as a
/// request extension for the handlers behind this layer.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let user_id = verify_jwt(token, &state.config.jwt_secret)?.user_id()?;
    req.extensions_mut().insert(user_id);

    Ok(next.run(req).await)
}
