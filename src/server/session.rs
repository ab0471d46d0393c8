//! Login and logout.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    success: bool,
}

/// `POST /jwt`: issues a session token for `email` and sets it as a cookie.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(login) = payload?;
    if login.email.trim().is_empty() {
        return Err(ApiError::BadRequest("email is required".to_string()));
    }

    let token = state
        .tokens
        .issue(&login.email)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    tracing::info!("Issued session token for {}", login.email);

    Ok((
        [(header::SET_COOKIE, state.cookies.session_cookie(&token))],
        Json(SuccessResponse { success: true }),
    ))
}

/// `POST /logout`: clears the cookie. The token itself stays valid until it
/// expires.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, state.cookies.cleared_cookie())],
        Json(SuccessResponse { success: true }),
    )
}
