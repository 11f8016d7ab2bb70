/// Session endpoints
///
/// # Endpoints
///
/// - `POST /api/sessions` - Log in, sets the session cookie
/// - `DELETE /api/sessions` - Log out
/// - `GET /api/sessions/current` - Who am I

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::CookieJar;
use checkmark_shared::models::User;
use checkmark_shared::services::LoginInput;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiResult;
use crate::middleware::session::{
    clear_session_cookie, session_cookie, session_token, AuthContext,
};

/// Current session response
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentSessionResponse {
    /// Authenticated user
    pub user_id: Uuid,

    /// Display name bound at login
    pub display_name: String,
}

/// Login handler
///
/// # Response
///
/// `200` with the user and a `Set-Cookie: checkmark_session=...` header.
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> ApiResult<(CookieJar, Json<User>)> {
    let Json(req) = payload?;
    let user = state.auth.login(req).await?;

    if let Some(previous) = session_token(&jar) {
        state.sessions.invalidate(&previous).await?;
    }

    let token = state.sessions.establish(user.id, &user.display_name).await?;
    let cookie = session_cookie(&token, state.sessions.ttl(), state.config.is_production())?;

    Ok((jar.add(cookie), Json(user)))
}

/// Logout handler
///
/// Always `204`; a missing or stale cookie is not an error.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, StatusCode)> {
    if let Some(token) = session_token(&jar) {
        state.sessions.invalidate(&token).await?;
    }

    Ok((clear_session_cookie(jar), StatusCode::NO_CONTENT))
}

/// Current session handler
pub async fn current(Extension(auth): Extension<AuthContext>) -> Json<CurrentSessionResponse> {
    Json(CurrentSessionResponse {
        user_id: auth.user_id,
        display_name: auth.display_name,
    })
}
