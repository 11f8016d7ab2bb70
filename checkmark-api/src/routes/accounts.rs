/// Account endpoints
///
/// # Endpoints
///
/// - `POST /api/accounts` - Create an account

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use checkmark_shared::models::User;
use checkmark_shared::services::SignupInput;

use crate::{app::AppState, error::ApiResult};

/// Signup handler
///
/// # Request
///
/// ```json
/// {
///   "email": "a@x.com",
///   "password": "pw123456",
///   "display_name": "A"
/// }
/// ```
///
/// # Response
///
/// `201` with the user (no password hash). No session is created; log in
/// afterwards with `POST /api/sessions`.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Malformed email, short password, bad display name
/// - `409 Conflict`: Email already registered
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(req) = payload?;
    let user = state.auth.signup(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
