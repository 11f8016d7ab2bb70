/// Session cookie resolution
///
/// Reads the `checkmark_session` cookie, resolves it through the
/// [`SessionManager`](checkmark_shared::auth::session::SessionManager) and
/// inserts an [`AuthContext`] into the request extensions. Handlers behind
/// these layers extract `Extension<AuthContext>` and pass `user_id` to the
/// services.
///
/// Two variants differ only in how a missing session is answered:
///
/// - [`require_api_session`]: `401` JSON error
/// - [`require_page_session`]: `303` redirect to `/login`

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::time::Duration;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "checkmark_session";

/// The authenticated caller of a request
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Authenticated user
    pub user_id: Uuid,

    /// Display name bound at login
    pub display_name: String,

    /// Session token the request carried
    pub token: String,
}

/// Builds the `Set-Cookie` value for a freshly established session
pub fn session_cookie(token: &str, ttl: Duration, secure: bool) -> Result<Cookie<'static>, ApiError> {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }

    Cookie::parse(cookie)
        .map_err(|e| ApiError::InternalError(format!("Failed to build session cookie: {}", e)))
}

/// Removes the session cookie from `jar`
pub fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Session token carried by the request, if any
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Resolves the request's cookie to an [`AuthContext`]
///
/// `Ok(None)` for a missing, malformed, unknown or expired session.
pub async fn resolve_session(
    state: &AppState,
    jar: &CookieJar,
) -> Result<Option<AuthContext>, ApiError> {
    let Some(token) = session_token(jar) else {
        return Ok(None);
    };

    let session = state.sessions.resolve(&token).await?;

    Ok(session.map(|s| AuthContext {
        user_id: s.user_id,
        display_name: s.display_name,
        token,
    }))
}

/// Rejects requests without a live session with `401`
pub async fn require_api_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let jar = CookieJar::from_headers(req.headers());
    let context = resolve_session(&state, &jar)
        .await?
        .ok_or_else(ApiError::unauthenticated)?;

    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}

/// Redirects requests without a live session to the login page
pub async fn require_page_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(req.headers());

    match resolve_session(&state, &jar).await {
        Ok(Some(context)) => {
            req.extensions_mut().insert(context);
            next.run(req).await
        }
        Ok(None) => Redirect::to("/login").into_response(),
        Err(e) => e.into_response(),
    }
}
