/// Signup, login and logout pages
///
/// Validation, duplicate-email and bad-credential failures re-render the
/// form with the message and the submitted email; the password is never
/// echoed back.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::CookieJar;
use checkmark_shared::services::{AuthError, LoginInput, SignupInput};
use serde::Serialize;

use super::{error_messages, PageError};
use crate::app::AppState;
use crate::middleware::session::{clear_session_cookie, session_cookie, session_token};

#[derive(Debug, Default, Serialize)]
struct AuthForm {
    display_name: Option<String>,
    errors: Vec<String>,
    email: String,
    display_name_input: String,
}

/// `GET /`
pub async fn home() -> Redirect {
    Redirect::to("/tasks")
}

/// `GET /signup`
pub async fn signup_form(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    state.views.render("signup.html", &AuthForm::default())
}

/// `POST /signup`
pub async fn signup(
    State(state): State<AppState>,
    Form(input): Form<SignupInput>,
) -> Result<Response, PageError> {
    let mut page = AuthForm {
        email: input.email.clone(),
        display_name_input: input.display_name.clone(),
        ..Default::default()
    };

    let status = match state.auth.signup(input).await {
        Ok(_) => return Ok(Redirect::to("/login").into_response()),
        Err(AuthError::Validation(errors)) => {
            page.errors = error_messages(&errors);
            StatusCode::UNPROCESSABLE_ENTITY
        }
        Err(AuthError::DuplicateEmail) => {
            page.errors = vec![AuthError::DuplicateEmail.to_string()];
            StatusCode::CONFLICT
        }
        Err(e) => return Err(e.into()),
    };

    Ok((status, state.views.render("signup.html", &page)?).into_response())
}

/// `GET /login`
pub async fn login_form(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    state.views.render("login.html", &AuthForm::default())
}

/// `POST /login`
///
/// Any session the browser already carried is invalidated before the new
/// one is issued.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<LoginInput>,
) -> Result<Response, PageError> {
    let email = input.email.clone();

    let user = match state.auth.login(input).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            let page = AuthForm {
                errors: vec![AuthError::InvalidCredentials.to_string()],
                email,
                ..Default::default()
            };
            let html = state.views.render("login.html", &page)?;
            return Ok((StatusCode::UNAUTHORIZED, html).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(previous) = session_token(&jar) {
        state.sessions.invalidate(&previous).await?;
    }

    let token = state.sessions.establish(user.id, &user.display_name).await?;
    let cookie = session_cookie(&token, state.sessions.ttl(), state.config.is_production())
        .map_err(|e| PageError::internal(e.to_string()))?;

    Ok((jar.add(cookie), Redirect::to("/tasks")).into_response())
}

/// `POST /logout`
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<Response, PageError> {
    if let Some(token) = session_token(&jar) {
        state.sessions.invalidate(&token).await?;
    }

    Ok((clear_session_cookie(jar), Redirect::to("/login")).into_response())
}
