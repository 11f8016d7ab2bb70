/// Server-rendered HTML pages
///
/// Plain HTML forms with POST-redirect-GET. Templates live in
/// `checkmark-api/templates` and are compiled into the binary.
///
/// # Errors
///
/// Handlers return `Result<_, PageError>`. A [`PageError`] response carries
/// only a status and itself as a response extension; the
/// [`render_error_pages`] layer turns it into the HTML error page, since it
/// has access to the templates.
///
/// # Routes
///
/// ```text
/// GET  /                  -> 303 /tasks
/// GET  /signup, /login    forms
/// POST /signup            -> 303 /login
/// POST /login             -> 303 /tasks (sets the session cookie)
/// POST /logout            -> 303 /login
/// GET  /tasks             list
/// GET  /tasks/new         form
/// POST /tasks/new         -> 303 /tasks
/// GET  /tasks/:id/edit    form, pre-filled
/// POST /tasks/:id/edit    -> 303 /tasks
/// POST /tasks/:id/toggle  -> 303 /tasks
/// POST /tasks/:id/delete  -> 303 /tasks
/// ```

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use checkmark_shared::auth::session::SessionError;
use checkmark_shared::services::{AuthError, TaskError};
use serde::Serialize;
use tera::Tera;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::app::AppState;
use crate::error::validation_details;

pub mod auth;
pub mod tasks;

const TEMPLATES: [(&str, &str); 6] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("signup.html", include_str!("../../templates/signup.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("tasks.html", include_str!("../../templates/tasks.html")),
    ("task_form.html", include_str!("../../templates/task_form.html")),
    ("error.html", include_str!("../../templates/error.html")),
];

/// Compiled page templates
pub struct Views {
    tera: Tera,
}

impl Views {
    /// Compiles the embedded templates
    ///
    /// # Errors
    ///
    /// Returns an error if a template fails to parse.
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera })
    }

    /// Renders `template` with `context`
    pub fn render<T: Serialize>(&self, template: &str, context: &T) -> Result<Html<String>, PageError> {
        let context = tera::Context::from_serialize(context)
            .map_err(|e| PageError::internal(format!("Invalid context for {}: {}", template, e)))?;

        self.tera
            .render(template, &context)
            .map(Html)
            .map_err(|e| PageError::internal(format!("Failed to render {}: {:?}", template, e)))
    }

    /// Renders the error page for `status`
    pub fn error_page(&self, status: StatusCode, message: &str) -> Response {
        let page = ErrorPage {
            display_name: None,
            errors: Vec::new(),
            status: status.as_u16(),
            message: message.to_string(),
        };

        match self.render("error.html", &page) {
            Ok(html) => (status, html).into_response(),
            Err(_) => (status, message.to_string()).into_response(),
        }
    }
}

#[derive(Serialize)]
struct ErrorPage {
    display_name: Option<String>,
    errors: Vec<String>,
    status: u16,
    message: String,
}

/// A page request that ends in an error page
#[derive(Debug, Clone)]
pub struct PageError {
    status: StatusCode,
    message: String,
}

impl PageError {
    /// 404 page
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    /// 500 page; `detail` is logged, never shown
    pub fn internal(detail: impl Into<String>) -> Self {
        tracing::error!("Internal error: {}", detail.into());
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Something went wrong. Please try again.".to_string(),
        }
    }

    /// HTTP status of the page
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let mut response = self.status.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl From<TaskError> for PageError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::TaskNotFound => PageError::not_found("Task not found"),
            TaskError::UserNotFound => Self {
                status: StatusCode::UNAUTHORIZED,
                message: "Your account no longer exists. Please sign up again.".to_string(),
            },
            TaskError::Validation(errors) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: error_messages(&errors).join(" "),
            },
            TaskError::Repository(e) => PageError::internal(e.to_string()),
        }
    }
}

impl From<AuthError> for PageError {
    fn from(err: AuthError) -> Self {
        PageError::internal(err.to_string())
    }
}

impl From<SessionError> for PageError {
    fn from(err: SessionError) -> Self {
        PageError::internal(err.to_string())
    }
}

/// Replaces bodiless [`PageError`] responses with the rendered error page
pub async fn render_error_pages(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    match response.extensions_mut().remove::<PageError>() {
        Some(err) => state.views.error_page(err.status, &err.message),
        None => response,
    }
}

/// Human-readable messages from validation errors, ordered by field
pub(crate) fn error_messages(errors: &ValidationErrors) -> Vec<String> {
    validation_details(errors)
        .into_iter()
        .map(|d| d.message)
        .collect()
}

/// Parses a task ID path segment; anything malformed is a missing task
pub(crate) fn parse_task_id(raw: &str) -> Result<Uuid, PageError> {
    Uuid::parse_str(raw).map_err(|_| PageError::not_found("Task not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_compile() {
        assert!(Views::new().is_ok());
    }

    #[test]
    fn test_error_page_renders() {
        let views = Views::new().unwrap();
        let response = views.error_page(StatusCode::NOT_FOUND, "Task not found");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_render_escapes_html() {
        #[derive(Serialize)]
        struct Page {
            display_name: Option<String>,
            errors: Vec<String>,
            status: u16,
            message: String,
        }

        let views = Views::new().unwrap();
        let Html(body) = views
            .render(
                "error.html",
                &Page {
                    display_name: Some("<b>Ada</b>".to_string()),
                    errors: vec![],
                    status: 404,
                    message: "<script>".to_string(),
                },
            )
            .unwrap();

        assert!(body.contains("&lt;b&gt;Ada"));
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn test_parse_task_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_task_id(&id.to_string()).unwrap(), id);
        assert_eq!(
            parse_task_id("not-a-uuid").unwrap_err().status(),
            StatusCode::NOT_FOUND
        );
    }
}
