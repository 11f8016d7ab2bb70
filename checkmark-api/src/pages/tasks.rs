/// Task list and task form pages
///
/// All routes here sit behind
/// [`require_page_session`](crate::middleware::session::require_page_session).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use checkmark_shared::models::Task;
use checkmark_shared::services::{TaskError, TaskInput};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{error_messages, parse_task_id, PageError};
use crate::app::AppState;
use crate::middleware::session::AuthContext;

#[derive(Serialize)]
struct TaskListPage {
    display_name: Option<String>,
    errors: Vec<String>,
    tasks: Vec<Task>,
}

#[derive(Serialize)]
struct TaskFormPage {
    display_name: Option<String>,
    errors: Vec<String>,
    task_id: Option<Uuid>,
    title: String,
    description: String,
    done: bool,
}

impl TaskFormPage {
    fn new(auth: &AuthContext, task_id: Option<Uuid>, form: TaskForm) -> Self {
        Self {
            display_name: Some(auth.display_name.clone()),
            errors: Vec::new(),
            task_id,
            title: form.title,
            description: form.description,
            done: form.done.is_some(),
        }
    }
}

/// Submitted task form; an unchecked checkbox sends no `done` field
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskForm {
    /// Title
    #[serde(default)]
    pub title: String,

    /// Description; empty means none
    #[serde(default)]
    pub description: String,

    /// Present when the checkbox is ticked
    pub done: Option<String>,
}

impl From<TaskForm> for TaskInput {
    fn from(form: TaskForm) -> Self {
        TaskInput {
            title: form.title,
            description: Some(form.description),
            done: form.done.is_some(),
        }
    }
}

impl From<Task> for TaskForm {
    fn from(task: Task) -> Self {
        TaskForm {
            title: task.title,
            description: task.description.unwrap_or_default(),
            done: task.done.then(|| "on".to_string()),
        }
    }
}

/// `GET /tasks`
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Html<String>, PageError> {
    let tasks = state.tasks.list_all(auth.user_id).await?;

    state.views.render(
        "tasks.html",
        &TaskListPage {
            display_name: Some(auth.display_name),
            errors: Vec::new(),
            tasks,
        },
    )
}

/// `GET /tasks/new`
pub async fn new_form(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Html<String>, PageError> {
    let page = TaskFormPage::new(&auth, None, TaskForm::default());
    state.views.render("task_form.html", &page)
}

/// `POST /tasks/new`
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Form(form): Form<TaskForm>,
) -> Result<Response, PageError> {
    match state.tasks.create(auth.user_id, form.clone().into()).await {
        Ok(_) => Ok(Redirect::to("/tasks").into_response()),
        Err(TaskError::Validation(errors)) => {
            let mut page = TaskFormPage::new(&auth, None, form);
            page.errors = error_messages(&errors);
            render_invalid(&state, &page)
        }
        Err(e) => Err(e.into()),
    }
}

/// `GET /tasks/:id/edit`
pub async fn edit_form(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let task_id = parse_task_id(&id)?;
    let task = state.tasks.get_by_id(task_id, auth.user_id).await?;

    let page = TaskFormPage::new(&auth, Some(task_id), task.into());
    state.views.render("task_form.html", &page)
}

/// `POST /tasks/:id/edit`
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Form(form): Form<TaskForm>,
) -> Result<Response, PageError> {
    let task_id = parse_task_id(&id)?;

    match state
        .tasks
        .update(task_id, auth.user_id, form.clone().into())
        .await
    {
        Ok(_) => Ok(Redirect::to("/tasks").into_response()),
        Err(TaskError::Validation(errors)) => {
            let mut page = TaskFormPage::new(&auth, Some(task_id), form);
            page.errors = error_messages(&errors);
            render_invalid(&state, &page)
        }
        Err(e) => Err(e.into()),
    }
}

/// `POST /tasks/:id/toggle`
pub async fn toggle(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Redirect, PageError> {
    let task_id = parse_task_id(&id)?;
    state.tasks.toggle(task_id, auth.user_id).await?;
    Ok(Redirect::to("/tasks"))
}

/// `POST /tasks/:id/delete`
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Redirect, PageError> {
    let task_id = parse_task_id(&id)?;
    state.tasks.delete(task_id, auth.user_id).await?;
    Ok(Redirect::to("/tasks"))
}

fn render_invalid(state: &AppState, page: &TaskFormPage) -> Result<Response, PageError> {
    let html = state.views.render("task_form.html", page)?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, html).into_response())
}
