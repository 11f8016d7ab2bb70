/// Task endpoints
///
/// Every handler runs behind
/// [`require_api_session`](crate::middleware::session::require_api_session)
/// and scopes its service call to the session's user. A task ID that does not
/// parse, does not exist, or belongs to another user is `404`.
///
/// # Endpoints
///
/// - `POST /api/tasks` - Create a task
/// - `GET /api/tasks` - List own tasks
/// - `GET /api/tasks/:id` - Get a task
/// - `PUT /api/tasks/:id` - Replace title, description and done
/// - `POST /api/tasks/:id/toggle` - Flip done
/// - `DELETE /api/tasks/:id` - Delete a task

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use checkmark_shared::models::Task;
use checkmark_shared::services::TaskInput;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::session::AuthContext;

fn parse_task_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::task_not_found())
}

/// Create task handler
///
/// # Request
///
/// ```json
/// {
///   "title": "buy milk",
///   "description": "2 litres",
///   "done": false
/// }
/// ```
///
/// `description` and `done` are optional. A missing `title` or an unreadable
/// body is a `422` with the offending field in `details`.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(req) = payload?;
    let task = state.tasks.create(auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// List tasks handler, oldest first
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.tasks.list_all(auth.user_id).await?))
}

/// Get task handler
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task_id = parse_task_id(&id)?;
    Ok(Json(state.tasks.get_by_id(task_id, auth.user_id).await?))
}

/// Update task handler
///
/// Full replacement: an omitted `description` clears it and an omitted
/// `done` means `false`.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let task_id = parse_task_id(&id)?;
    let Json(req) = payload?;
    Ok(Json(state.tasks.update(task_id, auth.user_id, req).await?))
}

/// Toggle task handler
pub async fn toggle_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task_id = parse_task_id(&id)?;
    Ok(Json(state.tasks.toggle(task_id, auth.user_id).await?))
}

/// Delete task handler
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let task_id = parse_task_id(&id)?;
    state.tasks.delete(task_id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
