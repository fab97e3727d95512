/// Task resource endpoints
///
/// Every handler runs behind the authentication middleware and receives the
/// resolved `AuthContext` from request extensions; the owning user id is
/// threaded into every gateway call, so a caller can only ever see or
/// mutate their own tasks.
///
/// One deliberate asymmetry: `GET /:id`
/// answers 404 for an absent or foreign task, while `PATCH` and `DELETE`
/// report the affected row count and answer 0 instead of 404.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::authenticator::AuthContext,
    models::{
        task::{CreateTask, Task},
        task_patch::TaskPatch,
    },
};
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task name
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    /// Optional priority
    #[serde(default)]
    pub priority: Option<i32>,

    /// Completion flag, defaults to false
    #[serde(default)]
    pub is_completed: bool,
}

/// Create task response
#[derive(Debug, Serialize)]
pub struct CreateTaskResponse {
    /// Generated task id
    pub id: i64,
}

/// Row count response for PATCH and DELETE
#[derive(Debug, Serialize)]
pub struct RowsAffectedResponse {
    /// Number of rows the statement touched (0 or 1)
    pub rows_affected: u64,
}

/// `GET /v1/tasks` - lists the caller's tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list_by_user(&state.db, auth.user_id).await?;

    Ok(Json(tasks))
}

/// `GET /v1/tasks/:id` - fetches one task
///
/// # Errors
///
/// - `404 Not Found`: No such task for this user; a task owned by someone
///   else answers identically
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// `POST /v1/tasks` - creates a task
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Name missing or empty
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<CreateTaskResponse>)> {
    req.validate()?;

    let task = Task::create(
        &state.db,
        auth.user_id,
        CreateTask {
            name: req.name,
            priority: req.priority,
            is_completed: req.is_completed,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(CreateTaskResponse { id: task.id })))
}

/// `PATCH /v1/tasks/:id` - partial update
///
/// The body is a sparse object; only the keys present are written, with
/// `"priority": null` clearing the column. An empty body and an unmatched
/// id both report zero affected rows.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(patch): Json<TaskPatch>,
) -> ApiResult<Json<RowsAffectedResponse>> {
    let rows_affected = Task::update(&state.db, id, auth.user_id, patch).await?;

    Ok(Json(RowsAffectedResponse { rows_affected }))
}

/// `DELETE /v1/tasks/:id` - deletes a task
///
/// Same zero-row semantics as the update path.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<RowsAffectedResponse>> {
    let rows_affected = Task::delete(&state.db, id, auth.user_id).await?;

    Ok(Json(RowsAffectedResponse { rows_affected }))
}
