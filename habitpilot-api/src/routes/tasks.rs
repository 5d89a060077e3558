/// Task endpoints
///
/// Every route is scoped to the authenticated user; another user's task is
/// reported as not found.
///
/// - `GET    /api/tasks`: list, newest first
/// - `POST   /api/tasks`: create (201)
/// - `GET    /api/tasks/:id`: fetch one
/// - `PUT    /api/tasks/:id`: partial update with a [`TaskPatch`]
/// - `DELETE /api/tasks/:id`: delete (204)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use habitpilot_shared::{
    auth::middleware::AuthContext,
    models::task::{NewTask, Task, TaskPatch},
};
use serde::Deserialize;
use std::borrow::Cow;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

const TITLE_MAX_CHARS: usize = 200;
const DESCRIPTION_MAX_CHARS: usize = 2000;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub due_date: Option<NaiveDate>,
}

/// Applies the create-time length limits to the fields a patch sets
fn validate_patch(patch: &TaskPatch) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let mut check = |field: &'static str, value: Option<&str>, max: usize, message: &'static str| {
        if value.is_some_and(|v| v.chars().count() > max) {
            errors.add(field, ValidationError::new("length").with_message(Cow::Borrowed(message)));
        }
    };
    check(
        "title",
        patch.title.as_deref(),
        TITLE_MAX_CHARS,
        "Title must be at most 200 characters",
    );
    check(
        "description",
        patch.description.as_ref().and_then(|d| d.as_deref()),
        DESCRIPTION_MAX_CHARS,
        "Description must be at most 2000 characters",
    );

    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}

fn title_required() -> ApiError {
    ApiError::BadRequest("Title is required".to_string())
}

/// Lists the caller's tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.tasks.list_tasks(auth.user_id).await?))
}

/// Creates a task
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    let title = req.title.trim();
    if title.is_empty() {
        return Err(title_required());
    }

    let task = state
        .tasks
        .insert_task(
            auth.user_id,
            NewTask {
                title: title.to_string(),
                description: req.description,
                due_date: req.due_date,
            },
        )
        .await?;

    info!(user_id = %auth.user_id, task_id = %task.id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Fetches one task
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    state
        .tasks
        .find_task(auth.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(task_not_found)
}

/// Applies a partial update
///
/// An empty patch is a 400, as are the length limits of [`create_task`].
/// `null` clears `description` and `due_date`.
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> ApiResult<Json<Task>> {
    if patch.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }
    validate_patch(&patch)?;
    if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(title_required());
    }

    let mut task = state
        .tasks
        .find_task(auth.user_id, id)
        .await?
        .ok_or_else(task_not_found)?;

    patch.apply(&mut task);

    let task = state
        .tasks
        .update_task(&task)
        .await?
        .ok_or_else(task_not_found)?;

    info!(user_id = %auth.user_id, task_id = %task.id, completed = task.completed, "Task updated");

    Ok(Json(task))
}

/// Deletes a task
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.tasks.delete_task(auth.user_id, id).await? {
        info!(user_id = %auth.user_id, task_id = %id, "Task deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(task_not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_patch_length_limits() {
        let ok = TaskPatch {
            title: Some("t".repeat(TITLE_MAX_CHARS)),
            description: Some(Some("d".repeat(DESCRIPTION_MAX_CHARS))),
            ..Default::default()
        };
        assert!(validate_patch(&ok).is_ok());

        let long = TaskPatch {
            title: Some("t".repeat(TITLE_MAX_CHARS + 1)),
            description: Some(Some("d".repeat(DESCRIPTION_MAX_CHARS + 1))),
            ..Default::default()
        };
        let errors = validate_patch(&long).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("description"));
    }

    #[test]
    fn test_validate_patch_ignores_cleared_description() {
        let patch = TaskPatch {
            description: Some(None),
            ..Default::default()
        };
        assert!(validate_patch(&patch).is_ok());
    }
}
