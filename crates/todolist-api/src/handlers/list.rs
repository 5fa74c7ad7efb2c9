use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use todolist_core::TaskListForm;
use todolist_db::TaskListRecord;

use super::task::{task_to_response, TaskResponse};
use super::{requester, ApiError};
use crate::state::ApiState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub id: i64,
    pub name: String,
    pub members: Vec<i64>,
    pub created_at: String,
}

/// Task lists the requesting user is a member of
pub async fn my_lists(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ListResponse>>, ApiError> {
    let user = requester(&headers).ok_or(ApiError::Unauthorized)?;

    let records = state.db.lists_for_user(user).await?;

    let mut responses = Vec::with_capacity(records.len());
    for record in &records {
        let members = state.db.list_members(record.id).await?;
        responses.push(list_to_response(record, members));
    }

    Ok(Json(responses))
}

/// Create a task list and its membership set
pub async fn create_list(
    State(state): State<ApiState>,
    Json(payload): Json<TaskListForm>,
) -> Result<Json<ListResponse>, ApiError> {
    let form = payload.validate()?;
    let record = state.db.create_list(&form).await?;

    tracing::info!("Created task list: {} ({})", record.name, record.id);
    Ok(Json(list_to_response(&record, form.members)))
}

/// Apply submitted field values to an existing list, replacing its
/// membership set
pub async fn update_list(
    State(state): State<ApiState>,
    Path(list_id): Path<i64>,
    Json(payload): Json<TaskListForm>,
) -> Result<Json<ListResponse>, ApiError> {
    let form = payload.validate()?;
    let record = state.db.update_list(list_id, &form).await?;

    tracing::info!("Updated task list: {} ({})", record.name, record.id);
    Ok(Json(list_to_response(&record, form.members)))
}

/// Get list by ID, membership set included
pub async fn get_list(
    State(state): State<ApiState>,
    Path(list_id): Path<i64>,
) -> Result<Json<ListResponse>, ApiError> {
    let record = match state.db.get_list(list_id).await? {
        Some(record) => record,
        None => return Err(ApiError::NotFound("Task list not found")),
    };

    let members = state.db.list_members(list_id).await?;
    Ok(Json(list_to_response(&record, members)))
}

/// Delete list by ID; its tasks go with it
pub async fn delete_list(
    State(state): State<ApiState>,
    Path(list_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_list(list_id).await?;

    tracing::info!("Deleted task list {}", list_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Tasks belonging to one list
pub async fn list_tasks(
    State(state): State<ApiState>,
    Path(list_id): Path<i64>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let records = state.db.tasks_in_list(list_id).await?;
    Ok(Json(records.iter().map(task_to_response).collect()))
}

fn list_to_response(record: &TaskListRecord, members: Vec<i64>) -> ListResponse {
    ListResponse {
        id: record.id,
        name: record.name.clone(),
        members,
        created_at: record.created_at.to_rfc3339(),
    }
}
