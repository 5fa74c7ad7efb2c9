use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use todolist_core::{FormErrors, TaskFilter, TaskForm};
use todolist_db::{Error as DbError, TaskRecord};

use super::{requester, ApiError};
use crate::state::ApiState;

/// Query-string criteria of the task search. All optional; absent fields
/// leave the listing unconstrained.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub ended: Option<bool>,
    /// Restrict to lists the requesting user is a member of.
    pub mine: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: i64,
    pub name: String,
    pub due_date: Option<NaiveDate>,
    pub ended: bool,
    pub task_list: i64,
    pub created_at: String,
}

/// List tasks, narrowed by whatever search criteria are present
pub async fn search_tasks(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let filter = build_filter(params, requester(&headers))?;

    if filter.is_unconstrained() {
        tracing::debug!("listing all tasks");
    } else {
        tracing::debug!(?filter, "searching tasks");
    }

    let records = state.db.search_tasks(&filter).await?;
    Ok(Json(records.iter().map(task_to_response).collect()))
}

/// Create a task from submitted field values
pub async fn create_task(
    State(state): State<ApiState>,
    Json(payload): Json<TaskForm>,
) -> Result<Json<TaskResponse>, ApiError> {
    let form = payload.validate()?;

    let record = match state.db.create_task(&form).await {
        Ok(record) => record,
        Err(DbError::ListNotFound(id)) => {
            return Err(ApiError::Invalid(FormErrors::field(
                "task_list",
                format!("task list {} does not exist", id),
            )))
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Created task: {} ({})", record.name, record.id);
    Ok(Json(task_to_response(&record)))
}

/// Apply submitted field values to an existing task
pub async fn update_task(
    State(state): State<ApiState>,
    Path(task_id): Path<i64>,
    Json(payload): Json<TaskForm>,
) -> Result<Json<TaskResponse>, ApiError> {
    let form = payload.validate()?;

    let record = match state.db.update_task(task_id, &form).await {
        Ok(record) => record,
        Err(DbError::ListNotFound(id)) => {
            return Err(ApiError::Invalid(FormErrors::field(
                "task_list",
                format!("task list {} does not exist", id),
            )))
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Updated task: {} ({})", record.name, record.id);
    Ok(Json(task_to_response(&record)))
}

/// Get task by ID
pub async fn get_task(
    State(state): State<ApiState>,
    Path(task_id): Path<i64>,
) -> Result<Json<TaskResponse>, ApiError> {
    match state.db.get_task(task_id).await? {
        Some(record) => Ok(Json(task_to_response(&record))),
        None => Err(ApiError::NotFound("Task not found")),
    }
}

/// Delete task by ID
pub async fn delete_task(
    State(state): State<ApiState>,
    Path(task_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_task(task_id).await?;

    tracing::info!("Deleted task {}", task_id);
    Ok(StatusCode::NO_CONTENT)
}

fn build_filter(params: SearchParams, user: Option<i64>) -> Result<TaskFilter, ApiError> {
    // `mine` only means something for an identified requester
    let member = match params.mine {
        Some(true) => Some(user.ok_or(ApiError::Unauthorized)?),
        _ => None,
    };

    Ok(TaskFilter {
        name: params.name.filter(|n| !n.trim().is_empty()),
        due_from: params.start_date,
        due_until: params.end_date,
        ended: params.ended,
        member,
    })
}

pub fn task_to_response(record: &TaskRecord) -> TaskResponse {
    TaskResponse {
        id: record.id,
        name: record.name.clone(),
        due_date: record.due_date,
        ended: record.ended,
        task_list: record.task_list_id,
        created_at: record.created_at.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_maps_all_criteria() {
        let params = SearchParams {
            name: Some("milk".to_string()),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 31),
            ended: Some(false),
            mine: Some(true),
        };

        let filter = build_filter(params, Some(7)).unwrap();
        assert_eq!(filter.name.as_deref(), Some("milk"));
        assert_eq!(filter.due_from, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(filter.due_until, NaiveDate::from_ymd_opt(2026, 1, 31));
        assert_eq!(filter.ended, Some(false));
        assert_eq!(filter.member, Some(7));
    }

    #[test]
    fn test_mine_requires_requester() {
        let params = SearchParams {
            mine: Some(true),
            ..SearchParams::default()
        };
        assert!(matches!(
            build_filter(params, None),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_mine_absent_or_false_ignores_requester() {
        let filter = build_filter(SearchParams::default(), Some(7)).unwrap();
        assert_eq!(filter.member, None);

        let params = SearchParams {
            mine: Some(false),
            ..SearchParams::default()
        };
        let filter = build_filter(params, Some(7)).unwrap();
        assert_eq!(filter.member, None);
    }

    #[test]
    fn test_blank_name_param_is_skipped() {
        let params = SearchParams {
            name: Some("   ".to_string()),
            ..SearchParams::default()
        };
        let filter = build_filter(params, None).unwrap();
        assert!(filter.is_unconstrained());
    }
}
