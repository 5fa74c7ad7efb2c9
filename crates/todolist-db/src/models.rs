use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskRecord {
    pub id: i64,
    pub name: String,
    pub due_date: Option<NaiveDate>,
    pub ended: bool,
    pub task_list_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskListRecord {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
