use crate::{
    models::{TaskListRecord, TaskRecord},
    Error, Result,
};
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use todolist_core::{TaskFilter, TaskForm, TaskListForm};

#[derive(Clone)]
pub struct Database {
    pool: Pool<Postgres>,
}

impl Database {
    /// Create new database connection
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Initialize database schema
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS task_lists (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(200) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(200) NOT NULL,
                due_date DATE,
                ended BOOLEAN NOT NULL DEFAULT FALSE,
                task_list_id BIGINT NOT NULL
                    REFERENCES task_lists(id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS task_list_users (
                task_list_id BIGINT NOT NULL
                    REFERENCES task_lists(id) ON DELETE CASCADE,
                user_id BIGINT NOT NULL,
                PRIMARY KEY (task_list_id, user_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Create indexes
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_task_list_id ON tasks(task_list_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_task_list_users_user_id ON task_list_users(user_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ========================================================================
    // Task Operations
    // ========================================================================

    /// Insert a new task from validated form values
    pub async fn create_task(&self, form: &TaskForm) -> Result<TaskRecord> {
        self.ensure_list_exists(form.task_list).await?;

        let record = sqlx::query_as::<_, TaskRecord>(
            r#"
            INSERT INTO tasks (name, due_date, ended, task_list_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&form.name)
        .bind(form.due_date)
        .bind(form.ended)
        .bind(form.task_list)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Apply validated form values to an existing task
    pub async fn update_task(&self, task_id: i64, form: &TaskForm) -> Result<TaskRecord> {
        self.ensure_list_exists(form.task_list).await?;

        let record = sqlx::query_as::<_, TaskRecord>(
            r#"
            UPDATE tasks
            SET name = $1, due_date = $2, ended = $3, task_list_id = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&form.name)
        .bind(form.due_date)
        .bind(form.ended)
        .bind(form.task_list)
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;

        record.ok_or(Error::TaskNotFound(task_id))
    }

    /// Get task by ID
    pub async fn get_task(&self, task_id: i64) -> Result<Option<TaskRecord>> {
        let record = sqlx::query_as::<_, TaskRecord>("SELECT * FROM tasks WHERE id = $1")
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Delete task by ID
    pub async fn delete_task(&self, task_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::TaskNotFound(task_id));
        }

        Ok(())
    }

    /// Search tasks, applying each criterion of the filter only when present.
    ///
    /// A single static query: absent criteria collapse to `$n IS NULL` and
    /// constrain nothing.
    pub async fn search_tasks(&self, filter: &TaskFilter) -> Result<Vec<TaskRecord>> {
        let records = sqlx::query_as::<_, TaskRecord>(
            r#"
            SELECT t.* FROM tasks t
            WHERE ($1::text IS NULL OR t.name LIKE $1)
              AND ($2::date IS NULL OR t.due_date >= $2)
              AND ($3::date IS NULL OR t.due_date <= $3)
              AND ($4::boolean IS NULL OR t.ended = $4)
              AND ($5::bigint IS NULL OR t.task_list_id IN (
                  SELECT task_list_id FROM task_list_users WHERE user_id = $5))
            ORDER BY t.id
            "#,
        )
        .bind(filter.name.as_deref().map(like_pattern))
        .bind(filter.due_from)
        .bind(filter.due_until)
        .bind(filter.ended)
        .bind(filter.member)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Get all tasks belonging to one list
    pub async fn tasks_in_list(&self, list_id: i64) -> Result<Vec<TaskRecord>> {
        self.ensure_list_exists(list_id).await?;

        let records = sqlx::query_as::<_, TaskRecord>(
            "SELECT * FROM tasks WHERE task_list_id = $1 ORDER BY id",
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    // ========================================================================
    // Task List Operations
    // ========================================================================

    /// Insert a new list and its membership rows in one transaction
    pub async fn create_list(&self, form: &TaskListForm) -> Result<TaskListRecord> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, TaskListRecord>(
            "INSERT INTO task_lists (name) VALUES ($1) RETURNING *",
        )
        .bind(&form.name)
        .fetch_one(&mut *tx)
        .await?;

        for user_id in &form.members {
            sqlx::query("INSERT INTO task_list_users (task_list_id, user_id) VALUES ($1, $2)")
                .bind(record.id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(record)
    }

    /// Apply validated form values to an existing list, replacing its
    /// membership set
    pub async fn update_list(&self, list_id: i64, form: &TaskListForm) -> Result<TaskListRecord> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, TaskListRecord>(
            "UPDATE task_lists SET name = $1 WHERE id = $2 RETURNING *",
        )
        .bind(&form.name)
        .bind(list_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(Error::ListNotFound(list_id))?;

        sqlx::query("DELETE FROM task_list_users WHERE task_list_id = $1")
            .bind(list_id)
            .execute(&mut *tx)
            .await?;

        for user_id in &form.members {
            sqlx::query("INSERT INTO task_list_users (task_list_id, user_id) VALUES ($1, $2)")
                .bind(list_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(record)
    }

    /// Get list by ID
    pub async fn get_list(&self, list_id: i64) -> Result<Option<TaskListRecord>> {
        let record = sqlx::query_as::<_, TaskListRecord>("SELECT * FROM task_lists WHERE id = $1")
            .bind(list_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Delete list by ID; its tasks and membership rows go with it
    pub async fn delete_list(&self, list_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM task_lists WHERE id = $1")
            .bind(list_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::ListNotFound(list_id));
        }

        Ok(())
    }

    /// Get the membership set of a list
    pub async fn list_members(&self, list_id: i64) -> Result<Vec<i64>> {
        let members = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM task_list_users WHERE task_list_id = $1 ORDER BY user_id",
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    /// Get all lists a user is a member of
    pub async fn lists_for_user(&self, user_id: i64) -> Result<Vec<TaskListRecord>> {
        let records = sqlx::query_as::<_, TaskListRecord>(
            r#"
            SELECT l.* FROM task_lists l
            JOIN task_list_users u ON l.id = u.task_list_id
            WHERE u.user_id = $1
            ORDER BY l.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn ensure_list_exists(&self, list_id: i64) -> Result<()> {
        let found = sqlx::query("SELECT id FROM task_lists WHERE id = $1")
            .bind(list_id)
            .fetch_optional(&self.pool)
            .await?;

        if found.is_none() {
            return Err(Error::ListNotFound(list_id));
        }

        Ok(())
    }
}

/// Build a `LIKE` pattern matching the needle as a literal substring.
/// `%`, `_` and `\` in the needle are escaped so they lose their
/// metacharacter meaning.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_needle() {
        assert_eq!(like_pattern("milk"), "%milk%");
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("50%_done"), r"%50\%\_done%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }
}
