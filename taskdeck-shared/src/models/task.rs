/// Task model and database operations
///
/// The task is the API's single resource. Every task belongs to exactly one
/// user, and every operation here filters by the owner's id, so a task is
/// never visible or mutable through another user's credentials. An absent
/// task and a foreign task are indistinguishable on purpose.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     name TEXT NOT NULL,
///     priority INTEGER,
///     is_completed BOOLEAN NOT NULL DEFAULT FALSE,
///     user_id BIGINT NOT NULL REFERENCES users(id)
///         ON DELETE CASCADE ON UPDATE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::task_patch::{BindValue, TaskPatch, UpdatePlan};

/// Task model representing one row of the `tasks` table
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task id
    pub id: i64,

    /// Human-readable task name (non-empty)
    pub name: String,

    /// Optional priority
    pub priority: Option<i32>,

    /// Completion flag
    pub is_completed: bool,

    /// Owning user
    pub user_id: i64,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    /// Task name (required, non-empty; validated upstream)
    pub name: String,

    /// Optional priority
    #[serde(default)]
    pub priority: Option<i32>,

    /// Completion flag, defaults to false
    #[serde(default)]
    pub is_completed: bool,
}

impl Task {
    /// Creates a task owned by `user_id`
    pub async fn create(
        pool: &PgPool,
        user_id: i64,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (name, priority, is_completed, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, priority, is_completed, user_id, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.priority)
        .bind(data.is_completed)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by id, scoped to its owner
    ///
    /// Returns `None` both when the id does not exist and when it belongs
    /// to a different user.
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, name, priority, is_completed, user_id, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists all tasks owned by a user
    pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, name, priority, is_completed, user_id, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Applies a partial update, scoped to the owner
    ///
    /// Returns the affected row count: 1 when the id/user pair matched, 0
    /// when it matched nothing or when the patch supplied no columns. The
    /// caller reports the count as-is rather than turning 0 into a 404,
    /// an intentional asymmetry with the read path.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        user_id: i64,
        patch: TaskPatch,
    ) -> Result<u64, sqlx::Error> {
        let plan = patch.into_plan();
        if plan.is_empty() {
            return Ok(0);
        }

        let query = update_statement(&plan);
        let mut q = sqlx::query(&query).bind(id).bind(user_id);

        for value in plan.into_values() {
            q = match value {
                BindValue::Text(text) => q.bind(text),
                BindValue::Int(int) => q.bind(int),
                BindValue::Bool(flag) => q.bind(flag),
            };
        }

        let result = q.execute(pool).await?;

        Ok(result.rows_affected())
    }

    /// Deletes a task, scoped to the owner
    ///
    /// Same zero-row semantics as [`Task::update`].
    pub async fn delete(pool: &PgPool, id: i64, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Renders the full UPDATE statement for a non-empty plan
///
/// `$1`/`$2` are reserved for the id/user scope, so the planned columns
/// start at `$3`.
fn update_statement(plan: &UpdatePlan) -> String {
    format!(
        "UPDATE tasks SET {}, updated_at = NOW() WHERE id = $1 AND user_id = $2",
        plan.set_clause(3)
    )
}
