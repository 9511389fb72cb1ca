//! Tasks: units of work ordered within a column.
//!
//! A task stores its column's `board_id` as well. Creation checks the pair
//! agrees and [`Task::move_to_column`] re-derives it from the target column.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::{double_option, position::Scope};
use crate::validation::{ValidationErrors, Validator};

const TASK_FIELDS: &str =
    "id, column_id, board_id, title, description, story_points, position, created_at, updated_at";

static INSERT_TASK: LazyLock<String> = LazyLock::new(|| {
    format!(
        "INSERT INTO tasks (id, column_id, board_id, title, description, story_points, position) \
         VALUES ($1, $2, $3, $4, $5, $6, {}) \
         RETURNING {TASK_FIELDS}",
        Scope::ColumnTasks.position_or_next_sql("$7", "$2")
    )
});

// The position subquery runs before the row changes, so moving within the
// same column without a position sends the task to the end.
static MOVE_TASK: LazyLock<String> = LazyLock::new(|| {
    format!(
        "UPDATE tasks \
         SET column_id = $2, \
             board_id = (SELECT board_id FROM columns WHERE id = $2), \
             position = {}, \
             updated_at = datetime('now', 'subsec') \
         WHERE id = $1 \
         RETURNING {TASK_FIELDS}",
        Scope::ColumnTasks.position_or_next_sql("$3", "$2")
    )
});

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Task {
    pub id: Uuid,
    pub column_id: Uuid,
    /// Board of `column_id`, denormalized for the board aggregate read.
    pub board_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub story_points: Option<i64>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateTask {
    pub column_id: Uuid,
    pub board_id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub story_points: Option<i64>,
    /// Appended after the column's last task when omitted.
    #[serde(default)]
    pub position: Option<i64>,
}

impl CreateTask {
    pub fn new(column_id: Uuid, board_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            column_id,
            board_id,
            title: title.into(),
            description: None,
            story_points: None,
            position: None,
        }
    }

    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        let title = v.required_text("title", "Task title", &self.title);
        v.story_points("story_points", self.story_points);
        v.position("position", self.position);
        v.finish()?;
        Ok(Self {
            title,
            description: Validator::optional_text(self.description),
            ..self
        })
    }
}

/// Only the supplied fields change; `null` clears `description` or
/// `story_points`.
#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateTask {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[ts(type = "string | null")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[ts(type = "number | null")]
    pub story_points: Option<Option<i64>>,
}

impl UpdateTask {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.story_points.is_none()
    }

    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        let title = self
            .title
            .as_deref()
            .map(|title| v.required_text("title", "Task title", title));
        v.story_points("story_points", self.story_points.flatten());
        v.finish()?;
        Ok(Self {
            title,
            description: self.description.map(Validator::optional_text),
            story_points: self.story_points,
        })
    }
}

/// Target of a drag-and-drop move.
#[derive(Debug, Clone, Deserialize, TS)]
pub struct MoveTask {
    pub column_id: Uuid,
    /// Appended after the target column's last task when omitted.
    #[serde(default)]
    pub position: Option<i64>,
}

impl MoveTask {
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        v.position("position", self.position);
        v.finish()?;
        Ok(self)
    }
}

impl Task {
    /// Tasks of a board ordered by position, ties in insertion order.
    pub async fn find_by_board_id<'e, E>(executor: E, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Task>(
            r#"SELECT id, column_id, board_id, title, description, story_points, position, created_at, updated_at
               FROM tasks
               WHERE board_id = $1
               ORDER BY position ASC, rowid ASC"#,
        )
        .bind(board_id)
        .fetch_all(executor)
        .await
    }

    pub async fn find_by_column_id(
        pool: &SqlitePool,
        column_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"SELECT id, column_id, board_id, title, description, story_points, position, created_at, updated_at
               FROM tasks
               WHERE column_id = $1
               ORDER BY position ASC, rowid ASC"#,
        )
        .bind(column_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"SELECT id, column_id, board_id, title, description, story_points, position, created_at, updated_at
               FROM tasks
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Insert a task; without an explicit position it goes after the
    /// column's last task.
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateTask,
        task_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(INSERT_TASK.as_str())
            .bind(task_id)
            .bind(data.column_id)
            .bind(data.board_id)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.story_points)
            .bind(data.position)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateTask,
    ) -> Result<Self, sqlx::Error> {
        let existing = Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let title = data.title.as_ref().unwrap_or(&existing.title);
        let description = match &data.description {
            Some(description) => description.as_ref(),
            None => existing.description.as_ref(),
        };
        let story_points = data.story_points.unwrap_or(existing.story_points);

        sqlx::query_as::<_, Task>(
            r#"UPDATE tasks
               SET title = $2, description = $3, story_points = $4, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING id, column_id, board_id, title, description, story_points, position, created_at, updated_at"#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(story_points)
        .fetch_one(pool)
        .await
    }

    /// Reparent and/or reorder a task in a single write.
    ///
    /// `board_id` follows the target column. The caller checks the column
    /// exists; a missing task yields `RowNotFound`.
    pub async fn move_to_column(
        pool: &SqlitePool,
        id: Uuid,
        data: &MoveTask,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(MOVE_TASK.as_str())
            .bind(id)
            .bind(data.column_id)
            .bind(data.position)
            .fetch_optional(pool)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
