use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::{position::Scope, task::Task};
use crate::validation::{ValidationErrors, Validator};

pub const DEFAULT_COLUMN_COLOR: &str = "#667eea";

const COLUMN_FIELDS: &str = "id, board_id, name, color, position, created_at, updated_at";

static INSERT_COLUMN: LazyLock<String> = LazyLock::new(|| {
    format!(
        "INSERT INTO columns (id, board_id, name, color, position) \
         VALUES ($1, $2, $3, $4, {}) \
         RETURNING {COLUMN_FIELDS}",
        Scope::BoardColumns.position_or_next_sql("$5", "$2")
    )
});

/// Named, colored, ordered stage within a board.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Column {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    /// Hex color code (e.g., "#667eea")
    pub color: String,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ColumnWithTasks {
    #[serde(flatten)]
    pub column: Column,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateColumn {
    pub board_id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    /// Appended after the last column when omitted.
    #[serde(default)]
    pub position: Option<i64>,
}

impl CreateColumn {
    pub fn new(board_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            board_id,
            name: name.into(),
            color: None,
            position: None,
        }
    }

    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        let name = v.required_text("name", "Column name", &self.name);
        if let Some(color) = &self.color {
            v.color("color", color);
        }
        v.position("position", self.position);
        v.finish()?;
        Ok(Self { name, ..self })
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateColumn {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
}

impl UpdateColumn {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.position.is_none()
    }

    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        let name = self
            .name
            .as_deref()
            .map(|name| v.required_text("name", "Column name", name));
        if let Some(color) = &self.color {
            v.color("color", color);
        }
        v.position("position", self.position);
        v.finish()?;
        Ok(Self { name, ..self })
    }
}

impl Column {
    /// Columns of a board ordered by position, ties in insertion order.
    pub async fn find_by_board_id<'e, E>(executor: E, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Column>(
            r#"SELECT id, board_id, name, color, position, created_at, updated_at
               FROM columns
               WHERE board_id = $1
               ORDER BY position ASC, rowid ASC"#,
        )
        .bind(board_id)
        .fetch_all(executor)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Column>(
            r#"SELECT id, board_id, name, color, position, created_at, updated_at
               FROM columns
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Insert a column; without an explicit position it goes after the
    /// board's last column.
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateColumn,
        column_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let color = data.color.as_deref().unwrap_or(DEFAULT_COLUMN_COLOR);
        sqlx::query_as::<_, Column>(INSERT_COLUMN.as_str())
            .bind(column_id)
            .bind(data.board_id)
            .bind(&data.name)
            .bind(color)
            .bind(data.position)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateColumn,
    ) -> Result<Self, sqlx::Error> {
        let existing = Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let name = data.name.as_ref().unwrap_or(&existing.name);
        let color = data.color.as_ref().unwrap_or(&existing.color);
        let position = data.position.unwrap_or(existing.position);

        sqlx::query_as::<_, Column>(
            r#"UPDATE columns
               SET name = $2, color = $3, position = $4, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING id, board_id, name, color, position, created_at, updated_at"#,
        )
        .bind(id)
        .bind(name)
        .bind(color)
        .bind(position)
        .fetch_one(pool)
        .await
    }

    /// Delete a column; its tasks go with it through `ON DELETE CASCADE`.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM columns WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_column_validate() {
        let column = CreateColumn::new(Uuid::new_v4(), " Review ").validate().unwrap();
        assert_eq!(column.name, "Review");
        assert_eq!(column.color, None);
        assert_eq!(column.position, None);
    }

    #[test]
    fn test_create_column_rejects_bad_fields() {
        let mut data = CreateColumn::new(Uuid::new_v4(), "");
        data.color = Some("red".to_string());
        data.position = Some(-1);
        let err = data.validate().unwrap_err();
        assert!(err.has_field("name"));
        assert!(err.has_field("color"));
        assert!(err.has_field("position"));
    }

    #[test]
    fn test_update_column_is_empty() {
        assert!(UpdateColumn::default().is_empty());
        let update = UpdateColumn {
            position: Some(3),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_insert_sql_defaults_position_within_board() {
        assert!(INSERT_COLUMN.contains("COALESCE($5, (SELECT COALESCE(MAX(position), -1) + 1 FROM columns WHERE board_id = $2))"));
    }
}
