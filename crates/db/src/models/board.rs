use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::{
    column::{Column, ColumnWithTasks},
    double_option,
    task::Task,
};
use crate::validation::{ValidationErrors, Validator};

/// Top-level container for a set of ordered columns.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A board with its columns ordered by position, each holding its tasks
/// ordered by position.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct BoardWithColumns {
    #[serde(flatten)]
    pub board: Board,
    pub columns: Vec<ColumnWithTasks>,
}

impl std::ops::Deref for BoardWithColumns {
    type Target = Board;
    fn deref(&self) -> &Self::Target {
        &self.board
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateBoard {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateBoard {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }

    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        let name = v.required_text("name", "Board name", &self.name);
        v.finish()?;
        Ok(Self {
            name,
            description: Validator::optional_text(self.description),
        })
    }
}

/// Only the supplied fields change; `"description": null` clears it.
#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateBoard {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[ts(type = "string | null")]
    pub description: Option<Option<String>>,
}

impl UpdateBoard {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        let name = self
            .name
            .as_deref()
            .map(|name| v.required_text("name", "Board name", name));
        v.finish()?;
        Ok(Self {
            name,
            description: self.description.map(Validator::optional_text),
        })
    }
}

impl Board {
    /// All boards, newest first.
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"SELECT id, name, description, created_at, updated_at
               FROM boards
               ORDER BY created_at DESC, rowid DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"SELECT id, name, description, created_at, updated_at
               FROM boards
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM boards")
            .fetch_one(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateBoard,
        board_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"INSERT INTO boards (id, name, description)
               VALUES ($1, $2, $3)
               RETURNING id, name, description, created_at, updated_at"#,
        )
        .bind(board_id)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateBoard,
    ) -> Result<Self, sqlx::Error> {
        let existing = Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let name = data.name.as_ref().unwrap_or(&existing.name);
        let description = match &data.description {
            Some(description) => description.as_ref(),
            None => existing.description.as_ref(),
        };

        sqlx::query_as::<_, Board>(
            r#"UPDATE boards
               SET name = $2, description = $3, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING id, name, description, created_at, updated_at"#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_one(pool)
        .await
    }

    /// Delete a board; columns and tasks go with it through `ON DELETE CASCADE`.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Full board snapshot: columns by position, each with its tasks by position.
    ///
    /// The three reads share one read transaction so they observe the same
    /// database state. Tasks whose column is not on this board are left out.
    pub async fn find_with_columns(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<Option<BoardWithColumns>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(board) = sqlx::query_as::<_, Board>(
            r#"SELECT id, name, description, created_at, updated_at
               FROM boards
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        let columns = Column::find_by_board_id(&mut *tx, id).await?;
        let tasks = Task::find_by_board_id(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(Some(BoardWithColumns {
            board,
            columns: group_tasks_by_column(columns, tasks),
        }))
    }
}

/// Attach each task to its column, keeping the incoming order of both lists.
fn group_tasks_by_column(columns: Vec<Column>, tasks: Vec<Task>) -> Vec<ColumnWithTasks> {
    let mut by_column: HashMap<Uuid, Vec<Task>> = HashMap::new();
    for task in tasks {
        by_column.entry(task.column_id).or_default().push(task);
    }

    columns
        .into_iter()
        .map(|column| {
            let tasks = by_column.remove(&column.id).unwrap_or_default();
            ColumnWithTasks { column, tasks }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(board_id: Uuid, name: &str, position: i64) -> Column {
        Column {
            id: Uuid::new_v4(),
            board_id,
            name: name.to_string(),
            color: "#667eea".to_string(),
            position,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn task(column: &Column, title: &str, position: i64) -> Task {
        Task {
            id: Uuid::new_v4(),
            column_id: column.id,
            board_id: column.board_id,
            title: title.to_string(),
            description: None,
            story_points: None,
            position,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_group_tasks_by_column() {
        let board_id = Uuid::new_v4();
        let todo = column(board_id, "To Do", 0);
        let done = column(board_id, "Done", 1);
        let stray_column = column(board_id, "Deleted", 2);

        let tasks = vec![
            task(&todo, "first", 0),
            task(&stray_column, "orphan", 0),
            task(&todo, "second", 1),
        ];

        let grouped = group_tasks_by_column(vec![todo, done], tasks);

        assert_eq!(grouped.len(), 2);
        let titles: Vec<&str> = grouped[0].tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second"]);
        assert!(grouped[1].tasks.is_empty());
    }

    #[test]
    fn test_create_board_validate() {
        let board = CreateBoard::new("  Sprint 1  ", Some("   ".to_string()))
            .validate()
            .unwrap();
        assert_eq!(board.name, "Sprint 1");
        assert_eq!(board.description, None);

        let err = CreateBoard::new("", None).validate().unwrap_err();
        assert!(err.has_field("name"));
    }

    #[test]
    fn test_update_board_distinguishes_null_from_absent() {
        let absent: UpdateBoard = serde_json::from_str(r#"{"name": "Renamed"}"#).unwrap();
        assert_eq!(absent.description, None);
        assert!(!absent.is_empty());

        let cleared: UpdateBoard = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));
        assert!(!cleared.is_empty());

        let empty: UpdateBoard = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_board_with_columns_serializes_flat() {
        let board = Board {
            id: Uuid::new_v4(),
            name: "Sprint 1".to_string(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let aggregate = BoardWithColumns {
            board,
            columns: vec![],
        };
        let json = serde_json::to_value(&aggregate).unwrap();
        assert_eq!(json["name"], "Sprint 1");
        assert!(json["columns"].as_array().unwrap().is_empty());
        assert!(json.get("board").is_none());
    }
}
