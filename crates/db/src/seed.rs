//! Sample board for first-run demos.

use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    board::{Board, BoardWithColumns, CreateBoard},
    column::{Column, CreateColumn},
    task::{CreateTask, Task},
};

struct SampleTask {
    title: &'static str,
    description: &'static str,
    story_points: i64,
}

struct SampleColumn {
    name: &'static str,
    color: &'static str,
    tasks: &'static [SampleTask],
}

const SAMPLE_BOARD_NAME: &str = "My First Board";
const SAMPLE_BOARD_DESCRIPTION: &str =
    "Welcome to Task Tiles - your visual project management tool!";

const SAMPLE_COLUMNS: &[SampleColumn] = &[
    SampleColumn {
        name: "To Do",
        color: "#667eea",
        tasks: &[
            SampleTask {
                title: "Design UI Components",
                description: "Create wireframes and mockups for the main interface",
                story_points: 8,
            },
            SampleTask {
                title: "User Authentication System",
                description: "Implement login and registration functionality",
                story_points: 13,
            },
        ],
    },
    SampleColumn {
        name: "In Progress",
        color: "#f093fb",
        tasks: &[SampleTask {
            title: "Setup Database",
            description: "Configure PostgreSQL and create schema",
            story_points: 5,
        }],
    },
    SampleColumn {
        name: "Done",
        color: "#4ecdc4",
        tasks: &[
            SampleTask {
                title: "Project Planning",
                description: "Define requirements and technical architecture",
                story_points: 3,
            },
            SampleTask {
                title: "Initial Setup",
                description: "Setup development environment and tools",
                story_points: 2,
            },
        ],
    },
];

/// Create the sample board unless any board already exists.
///
/// Returns the new aggregate, or `None` when seeding was skipped.
pub async fn seed_sample_board(pool: &SqlitePool) -> Result<Option<BoardWithColumns>, sqlx::Error> {
    let existing = Board::count(pool).await?;
    if existing > 0 {
        info!(existing, "Boards already present, skipping sample data");
        return Ok(None);
    }

    let board = Board::create(
        pool,
        &CreateBoard::new(SAMPLE_BOARD_NAME, Some(SAMPLE_BOARD_DESCRIPTION.to_string())),
        Uuid::new_v4(),
    )
    .await?;

    for (column_position, sample) in SAMPLE_COLUMNS.iter().enumerate() {
        let column = Column::create(
            pool,
            &CreateColumn {
                board_id: board.id,
                name: sample.name.to_string(),
                color: Some(sample.color.to_string()),
                position: Some(column_position as i64),
            },
            Uuid::new_v4(),
        )
        .await?;

        for (task_position, task) in sample.tasks.iter().enumerate() {
            Task::create(
                pool,
                &CreateTask {
                    column_id: column.id,
                    board_id: board.id,
                    title: task.title.to_string(),
                    description: Some(task.description.to_string()),
                    story_points: Some(task.story_points),
                    position: Some(task_position as i64),
                },
                Uuid::new_v4(),
            )
            .await?;
        }
    }

    info!(board_id = %board.id, "Seeded sample board");
    Board::find_with_columns(pool, board.id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_pool;

    #[tokio::test]
    async fn test_seed_creates_sample_board() {
        let (pool, _temp_dir) = create_test_pool().await;

        let board = seed_sample_board(&pool)
            .await
            .unwrap()
            .expect("seeded board");

        assert_eq!(board.name, SAMPLE_BOARD_NAME);
        let names: Vec<&str> = board.columns.iter().map(|c| c.column.name.as_str()).collect();
        assert_eq!(names, vec!["To Do", "In Progress", "Done"]);

        let todo_titles: Vec<&str> = board.columns[0]
            .tasks
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(
            todo_titles,
            vec!["Design UI Components", "User Authentication System"]
        );
        assert_eq!(board.columns[1].tasks[0].story_points, Some(5));
        assert_eq!(board.columns[2].column.color, "#4ecdc4");
    }

    #[tokio::test]
    async fn test_seed_skips_when_boards_exist() {
        let (pool, _temp_dir) = create_test_pool().await;

        assert!(seed_sample_board(&pool).await.unwrap().is_some());
        assert!(seed_sample_board(&pool).await.unwrap().is_none());
        assert_eq!(Board::count(&pool).await.unwrap(), 1);
    }
}
