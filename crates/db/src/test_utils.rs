//! Test pools and fixtures.
//!
//! Migrations run once into a template database; each test gets a copy of
//! that file in its own temp dir.

use std::{str::FromStr, sync::OnceLock, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tempfile::TempDir;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::models::{
    board::{Board, CreateBoard},
    column::{Column, CreateColumn},
    task::{CreateTask, Task},
};

static TEMPLATE_DIR: OnceLock<TempDir> = OnceLock::new();
static TEMPLATE_READY: OnceCell<()> = OnceCell::const_new();

fn get_template_dir() -> &'static TempDir {
    TEMPLATE_DIR.get_or_init(|| TempDir::new().expect("Failed to create template temp dir"))
}

async fn ensure_template_ready() {
    TEMPLATE_READY
        .get_or_init(|| async {
            let template_path = get_template_dir().path().join("template.db");

            // DELETE journal so the template is a single file to copy.
            let options =
                SqliteConnectOptions::from_str(&format!("sqlite://{}", template_path.display()))
                    .expect("Invalid template database URL")
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Delete);

            let pool = SqlitePoolOptions::new()
                .min_connections(0)
                .max_connections(1)
                .connect_with(options)
                .await
                .expect("Failed to create template pool");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run migrations on template");

            pool.close().await;

            tracing::debug!("Template database ready at {:?}", template_path);
        })
        .await;
}

/// Create a migrated test pool with foreign keys enforced.
///
/// The returned `TempDir` must outlive the pool.
pub async fn create_test_pool() -> (SqlitePool, TempDir) {
    ensure_template_ready().await;

    let temp_dir = TempDir::new().expect("Failed to create test temp dir");
    let db_path = temp_dir.path().join("test.db");

    let template_path = get_template_dir().path().join("template.db");
    std::fs::copy(&template_path, &db_path).expect("Failed to copy template database");

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))
        .expect("Invalid test database URL")
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .expect("Failed to create test pool");

    (pool, temp_dir)
}

pub async fn create_test_board(pool: &SqlitePool, name: &str) -> Board {
    Board::create(pool, &CreateBoard::new(name, None), Uuid::new_v4())
        .await
        .expect("Failed to create test board")
}

/// Column appended to the end of `board_id`.
pub async fn create_test_column(pool: &SqlitePool, board_id: Uuid, name: &str) -> Column {
    Column::create(pool, &CreateColumn::new(board_id, name), Uuid::new_v4())
        .await
        .expect("Failed to create test column")
}

/// Task appended to the end of `column`.
pub async fn create_test_task(pool: &SqlitePool, column: &Column, title: &str) -> Task {
    let data = CreateTask::new(column.id, column.board_id, title);
    Task::create(pool, &data, Uuid::new_v4())
        .await
        .expect("Failed to create test task")
}
