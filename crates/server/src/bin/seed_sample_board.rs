//! Creates the "My First Board" demo board on an empty database.

use anyhow::Context;
use db::{DBService, seed::seed_sample_board};
use server::file_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _file_log_guard = file_logging::init_logging(&log_level);

    let db = DBService::new().await.context("Failed to open database")?;

    let result = seed_sample_board(&db.pool).await;
    db.shutdown().await;

    match result.context("Failed to seed sample board")? {
        Some(board) => {
            let task_count: usize = board.columns.iter().map(|c| c.tasks.len()).sum();
            println!(
                "Created sample board \"{}\" with {} columns and {} tasks",
                board.name,
                board.columns.len(),
                task_count
            );
        }
        None => println!("Boards already exist, nothing to seed"),
    }

    Ok(())
}
