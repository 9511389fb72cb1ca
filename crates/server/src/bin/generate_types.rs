//! Writes the API's TypeScript declarations to `shared/types.ts`.
//!
//! `--check` compares instead of writing and exits non-zero when the file
//! is stale.

use std::{env, fs, path::Path, process::ExitCode};

use ts_rs::TS;

const HEADER: &str = "// This file was generated by `generate_types`. Do not edit manually.\n\n";

fn generate_types_content() -> String {
    let decls = [
        db::models::board::Board::decl(),
        db::models::board::BoardWithColumns::decl(),
        db::models::board::CreateBoard::decl(),
        db::models::board::UpdateBoard::decl(),
        db::models::column::Column::decl(),
        db::models::column::ColumnWithTasks::decl(),
        db::models::column::CreateColumn::decl(),
        db::models::column::UpdateColumn::decl(),
        db::models::task::Task::decl(),
        db::models::task::CreateTask::decl(),
        db::models::task::UpdateTask::decl(),
        db::models::task::MoveTask::decl(),
        db::FieldError::decl(),
        services::services::assist::GenerateKind::decl(),
        services::services::assist::GenerateRequest::decl(),
        services::services::assist::Priority::decl(),
        services::services::assist::BoardSuggestion::decl(),
        services::services::assist::TaskSuggestion::decl(),
        services::services::assist::Suggestion::decl(),
        services::services::assist::SuggestionSource::decl(),
        services::services::assist::GenerateResponse::decl(),
    ];

    let body = decls
        .into_iter()
        .map(|decl| {
            let decl = decl.trim();
            if decl.starts_with("export") {
                decl.to_string()
            } else {
                format!("export {decl}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{HEADER}{body}\n")
}

fn main() -> ExitCode {
    let check = env::args().any(|arg| arg == "--check");

    let shared_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../shared");
    let types_path = shared_path.join("types.ts");
    let generated = generate_types_content();

    if check {
        return match fs::read_to_string(&types_path) {
            Ok(current) if current == generated => {
                println!("✅ shared/types.ts is up to date.");
                ExitCode::SUCCESS
            }
            Ok(_) => {
                eprintln!("❌ shared/types.ts is out of date. Run `cargo run --bin generate_types`.");
                ExitCode::FAILURE
            }
            Err(e) => {
                eprintln!("❌ Failed to read {}: {e}", types_path.display());
                ExitCode::FAILURE
            }
        };
    }

    if let Err(e) = fs::create_dir_all(&shared_path) {
        eprintln!("Failed to create {}: {e}", shared_path.display());
        return ExitCode::FAILURE;
    }
    if let Err(e) = fs::write(&types_path, generated) {
        eprintln!("Failed to write {}: {e}", types_path.display());
        return ExitCode::FAILURE;
    }

    println!("Wrote {}", types_path.display());
    ExitCode::SUCCESS
}
