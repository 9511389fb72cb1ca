use directories::ProjectDirs;

const PROJECT_ROOT: &str = env!("CARGO_MANIFEST_DIR");

/// Directory holding the database and log files.
///
/// Debug builds keep everything under `dev_assets/` at the workspace root;
/// release builds use the platform data directory.
pub fn asset_dir() -> std::path::PathBuf {
    let path = if cfg!(debug_assertions) {
        std::path::PathBuf::from(PROJECT_ROOT).join("../../dev_assets")
    } else {
        ProjectDirs::from("dev", "tiles", "task-tiles")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| std::path::PathBuf::from(".task-tiles"))
    };

    if !path.exists()
        && let Err(e) = std::fs::create_dir_all(&path)
    {
        tracing::warn!(path = %path.display(), error = %e, "Failed to create asset directory");
    }

    path
}

/// Get the database file path.
///
/// Respects the `TILES_DATABASE_PATH` environment variable for custom locations.
/// Supports tilde expansion (e.g., `~/tiles/db.sqlite`).
///
/// Default: `{asset_dir}/db.sqlite`
pub fn database_path() -> std::path::PathBuf {
    if let Ok(path) = std::env::var("TILES_DATABASE_PATH") {
        return crate::path::expand_tilde(&path);
    }
    asset_dir().join("db.sqlite")
}

/// Default directory for rotated log files.
pub fn log_dir() -> std::path::PathBuf {
    asset_dir().join("logs")
}
