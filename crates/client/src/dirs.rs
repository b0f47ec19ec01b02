//! Platform-specific directories for logs and content.

use std::path::PathBuf;

use directories::ProjectDirs;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "encounter")
}

/// Log directory, e.g. `~/.cache/encounter/logs` on Linux.
pub fn log_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("encounter"))
        .join("logs")
}

/// Content directory used when `--data-dir` is not given.
pub fn content_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("content"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}
