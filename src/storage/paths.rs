// Storage path utilities.
// Resolves where persistent display state lives on this machine.

use std::path::PathBuf;

use directories::ProjectDirs;

/// File name of the persisted display text.
pub const DISPLAY_FILE: &str = "display.json";

/// Get the base data directory (~/.local/share/glance on Linux).
pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "glance").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Default path of the persisted display text.
pub fn display_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join(DISPLAY_FILE))
}
