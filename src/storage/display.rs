// Persistence of the user-set display text.
// Stores a single string as JSON, written atomically via a temp file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// On-disk representation of the display text.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredText {
    text: String,
    saved_at: DateTime<Utc>,
}

/// File-backed store for the display text.
#[derive(Debug, Clone)]
pub struct DisplayStore {
    path: PathBuf,
}

impl DisplayStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored text. Missing or unreadable files yield an empty string.
    pub fn load(&self) -> String {
        match read_text(&self.path) {
            Ok(Some(text)) => text,
            Ok(None) => String::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding unreadable display text");
                String::new()
            }
        }
    }

    /// Persist the text. Failures are logged and otherwise ignored.
    pub fn save(&self, text: &str) {
        if let Err(e) = write_text(&self.path, text) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to persist display text");
        }
    }
}

/// Read the stored text, `None` if the file does not exist.
fn read_text(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let stored: StoredText = serde_json::from_str(&contents)?;
    Ok(Some(stored.text))
}

/// Write the text as JSON, atomically via temp file.
fn write_text(path: &Path, text: &str) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let stored = StoredText {
        text: text.to_string(),
        saved_at: Utc::now(),
    };
    let json = serde_json::to_string_pretty(&stored)?;

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}
