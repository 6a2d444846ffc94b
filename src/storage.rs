//! JSON file persistence for the prompt library.
//!
//! `load` and `save` never fail from the caller's point of view: a missing or
//! corrupt file loads as an empty library and a failed write is logged. The
//! explicit `import_text` path is the one place parse failures are reported.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{LibraryError, LibraryResult};
use crate::prompt::LibraryState;

/// File name of the library inside the data directory.
pub const LIBRARY_FILE_NAME: &str = "prompts.json";

/// Platform data directory for the library file.
pub fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("dev", "promptdeck", "promptdeck").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Reads and writes a [`LibraryState`] at a fixed path.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Loads the library, substituting an empty one when the file is missing
    /// or unreadable.
    pub fn load(&self) -> LibraryState {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "library_file_missing");
                return LibraryState::empty();
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "library_load_read_failed");
                return LibraryState::empty();
            }
        };

        match decode(&contents) {
            Ok(state) => {
                info!(path = ?self.path, prompts = state.prompts.len(), "library_loaded");
                state
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "library_load_corrupt");
                LibraryState::empty()
            }
        }
    }

    /// Writes the library via a temporary file and an atomic rename.
    ///
    /// Failures are logged and the temporary file removed; the primary file
    /// is either the previous version or the new one, never a partial write.
    pub fn save(&self, state: &LibraryState) {
        match self.try_save(state) {
            Ok(()) => {
                debug!(path = ?self.path, prompts = state.prompts.len(), "library_saved");
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "library_save_failed");
                let tmp = self.temp_path();
                if tmp.exists()
                    && let Err(e) = fs::remove_file(&tmp)
                {
                    warn!(path = ?tmp, error = %e, "library_temp_cleanup_failed");
                }
            }
        }
    }

    fn try_save(&self, state: &LibraryState) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        // Nothing touches disk unless the state serializes.
        let text = state.to_json().map_err(io::Error::other)?;

        let tmp = self.temp_path();
        let mut file = File::create(&tmp)?;
        file.write_all(text.as_bytes())?;
        // Contents must be durable before the rename makes them the primary file.
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &self.path)
    }

    /// Serializes the library into a standalone, importable text blob.
    pub fn export_text(state: &LibraryState) -> LibraryResult<String> {
        state
            .to_json()
            .map_err(|e| LibraryError::Serialize(e.to_string()))
    }

    /// Parses text produced by [`Store::export_text`] (or the library file).
    pub fn import_text(raw: &str) -> LibraryResult<LibraryState> {
        decode(raw)
    }
}

fn decode(raw: &str) -> LibraryResult<LibraryState> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| LibraryError::Parse(e.to_string()))?;
    LibraryState::from_value(&value)
        .ok_or_else(|| LibraryError::Parse("expected a JSON object at the top level".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{Prompt, PromptRole, PromptUpdate, SCHEMA_VERSION};
    use tempfile::TempDir;

    fn sample_state() -> LibraryState {
        let a = Prompt::create("Be concise", "Answer briefly.", PromptRole::Prefix, "style").unwrap();
        let b = Prompt::create("Sign-off", "Thanks!", PromptRole::Suffix, "")
            .unwrap()
            .with_updated_fields(&PromptUpdate::default().favorite(true).usage_count(2));
        LibraryState {
            schema_version: SCHEMA_VERSION,
            prompts: vec![a, b],
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("prompts.json"));
        assert_eq!(store.load(), LibraryState::empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompts.json");
        fs::write(&path, "{ this is not json").unwrap();
        assert_eq!(Store::new(&path).load(), LibraryState::empty());
    }

    #[test]
    fn test_load_wrong_shape_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompts.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert_eq!(Store::new(&path).load(), LibraryState::empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("nested").join("prompts.json"));
        let state = sample_state();

        store.save(&state);
        assert_eq!(store.load(), state);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_save_overwrites_stale_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("prompts.json"));
        // Leftover from an interrupted save, longer than the new contents.
        fs::write(store.temp_path(), "x".repeat(64 * 1024)).unwrap();

        let state = sample_state();
        store.save(&state);

        assert!(!store.temp_path().exists());
        let on_disk = fs::read_to_string(store.path()).unwrap();
        assert_eq!(on_disk, Store::export_text(&state).unwrap());
        assert_eq!(store.load(), state);
    }

    #[test]
    fn test_save_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("prompts.json"));
        store.save(&sample_state());
        store.save(&LibraryState::empty());
        assert!(store.load().prompts.is_empty());
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();
        let store = Store::new(blocker.join("prompts.json"));

        // Parent is a regular file, so the write cannot succeed.
        store.save(&sample_state());
        assert_eq!(store.load(), LibraryState::empty());
    }

    #[test]
    fn test_export_import_round_trip() {
        let state = sample_state();
        let text = Store::export_text(&state).unwrap();
        assert_eq!(Store::import_text(&text).unwrap(), state);
    }

    #[test]
    fn test_export_matches_file_format() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("prompts.json"));
        let state = sample_state();
        store.save(&state);

        let on_disk = fs::read_to_string(store.path()).unwrap();
        assert_eq!(on_disk, Store::export_text(&state).unwrap());
    }

    #[test]
    fn test_import_malformed_text_is_parse_error() {
        assert!(matches!(
            Store::import_text("not json"),
            Err(LibraryError::Parse(_))
        ));
        assert!(matches!(
            Store::import_text("\"just a string\""),
            Err(LibraryError::Parse(_))
        ));
    }
}
