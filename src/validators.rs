//! Field validation for the prompt form and the import/export dialog.
//!
//! Every validator returns an error message when the value is rejected and
//! `None` when it is acceptable.

use std::path::Path;

use crate::config::Config;

/// Longest name accepted by the form.
pub const MAX_NAME_CHARS: usize = 120;

/// Convert an I/O error to an appropriate error message for file validation.
fn file_error_message(error: &std::io::Error) -> String {
    match error.kind() {
        std::io::ErrorKind::NotFound => "File not found".to_string(),
        std::io::ErrorKind::PermissionDenied => "Cannot access file".to_string(),
        _ => "Invalid path".to_string(),
    }
}

/// A prompt name must have visible characters.
pub fn validate_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Some("Name cannot be empty".to_string());
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Some(format!("Name is longer than {} characters", MAX_NAME_CHARS));
    }
    None
}

/// Categories are free text without control characters. Blank is allowed.
pub fn validate_category(category: &str) -> Option<String> {
    if category.trim().chars().any(char::is_control) {
        return Some("Category cannot contain control characters".to_string());
    }
    None
}

/// Validate that a path points to an existing regular file (import source).
pub fn validate_file_exists(path: &str) -> Option<String> {
    if path.trim().is_empty() {
        return Some("Path cannot be empty".to_string());
    }

    let expanded = Config::expand_tilde(path.trim());

    match std::fs::metadata(&expanded) {
        Ok(metadata) => {
            if metadata.is_file() {
                None
            } else {
                Some("Path is not a file".to_string())
            }
        }
        Err(e) => Some(file_error_message(&e)),
    }
}

/// Validate that a path can be written as a new or replaced file (export
/// target): not a directory, and its parent directory exists.
pub fn validate_export_path(path: &str) -> Option<String> {
    if path.trim().is_empty() {
        return Some("Path cannot be empty".to_string());
    }

    let expanded = Config::expand_tilde(path.trim());
    if expanded.is_dir() {
        return Some("Path is a directory".to_string());
    }

    let parent = expanded
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    match std::fs::metadata(parent) {
        Ok(metadata) if metadata.is_dir() => None,
        Ok(_) => Some("Parent is not a directory".to_string()),
        Err(_) => Some("Directory not found".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_name_empty() {
        assert_eq!(validate_name(""), Some("Name cannot be empty".to_string()));
        assert_eq!(validate_name("   "), Some("Name cannot be empty".to_string()));
    }

    #[test]
    fn test_validate_name_ok() {
        assert_eq!(validate_name("Code review"), None);
        assert_eq!(validate_name("  padded  "), None);
    }

    #[test]
    fn test_validate_name_too_long() {
        let long = "x".repeat(MAX_NAME_CHARS + 1);
        assert!(validate_name(&long).is_some());
        assert_eq!(validate_name(&"é".repeat(MAX_NAME_CHARS)), None);
    }

    #[test]
    fn test_validate_category() {
        assert_eq!(validate_category(""), None);
        assert_eq!(validate_category("writing"), None);
        assert!(validate_category("bad\u{7}").is_some());
    }

    #[test]
    fn test_validate_file_exists_empty() {
        assert_eq!(
            validate_file_exists(""),
            Some("Path cannot be empty".to_string())
        );
    }

    #[test]
    fn test_validate_file_exists_not_found() {
        let result = validate_file_exists("/nonexistent/path/to/file.json");
        assert_eq!(result, Some("File not found".to_string()));
    }

    #[test]
    fn test_validate_file_exists_is_directory() {
        let dir = TempDir::new().unwrap();
        let result = validate_file_exists(dir.path().to_str().unwrap());
        assert_eq!(result, Some("Path is not a file".to_string()));
    }

    #[test]
    fn test_validate_file_exists_ok() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("export.json");
        fs::write(&file, "{}").unwrap();
        assert_eq!(validate_file_exists(file.to_str().unwrap()), None);
    }

    #[test]
    fn test_validate_export_path() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.json");
        assert_eq!(validate_export_path(target.to_str().unwrap()), None);

        assert_eq!(
            validate_export_path(dir.path().to_str().unwrap()),
            Some("Path is a directory".to_string())
        );

        let missing_parent = dir.path().join("nope").join("out.json");
        assert_eq!(
            validate_export_path(missing_parent.to_str().unwrap()),
            Some("Directory not found".to_string())
        );

        assert_eq!(
            validate_export_path(" "),
            Some("Path cannot be empty".to_string())
        );
    }

    #[test]
    fn test_validate_export_path_bare_file_name() {
        // Relative name with no directory part resolves against the cwd.
        assert_eq!(validate_export_path("prompts-export.json"), None);
    }

    #[test]
    fn test_file_error_message() {
        let not_found = std::io::Error::new(std::io::ErrorKind::NotFound, "x");
        assert_eq!(file_error_message(&not_found), "File not found");
        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "x");
        assert_eq!(file_error_message(&denied), "Cannot access file");
    }
}
