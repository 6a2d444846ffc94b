//! User-level operations shared by the command line and the terminal UI.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::clipboard::ClipboardSink;
use crate::compose::{Separator, compose, contributing, summary};
use crate::library::Library;
use crate::prompt::Prompt;
use crate::storage::Store;

/// Result of a copy request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Nothing but whitespace to copy; the clipboard was not touched.
    Empty,
    Copied(String),
    ClipboardFailed,
}

impl CopyOutcome {
    /// One-line message for the user.
    pub fn message(&self) -> String {
        match self {
            CopyOutcome::Empty => "Nothing to copy - add prefixes, body, or suffixes first.".to_string(),
            CopyOutcome::Copied(what) => format!("Copied: {}", what),
            CopyOutcome::ClipboardFailed => "Clipboard write failed.".to_string(),
        }
    }
}

/// Composes the selection, copies it, and counts a use for every selected
/// prefix and suffix that contributed text once the copy succeeded.
pub fn compose_and_copy(
    library: &mut Library,
    prefixes: &[Prompt],
    body: &str,
    suffixes: &[Prompt],
    separator: &Separator,
    clipboard: &mut dyn ClipboardSink,
) -> CopyOutcome {
    let composed = compose(prefixes, body, suffixes, separator);
    if composed.trim().is_empty() {
        return CopyOutcome::Empty;
    }
    if !clipboard.copy(&composed) {
        return CopyOutcome::ClipboardFailed;
    }

    let used_prefixes: Vec<&Prompt> = contributing(prefixes).collect();
    let used_suffixes: Vec<&Prompt> = contributing(suffixes).collect();
    for prompt in used_prefixes.iter().chain(&used_suffixes) {
        library.increment_usage(&prompt.id);
    }
    let what = summary(used_prefixes.len(), !body.trim().is_empty(), used_suffixes.len());
    info!(
        prefixes = used_prefixes.len(),
        suffixes = used_suffixes.len(),
        chars = composed.chars().count(),
        "composition_copied"
    );
    CopyOutcome::Copied(what)
}

/// Copies one prompt's content and counts a use on success.
pub fn copy_prompt(library: &mut Library, id: &str, clipboard: &mut dyn ClipboardSink) -> CopyOutcome {
    let Some(prompt) = library.get(id).cloned() else {
        return CopyOutcome::Empty;
    };
    if prompt.content.trim().is_empty() {
        return CopyOutcome::Empty;
    }
    if !clipboard.copy(&prompt.content) {
        return CopyOutcome::ClipboardFailed;
    }
    library.increment_usage(id);
    CopyOutcome::Copied(prompt.name)
}

/// Copies the free-text body as-is. Usage counts are not touched.
pub fn copy_body(body: &str, clipboard: &mut dyn ClipboardSink) -> CopyOutcome {
    if body.trim().is_empty() {
        return CopyOutcome::Empty;
    }
    if clipboard.copy(body) {
        CopyOutcome::Copied("body".to_string())
    } else {
        CopyOutcome::ClipboardFailed
    }
}

/// Writes the whole library to `path` in the transportable format.
pub fn export_to_file(library: &Library, path: &Path) -> Result<usize> {
    let text = Store::export_text(library.state())?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    let count = library.state().prompts.len();
    info!(path = ?path, prompts = count, "library_exported");
    Ok(count)
}

/// Reads an exported library from `path` and replaces or merges it in.
/// Returns how many prompts were added.
pub fn import_from_file(library: &mut Library, path: &Path, merge: bool) -> Result<usize> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let state = Store::import_text(&raw)?;
    Ok(library.import_state(state, merge))
}

/// Finds a prompt by exact id, then by case-insensitive name.
pub fn find_prompt<'a>(prompts: &'a [Prompt], needle: &str) -> Option<&'a Prompt> {
    prompts.iter().find(|p| p.id == needle).or_else(|| {
        let needle = needle.trim().to_lowercase();
        prompts.iter().find(|p| p.name.to_lowercase() == needle)
    })
}
