//! Modal dialog state and input handling.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyModifiers};
use tracing::debug;

use crate::actions::{export_to_file, import_from_file};
use crate::app::App;
use crate::config::Config;
use crate::library::Library;
use crate::prompt::{Prompt, PromptRole, PromptUpdate};
use crate::validators::{
    validate_category, validate_export_path, validate_file_exists, validate_name,
};

/// Single text value with a cursor counted in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    /// Creates an input with the cursor at the end.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Backspace. Returns true if something was removed.
    pub fn delete_char_before(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let at = self.byte_index(self.cursor - 1);
        self.value.remove(at);
        self.cursor -= 1;
        true
    }

    /// Delete key. Returns true if something was removed.
    pub fn delete_char_at(&mut self) -> bool {
        if self.cursor >= self.value.chars().count() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
        true
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    /// Applies a plain editing key. Returns true if the value changed.
    pub fn handle_edit_key(&mut self, key_code: KeyCode) -> bool {
        match key_code {
            KeyCode::Char(c) => {
                self.insert_char(c);
                true
            }
            KeyCode::Backspace => self.delete_char_before(),
            KeyCode::Delete => self.delete_char_at(),
            KeyCode::Left => {
                self.cursor_left();
                false
            }
            KeyCode::Right => {
                self.cursor_right();
                false
            }
            KeyCode::Home => {
                self.cursor_home();
                false
            }
            KeyCode::End => {
                self.cursor_end();
                false
            }
            _ => false,
        }
    }
}

/// Which field is focused in the prompt form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptFormField {
    Name,
    Content,
    Role,
    Category,
    SaveButton,
    CancelButton,
}

impl PromptFormField {
    pub fn next(self) -> Self {
        match self {
            Self::Name => Self::Content,
            Self::Content => Self::Role,
            Self::Role => Self::Category,
            Self::Category => Self::SaveButton,
            Self::SaveButton => Self::CancelButton,
            Self::CancelButton => Self::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Name => Self::CancelButton,
            Self::Content => Self::Name,
            Self::Role => Self::Content,
            Self::Category => Self::Role,
            Self::SaveButton => Self::Category,
            Self::CancelButton => Self::SaveButton,
        }
    }
}

/// Whether the form creates a new prompt or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptFormMode {
    Create,
    Edit { id: String },
}

/// State for the create/edit prompt form.
#[derive(Debug, Clone)]
pub struct PromptFormState {
    pub mode: PromptFormMode,
    pub focus: PromptFormField,
    pub name: TextInput,
    /// Multi-line; Enter inserts a newline while this field is focused.
    pub content: TextInput,
    pub role: PromptRole,
    pub category: TextInput,
    /// Error message to display (e.g., save failed).
    pub error: Option<String>,
    pub validation_errors: HashMap<PromptFormField, String>,
}

impl PromptFormState {
    /// Empty form for a new prompt, preset to `role`.
    pub fn create(role: PromptRole) -> Self {
        Self {
            mode: PromptFormMode::Create,
            focus: PromptFormField::Name,
            name: TextInput::default(),
            content: TextInput::default(),
            role,
            category: TextInput::default(),
            error: None,
            validation_errors: HashMap::new(),
        }
    }

    /// Form prefilled from an existing prompt.
    pub fn edit(prompt: &Prompt) -> Self {
        Self {
            mode: PromptFormMode::Edit {
                id: prompt.id.clone(),
            },
            focus: PromptFormField::Name,
            name: TextInput::new(prompt.name.clone()),
            content: TextInput::new(prompt.content.clone()),
            role: prompt.role,
            category: TextInput::new(prompt.category.clone()),
            error: None,
            validation_errors: HashMap::new(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            PromptFormMode::Create => " New Prompt ",
            PromptFormMode::Edit { .. } => " Edit Prompt ",
        }
    }

    fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            PromptFormField::Name => Some(&mut self.name),
            PromptFormField::Content => Some(&mut self.content),
            PromptFormField::Category => Some(&mut self.category),
            _ => None,
        }
    }

    /// Move focus to the next field, validating the field being left.
    pub fn focus_next(&mut self) {
        let leaving_field = self.focus;
        self.focus = self.focus.next();
        self.validate_field(leaving_field);
    }

    /// Move focus to the previous field, validating the field being left.
    pub fn focus_prev(&mut self) {
        let leaving_field = self.focus;
        self.focus = self.focus.prev();
        self.validate_field(leaving_field);
    }

    /// Routes an editing key to the focused text field.
    pub fn edit_focused(&mut self, key_code: KeyCode) {
        let focus = self.focus;
        let changed = self
            .focused_input()
            .map(|input| input.handle_edit_key(key_code))
            .unwrap_or(false);
        if changed {
            self.validation_errors.remove(&focus);
        }
    }

    pub fn role_next(&mut self) {
        self.role = self.role.next();
    }

    pub fn role_prev(&mut self) {
        self.role = self.role.prev();
    }

    pub fn has_validation_errors(&self) -> bool {
        !self.validation_errors.is_empty()
    }

    /// Validate a specific field and update validation_errors.
    pub fn validate_field(&mut self, field: PromptFormField) {
        let error = match field {
            PromptFormField::Name => validate_name(self.name.value()),
            PromptFormField::Category => validate_category(self.category.value()),
            _ => None,
        };

        if let Some(msg) = error {
            self.validation_errors.insert(field, msg);
        } else {
            self.validation_errors.remove(&field);
        }
    }

    /// Runs every validator. Returns true when the form can be saved.
    pub fn validate_all(&mut self) -> bool {
        self.validate_field(PromptFormField::Name);
        self.validate_field(PromptFormField::Category);
        !self.has_validation_errors()
    }

    pub fn to_update(&self) -> PromptUpdate {
        PromptUpdate::default()
            .name(self.name.value())
            .content(self.content.value())
            .role(self.role)
            .category(self.category.value())
    }

    /// Creates or updates the prompt. Returns the saved prompt or a message
    /// for the form's error line.
    pub fn submit(&mut self, library: &mut Library) -> Result<Prompt, String> {
        if !self.validate_all() {
            return Err("Fix the highlighted fields".to_string());
        }
        match &self.mode {
            PromptFormMode::Create => library
                .create(
                    self.name.value(),
                    self.content.value(),
                    self.role,
                    self.category.value(),
                )
                .map_err(|e| e.to_string()),
            PromptFormMode::Edit { id } => match library.update(id, &self.to_update()) {
                Ok(Some(prompt)) => Ok(prompt),
                Ok(None) => Err("Prompt no longer exists".to_string()),
                Err(e) => Err(e.to_string()),
            },
        }
    }
}

/// Whether the path dialog writes or reads a library file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathModalMode {
    Export,
    Import,
}

/// Which field is focused in the path dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathModalField {
    Path,
    /// Import only.
    Merge,
    ConfirmButton,
    CancelButton,
}

/// State for the export/import dialog.
#[derive(Debug, Clone)]
pub struct PathModalState {
    pub mode: PathModalMode,
    pub focus: PathModalField,
    pub path: TextInput,
    /// Import only: keep existing prompts and add the new ones.
    pub merge: bool,
    pub error: Option<String>,
    pub validation_error: Option<String>,
}

impl PathModalState {
    pub fn new(mode: PathModalMode, default_path: &str) -> Self {
        Self {
            mode,
            focus: PathModalField::Path,
            path: TextInput::new(default_path),
            merge: true,
            error: None,
            validation_error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            PathModalMode::Export => " Export Library ",
            PathModalMode::Import => " Import Library ",
        }
    }

    pub fn focus_next(&mut self) {
        let leaving = self.focus;
        self.focus = match self.focus {
            PathModalField::Path if self.mode == PathModalMode::Import => PathModalField::Merge,
            PathModalField::Path | PathModalField::Merge => PathModalField::ConfirmButton,
            PathModalField::ConfirmButton => PathModalField::CancelButton,
            PathModalField::CancelButton => PathModalField::Path,
        };
        if leaving == PathModalField::Path {
            self.validate();
        }
    }

    pub fn focus_prev(&mut self) {
        let leaving = self.focus;
        self.focus = match self.focus {
            PathModalField::Path => PathModalField::CancelButton,
            PathModalField::Merge => PathModalField::Path,
            PathModalField::ConfirmButton if self.mode == PathModalMode::Import => {
                PathModalField::Merge
            }
            PathModalField::ConfirmButton => PathModalField::Path,
            PathModalField::CancelButton => PathModalField::ConfirmButton,
        };
        if leaving == PathModalField::Path {
            self.validate();
        }
    }

    pub fn toggle_merge(&mut self) {
        self.merge = !self.merge;
    }

    /// Checks the path for the current mode. Returns true when valid.
    pub fn validate(&mut self) -> bool {
        self.validation_error = match self.mode {
            PathModalMode::Export => validate_export_path(self.path.value()),
            PathModalMode::Import => validate_file_exists(self.path.value()),
        };
        self.validation_error.is_none()
    }

    /// Runs the export or import. Returns the status message to show.
    pub fn submit(&mut self, library: &mut Library) -> Result<String, String> {
        if !self.validate() {
            return Err("Fix the path first".to_string());
        }
        let path = Config::expand_tilde(self.path.value().trim());
        match self.mode {
            PathModalMode::Export => export_to_file(library, &path)
                .map(|count| format!("Exported {} prompts", count))
                .map_err(|e| format!("{:#}", e)),
            PathModalMode::Import => import_from_file(library, &path, self.merge)
                .map(|count| {
                    if self.merge {
                        format!("Merged {} new prompts", count)
                    } else {
                        format!("Imported {} prompts", count)
                    }
                })
                .map_err(|e| format!("{:#}", e)),
        }
    }
}

/// A pending delete waiting for y/n.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDeleteState {
    pub id: String,
    pub name: String,
}

/// Handle keyboard input for the prompt form.
pub fn handle_prompt_form_input(app: &mut App, key_code: KeyCode, modifiers: KeyModifiers) {
    let Some(state) = &mut app.prompt_form else {
        return;
    };

    // Clear any previous error when user takes action
    if state.error.is_some() && key_code != KeyCode::Esc {
        state.error = None;
    }

    // Ctrl+S saves from anywhere in the form
    let save_shortcut = key_code == KeyCode::Char('s') && modifiers.contains(KeyModifiers::CONTROL);

    match key_code {
        KeyCode::Tab => {
            if modifiers.contains(KeyModifiers::SHIFT) {
                state.focus_prev();
            } else {
                state.focus_next();
            }
        }
        KeyCode::BackTab => state.focus_prev(),

        KeyCode::Esc => {
            app.prompt_form = None;
        }

        _ if save_shortcut => submit_prompt_form(app),

        KeyCode::Enter => match state.focus {
            PromptFormField::SaveButton => submit_prompt_form(app),
            PromptFormField::CancelButton => app.prompt_form = None,
            PromptFormField::Content => state.edit_focused(KeyCode::Char('\n')),
            _ => state.focus_next(),
        },

        KeyCode::Left | KeyCode::Up if state.focus == PromptFormField::Role => state.role_prev(),
        KeyCode::Right | KeyCode::Down if state.focus == PromptFormField::Role => {
            state.role_next()
        }
        KeyCode::Up | KeyCode::Left
            if matches!(
                state.focus,
                PromptFormField::SaveButton | PromptFormField::CancelButton
            ) =>
        {
            state.focus_prev()
        }
        KeyCode::Down | KeyCode::Right
            if matches!(
                state.focus,
                PromptFormField::SaveButton | PromptFormField::CancelButton
            ) =>
        {
            state.focus_next()
        }

        other => state.edit_focused(other),
    }
}

fn submit_prompt_form(app: &mut App) {
    let Some(state) = &mut app.prompt_form else {
        return;
    };
    match state.submit(&mut app.library) {
        Ok(prompt) => {
            debug!(id = %prompt.id, "prompt_form_saved");
            app.prompt_form = None;
            app.notify(format!("Saved \"{}\"", prompt.name));
        }
        Err(e) => {
            if let Some(state) = app.prompt_form.as_mut() {
                state.error = Some(e);
            }
        }
    }
}

/// Handle keyboard input for the export/import dialog.
pub fn handle_path_modal_input(app: &mut App, key_code: KeyCode, modifiers: KeyModifiers) {
    let Some(state) = &mut app.path_modal else {
        return;
    };

    if state.error.is_some() && key_code != KeyCode::Esc {
        state.error = None;
    }

    match key_code {
        KeyCode::Tab => {
            if modifiers.contains(KeyModifiers::SHIFT) {
                state.focus_prev();
            } else {
                state.focus_next();
            }
        }
        KeyCode::BackTab => state.focus_prev(),
        KeyCode::Esc => app.path_modal = None,

        KeyCode::Enter => match state.focus {
            PathModalField::Path | PathModalField::ConfirmButton => submit_path_modal(app),
            PathModalField::Merge => state.toggle_merge(),
            PathModalField::CancelButton => app.path_modal = None,
        },

        KeyCode::Char(' ') if state.focus == PathModalField::Merge => state.toggle_merge(),
        KeyCode::Left | KeyCode::Right if state.focus == PathModalField::Merge => {
            state.toggle_merge()
        }

        other if state.focus == PathModalField::Path => {
            if state.path.handle_edit_key(other) {
                state.validation_error = None;
            }
        }
        _ => {}
    }
}

fn submit_path_modal(app: &mut App) {
    let Some(state) = &mut app.path_modal else {
        return;
    };
    match state.submit(&mut app.library) {
        Ok(message) => {
            app.path_modal = None;
            app.notify(message);
        }
        Err(e) => {
            if let Some(state) = app.path_modal.as_mut() {
                state.error = Some(e);
            }
        }
    }
}

/// Handle keyboard input for the delete confirmation.
pub fn handle_confirm_delete_input(app: &mut App, key_code: KeyCode) {
    let Some(pending) = app.confirm_delete.clone() else {
        return;
    };

    match key_code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            app.confirm_delete = None;
            if app.library.delete(&pending.id) {
                app.notify(format!("Deleted \"{}\"", pending.name));
            } else {
                app.notify_error("Prompt no longer exists");
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.confirm_delete = None;
        }
        _ => {}
    }
}
