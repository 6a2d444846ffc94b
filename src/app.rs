//! Application state and core logic for the interactive view.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tracing::{debug, warn};

use crate::actions::{self, CopyOutcome};
use crate::clipboard::ClipboardSink;
use crate::compose::{self, Separator, SeparatorKind};
use crate::config::{Config, save_config};
use crate::library::{Library, LibraryStats, ranked};
use crate::modals::{ConfirmDeleteState, PathModalMode, PathModalState, PromptFormState, TextInput};
use crate::prompt::{LibraryState, Prompt, PromptRole};
use crate::selection::{DragState, RowSpan, SelectionList};

/// How long a status message stays in the footer.
const TOAST_DURATION: Duration = Duration::from_secs(4);

/// Width of the drag handle column inside a list pane, in cells.
pub const HANDLE_WIDTH: u16 = 2;

/// Panes that can hold keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pane {
    #[default]
    Library,
    Prefixes,
    Body,
    Suffixes,
}

impl Pane {
    pub fn next(self) -> Self {
        match self {
            Self::Library => Self::Prefixes,
            Self::Prefixes => Self::Body,
            Self::Body => Self::Suffixes,
            Self::Suffixes => Self::Library,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Library => Self::Suffixes,
            Self::Prefixes => Self::Library,
            Self::Body => Self::Prefixes,
            Self::Suffixes => Self::Body,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Library => "Library",
            Self::Prefixes => "Prefixes",
            Self::Body => "Body",
            Self::Suffixes => "Suffixes",
        }
    }

    /// Role of the prompts listed in this pane, if it lists one role.
    pub fn role(&self) -> Option<PromptRole> {
        match self {
            Self::Prefixes => Some(PromptRole::Prefix),
            Self::Suffixes => Some(PromptRole::Suffix),
            Self::Library | Self::Body => None,
        }
    }
}

/// Transient footer message.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub is_error: bool,
    pub shown_at: Instant,
}

/// Where a list pane's rows landed on screen during the last draw.
#[derive(Debug, Clone, Default)]
pub struct PaneRows {
    pub area: Rect,
    pub rows: Vec<RowSpan>,
}

impl PaneRows {
    fn row_at(&self, y: u16) -> Option<usize> {
        self.rows
            .iter()
            .find(|r| y >= r.top && y < r.top + r.height)
            .map(|r| r.index)
    }

    fn on_handle(&self, x: u16) -> bool {
        // One cell of border, then the handle.
        x > self.area.x && x <= self.area.x + HANDLE_WIDTH
    }
}

fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
}

/// Main application state.
pub struct App {
    pub library: Library,
    pub clipboard: Box<dyn ClipboardSink>,
    /// Loaded configuration.
    pub config: Config,
    /// Path to the configuration file.
    pub config_path: PathBuf,
    pub session_id: Option<String>,
    /// Directory where logs are written.
    pub log_directory: Option<PathBuf>,
    /// Change notifications from the library subscriber.
    updates: Receiver<LibraryState>,
    pub focus: Pane,
    pub prefixes: SelectionList<Prompt>,
    pub suffixes: SelectionList<Prompt>,
    pub library_cursor: usize,
    pub prefix_cursor: usize,
    pub suffix_cursor: usize,
    pub body: TextInput,
    pub editing_body: bool,
    pub search: TextInput,
    pub editing_search: bool,
    pub category_filter: Option<String>,
    pub separator: SeparatorKind,
    pub toast: Option<Toast>,
    pub drag: DragState,
    /// Pane the active drag started in.
    pub drag_pane: Option<Pane>,
    /// Row geometry recorded by the last draw, for mouse hit testing.
    pub pane_rows: HashMap<Pane, PaneRows>,
    pub prompt_form: Option<PromptFormState>,
    pub path_modal: Option<PathModalState>,
    pub confirm_delete: Option<ConfirmDeleteState>,
    pub show_help: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        mut library: Library,
        clipboard: Box<dyn ClipboardSink>,
        config: Config,
        config_path: PathBuf,
        session_id: Option<String>,
        log_directory: Option<PathBuf>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        library.subscribe(move |state: &LibraryState| {
            // The receiver only goes away when the app does.
            let _ = tx.send(state.clone());
        });

        let separator = config.compose.separator;
        let mut app = Self {
            library,
            clipboard,
            config,
            config_path,
            session_id,
            log_directory,
            updates: rx,
            focus: Pane::Library,
            prefixes: SelectionList::new(),
            suffixes: SelectionList::new(),
            library_cursor: 0,
            prefix_cursor: 0,
            suffix_cursor: 0,
            body: TextInput::default(),
            editing_body: false,
            search: TextInput::default(),
            editing_search: false,
            category_filter: None,
            separator,
            toast: None,
            drag: DragState::Idle,
            drag_pane: None,
            pane_rows: HashMap::new(),
            prompt_form: None,
            path_modal: None,
            confirm_delete: None,
            show_help: false,
            should_quit: false,
        };
        let initial = app.library.state().clone();
        app.refresh_lists(&initial);
        app
    }

    /// Drains pending library notifications and refreshes the role lists
    /// from the newest state.
    pub fn poll_updates(&mut self) {
        let mut latest = None;
        while let Ok(state) = self.updates.try_recv() {
            latest = Some(state);
        }
        if let Some(state) = latest {
            self.refresh_lists(&state);
        }
    }

    fn refresh_lists(&mut self, state: &LibraryState) {
        let of_role = |role: PromptRole| -> Vec<Prompt> {
            state
                .prompts
                .iter()
                .filter(|p| p.role == role)
                .cloned()
                .collect()
        };
        self.prefixes.set_items(of_role(PromptRole::Prefix));
        self.suffixes.set_items(of_role(PromptRole::Suffix));

        if let Some(category) = &self.category_filter
            && !state.prompts.iter().any(|p| &p.category == category)
        {
            self.category_filter = None;
        }
        self.clamp_cursors();
    }

    fn clamp_cursors(&mut self) {
        let library_len = self.visible_library().len();
        self.library_cursor = self.library_cursor.min(library_len.saturating_sub(1));
        self.prefix_cursor = self.prefix_cursor.min(self.prefixes.len().saturating_sub(1));
        self.suffix_cursor = self.suffix_cursor.min(self.suffixes.len().saturating_sub(1));
    }

    // Views

    /// Library pane contents: search, then category filter, then ranking.
    pub fn visible_library(&self) -> Vec<Prompt> {
        let mut found = self.library.search(self.search.value());
        if let Some(category) = &self.category_filter {
            found.retain(|p| &p.category == category);
        }
        ranked(&found)
    }

    pub fn stats(&self) -> LibraryStats {
        self.library.stats()
    }

    pub fn current_separator(&self) -> Separator {
        self.separator.with_custom(&self.config.compose.custom_separator)
    }

    pub fn preview(&self) -> String {
        compose::preview(
            &self.prefixes.checked_in_order(),
            self.body.value(),
            &self.suffixes.checked_in_order(),
            &self.current_separator(),
            self.config.compose.preview_chars,
        )
    }

    pub fn selection_summary(&self) -> String {
        compose::summary(
            compose::contributing(&self.prefixes.checked_in_order()).count(),
            !self.body.is_blank(),
            compose::contributing(&self.suffixes.checked_in_order()).count(),
        )
    }

    fn list_mut(&mut self, pane: Pane) -> Option<(&mut SelectionList<Prompt>, &mut usize)> {
        match pane {
            Pane::Prefixes => Some((&mut self.prefixes, &mut self.prefix_cursor)),
            Pane::Suffixes => Some((&mut self.suffixes, &mut self.suffix_cursor)),
            Pane::Library | Pane::Body => None,
        }
    }

    /// The prompt under the cursor in the focused pane.
    pub fn selected_prompt(&self) -> Option<Prompt> {
        match self.focus {
            Pane::Library => self.visible_library().get(self.library_cursor).cloned(),
            Pane::Prefixes => self.prefixes.items().get(self.prefix_cursor).cloned(),
            Pane::Suffixes => self.suffixes.items().get(self.suffix_cursor).cloned(),
            Pane::Body => None,
        }
    }

    // Navigation

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn cursor_up(&mut self) {
        match self.focus {
            Pane::Library => self.library_cursor = self.library_cursor.saturating_sub(1),
            Pane::Prefixes => self.prefix_cursor = self.prefix_cursor.saturating_sub(1),
            Pane::Suffixes => self.suffix_cursor = self.suffix_cursor.saturating_sub(1),
            Pane::Body => {}
        }
    }

    pub fn cursor_down(&mut self) {
        match self.focus {
            Pane::Library => {
                if self.library_cursor + 1 < self.visible_library().len() {
                    self.library_cursor += 1;
                }
            }
            Pane::Prefixes => {
                if self.prefix_cursor + 1 < self.prefixes.len() {
                    self.prefix_cursor += 1;
                }
            }
            Pane::Suffixes => {
                if self.suffix_cursor + 1 < self.suffixes.len() {
                    self.suffix_cursor += 1;
                }
            }
            Pane::Body => {}
        }
    }

    // Selection

    /// Checks or unchecks the prompt under the cursor.
    pub fn toggle_checked(&mut self) {
        let focus = self.focus;
        if let Some((list, cursor)) = self.list_mut(focus) {
            let index = *cursor;
            list.toggle(index);
        }
    }

    /// Moves the prompt under the cursor by `delta` rows; the cursor follows.
    pub fn move_selected(&mut self, delta: isize) {
        let focus = self.focus;
        if let Some((list, cursor)) = self.list_mut(focus) {
            let from = *cursor;
            let Some(to) = from.checked_add_signed(delta) else {
                return;
            };
            if list.reorder(from, to) {
                *cursor = to;
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.prefixes.clear_all();
        self.suffixes.clear_all();
        self.body.clear();
        self.notify("Selection cleared");
    }

    // Library actions

    pub fn toggle_favorite_selected(&mut self) {
        let Some(prompt) = self.selected_prompt() else {
            return;
        };
        if let Some(updated) = self.library.toggle_favorite(&prompt.id) {
            let verb = if updated.is_favorite { "Starred" } else { "Unstarred" };
            self.notify(format!("{} \"{}\"", verb, updated.name));
        }
    }

    pub fn copy_selected(&mut self) {
        let Some(prompt) = self.selected_prompt() else {
            return;
        };
        let outcome = actions::copy_prompt(&mut self.library, &prompt.id, self.clipboard.as_mut());
        self.report(outcome);
    }

    pub fn copy_body(&mut self) {
        let outcome = actions::copy_body(self.body.value(), self.clipboard.as_mut());
        self.report(outcome);
    }

    pub fn compose_and_copy(&mut self) {
        let prefixes = self.prefixes.checked_in_order();
        let suffixes = self.suffixes.checked_in_order();
        let separator = self.current_separator();
        let outcome = actions::compose_and_copy(
            &mut self.library,
            &prefixes,
            self.body.value(),
            &suffixes,
            &separator,
            self.clipboard.as_mut(),
        );
        self.report(outcome);
    }

    fn report(&mut self, outcome: CopyOutcome) {
        let message = outcome.message();
        match outcome {
            CopyOutcome::Copied(_) => self.notify(message),
            CopyOutcome::Empty | CopyOutcome::ClipboardFailed => self.notify_error(message),
        }
    }

    /// Cycles the separator and remembers the choice in the config file.
    pub fn cycle_separator(&mut self) {
        self.separator = self.separator.next();
        self.config.compose.separator = self.separator;
        if let Err(e) = save_config(&self.config, &self.config_path) {
            warn!(error = %e, "separator_save_failed");
        }
        self.notify(format!("Separator: {}", self.separator.label()));
    }

    /// Steps the category filter through None and each known category.
    pub fn cycle_category_filter(&mut self) {
        let categories = self.library.categories();
        self.category_filter = match &self.category_filter {
            None => categories.first().cloned(),
            Some(current) => categories
                .iter()
                .position(|c| c == current)
                .and_then(|i| categories.get(i + 1))
                .cloned(),
        };
        self.library_cursor = 0;
        debug!(category = ?self.category_filter, "category_filter_changed");
    }

    // Modals

    pub fn open_create_form(&mut self) {
        let role = self.focus.role().unwrap_or(PromptRole::Body);
        self.prompt_form = Some(PromptFormState::create(role));
    }

    pub fn open_edit_form(&mut self) {
        if let Some(prompt) = self.selected_prompt() {
            self.prompt_form = Some(PromptFormState::edit(&prompt));
        }
    }

    pub fn request_delete(&mut self) {
        if let Some(prompt) = self.selected_prompt() {
            self.confirm_delete = Some(ConfirmDeleteState {
                id: prompt.id,
                name: prompt.name,
            });
        }
    }

    pub fn open_path_modal(&mut self, mode: PathModalMode) {
        let default_path = dirs::home_dir()
            .map(|home| home.join("prompts-export.json").display().to_string())
            .unwrap_or_else(|| "prompts-export.json".to_string());
        self.path_modal = Some(PathModalState::new(mode, &default_path));
    }

    pub fn has_modal(&self) -> bool {
        self.prompt_form.is_some()
            || self.path_modal.is_some()
            || self.confirm_delete.is_some()
            || self.show_help
    }

    // Status messages

    pub fn notify(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            is_error: false,
            shown_at: Instant::now(),
        });
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            is_error: true,
            shown_at: Instant::now(),
        });
    }

    /// The toast if it has not expired yet.
    pub fn active_toast(&self) -> Option<&Toast> {
        self.toast
            .as_ref()
            .filter(|t| t.shown_at.elapsed() < TOAST_DURATION)
    }

    // Mouse

    fn list_pane_at(&self, x: u16, y: u16) -> Option<Pane> {
        [Pane::Library, Pane::Prefixes, Pane::Suffixes]
            .into_iter()
            .find(|pane| {
                self.pane_rows
                    .get(pane)
                    .is_some_and(|rows| contains(rows.area, x, y))
            })
    }

    /// Left button down: a press on a handle starts a drag, anywhere else in
    /// a list focuses it and moves the cursor.
    pub fn mouse_down(&mut self, x: u16, y: u16) {
        let Some(pane) = self.list_pane_at(x, y) else {
            return;
        };
        let Some(rows) = self.pane_rows.get(&pane).cloned() else {
            return;
        };
        self.focus = pane;
        let Some(index) = rows.row_at(y) else {
            return;
        };
        match pane {
            Pane::Library => self.library_cursor = index,
            Pane::Prefixes => self.prefix_cursor = index,
            Pane::Suffixes => self.suffix_cursor = index,
            Pane::Body => {}
        }

        if pane.role().is_some() && rows.on_handle(x) && self.drag.begin(index, rows.rows) {
            self.drag_pane = Some(pane);
        }
    }

    pub fn mouse_drag(&mut self, y: u16) {
        self.drag.motion(y);
    }

    /// Left button up: completes a drag when released over a row of the
    /// pane it started in, otherwise drops it without reordering.
    pub fn mouse_up(&mut self, x: u16, y: u16) {
        let pane = self.drag_pane.take();
        let inside = pane
            .and_then(|pane| self.pane_rows.get(&pane))
            .is_some_and(|rows| contains(rows.area, x, y));
        if !inside {
            self.drag.cancel();
            return;
        }
        let Some((from, to)) = self.drag.release(y) else {
            return;
        };
        if let Some(pane) = pane
            && let Some((list, cursor)) = self.list_mut(pane)
            && list.reorder(from, to)
        {
            *cursor = to;
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
        self.drag_pane = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::storage::Store;
    use tempfile::TempDir;

    fn new_app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let library = Library::open(Store::new(dir.path().join("prompts.json")));
        let app = App::new(
            library,
            Box::new(MemoryClipboard::default()),
            Config::default(),
            dir.path().join("config.toml"),
            None,
            None,
        );
        (dir, app)
    }

    fn add(app: &mut App, name: &str, role: PromptRole) -> Prompt {
        let prompt = app.library.create(name, name, role, "").unwrap();
        app.poll_updates();
        prompt
    }

    #[test]
    fn test_pane_cycle() {
        let mut pane = Pane::Library;
        for _ in 0..4 {
            pane = pane.next();
        }
        assert_eq!(pane, Pane::Library);
        assert_eq!(Pane::Library.prev(), Pane::Suffixes);
    }

    #[test]
    fn test_lists_follow_library_notifications() {
        let (_dir, mut app) = new_app();
        add(&mut app, "p1", PromptRole::Prefix);
        add(&mut app, "s1", PromptRole::Suffix);
        add(&mut app, "b1", PromptRole::Body);

        assert_eq!(app.prefixes.len(), 1);
        assert_eq!(app.suffixes.len(), 1);
        assert_eq!(app.visible_library().len(), 3);
    }

    #[test]
    fn test_checked_survives_unrelated_update() {
        let (_dir, mut app) = new_app();
        let p1 = add(&mut app, "p1", PromptRole::Prefix);
        add(&mut app, "p2", PromptRole::Prefix);
        app.focus = Pane::Prefixes;
        app.toggle_checked();

        add(&mut app, "p3", PromptRole::Prefix);
        assert!(app.prefixes.is_checked(&p1.id));
        assert_eq!(app.prefixes.len(), 3);
    }

    #[test]
    fn test_move_selected_reorders_and_cursor_follows() {
        let (_dir, mut app) = new_app();
        let p1 = add(&mut app, "p1", PromptRole::Prefix);
        add(&mut app, "p2", PromptRole::Prefix);
        app.focus = Pane::Prefixes;

        app.move_selected(1);
        assert_eq!(app.prefix_cursor, 1);
        assert_eq!(app.prefixes.items()[1].id, p1.id);

        // Already last: nothing moves
        app.move_selected(1);
        assert_eq!(app.prefix_cursor, 1);
        app.move_selected(-5);
        assert_eq!(app.prefix_cursor, 1);
    }

    #[test]
    fn test_compose_and_copy_uses_checked_order() {
        let (_dir, mut app) = new_app();
        add(&mut app, "first", PromptRole::Prefix);
        add(&mut app, "second", PromptRole::Prefix);
        app.focus = Pane::Prefixes;
        app.toggle_checked();
        app.cursor_down();
        app.toggle_checked();
        app.move_selected(-1);
        app.body = TextInput::new("body");

        app.compose_and_copy();
        let toast = app.active_toast().unwrap();
        assert!(!toast.is_error);
        assert_eq!(toast.message, "Copied: 2 prefixes + body");

        // Usage bump arrives as a notification; order and flags survive it.
        app.poll_updates();
        assert_eq!(app.prefixes.checked_count(), 2);
        assert_eq!(app.prefixes.items()[0].name, "second");
        assert_eq!(app.prefixes.items()[0].usage_count, 1);
    }

    #[test]
    fn test_compose_and_copy_nothing_selected() {
        let (_dir, mut app) = new_app();
        app.compose_and_copy();
        let toast = app.active_toast().unwrap();
        assert!(toast.is_error);
        assert!(toast.message.starts_with("Nothing to copy"));
    }

    #[test]
    fn test_deleted_prompt_drops_out_of_selection() {
        let (_dir, mut app) = new_app();
        let p1 = add(&mut app, "p1", PromptRole::Prefix);
        app.focus = Pane::Prefixes;
        app.toggle_checked();

        app.library.delete(&p1.id);
        app.poll_updates();
        assert!(app.prefixes.is_empty());
        assert_eq!(app.prefixes.checked_count(), 0);
    }

    #[test]
    fn test_role_change_moves_between_lists() {
        let (_dir, mut app) = new_app();
        let p = add(&mut app, "p", PromptRole::Prefix);
        app.library
            .update(&p.id, &crate::prompt::PromptUpdate::default().role(PromptRole::Suffix))
            .unwrap();
        app.poll_updates();
        assert!(app.prefixes.is_empty());
        assert_eq!(app.suffixes.len(), 1);
    }

    #[test]
    fn test_cycle_separator_persists() {
        let (_dir, mut app) = new_app();
        app.cycle_separator();
        assert_eq!(app.separator, SeparatorKind::Space);

        let saved = std::fs::read_to_string(&app.config_path).unwrap();
        assert!(saved.contains("separator = \"space\""));
    }

    #[test]
    fn test_category_filter_cycle() {
        let (_dir, mut app) = new_app();
        app.library.create("a", "", PromptRole::Body, "alpha").unwrap();
        app.library.create("b", "", PromptRole::Body, "beta").unwrap();
        app.poll_updates();

        app.cycle_category_filter();
        assert_eq!(app.category_filter.as_deref(), Some("alpha"));
        assert_eq!(app.visible_library().len(), 1);
        app.cycle_category_filter();
        assert_eq!(app.category_filter.as_deref(), Some("beta"));
        app.cycle_category_filter();
        assert_eq!(app.category_filter, None);
        assert_eq!(app.visible_library().len(), 2);
    }

    #[test]
    fn test_search_narrows_library() {
        let (_dir, mut app) = new_app();
        add(&mut app, "Review", PromptRole::Body);
        add(&mut app, "Translate", PromptRole::Body);
        app.search = TextInput::new("rev");
        assert_eq!(app.visible_library().len(), 1);
    }

    #[test]
    fn test_open_create_form_uses_pane_role() {
        let (_dir, mut app) = new_app();
        app.focus = Pane::Suffixes;
        app.open_create_form();
        assert_eq!(app.prompt_form.as_ref().unwrap().role, PromptRole::Suffix);

        app.focus = Pane::Library;
        app.open_create_form();
        assert_eq!(app.prompt_form.as_ref().unwrap().role, PromptRole::Body);
    }

    #[test]
    fn test_request_delete_needs_selection() {
        let (_dir, mut app) = new_app();
        app.request_delete();
        assert!(app.confirm_delete.is_none());

        let p = add(&mut app, "x", PromptRole::Body);
        app.request_delete();
        assert_eq!(app.confirm_delete.as_ref().unwrap().id, p.id);
        assert!(app.has_modal());
    }

    fn layout_prefix_rows(app: &mut App, count: usize) {
        let area = Rect::new(0, 0, 30, count as u16 + 2);
        let rows = (0..count)
            .map(|i| RowSpan {
                index: i,
                top: 1 + i as u16,
                height: 1,
            })
            .collect();
        app.pane_rows.insert(Pane::Prefixes, PaneRows { area, rows });
    }

    #[test]
    fn test_mouse_drag_on_handle_reorders() {
        let (_dir, mut app) = new_app();
        let p1 = add(&mut app, "p1", PromptRole::Prefix);
        add(&mut app, "p2", PromptRole::Prefix);
        add(&mut app, "p3", PromptRole::Prefix);
        layout_prefix_rows(&mut app, 3);

        app.mouse_down(1, 1);
        assert!(app.drag.is_active());
        app.mouse_drag(3);
        app.mouse_up(1, 3);

        assert!(!app.drag.is_active());
        assert_eq!(app.prefixes.items()[2].id, p1.id);
        assert_eq!(app.prefix_cursor, 2);
    }

    #[test]
    fn test_mouse_down_off_handle_only_moves_cursor() {
        let (_dir, mut app) = new_app();
        add(&mut app, "p1", PromptRole::Prefix);
        add(&mut app, "p2", PromptRole::Prefix);
        layout_prefix_rows(&mut app, 2);

        app.mouse_down(10, 2);
        assert!(!app.drag.is_active());
        assert_eq!(app.focus, Pane::Prefixes);
        assert_eq!(app.prefix_cursor, 1);
    }

    #[test]
    fn test_mouse_release_outside_rows_cancels() {
        let (_dir, mut app) = new_app();
        let p1 = add(&mut app, "p1", PromptRole::Prefix);
        add(&mut app, "p2", PromptRole::Prefix);
        layout_prefix_rows(&mut app, 2);

        app.mouse_down(1, 1);
        app.mouse_up(1, 40);
        assert!(!app.drag.is_active());
        assert_eq!(app.prefixes.items()[0].id, p1.id);
    }

    #[test]
    fn test_mouse_release_over_other_pane_cancels() {
        let (_dir, mut app) = new_app();
        let a = add(&mut app, "A", PromptRole::Prefix);
        add(&mut app, "B", PromptRole::Prefix);
        add(&mut app, "C", PromptRole::Prefix);
        // Library on the left, prefixes on the right at the same heights.
        app.pane_rows.insert(
            Pane::Library,
            PaneRows {
                area: Rect::new(0, 4, 40, 5),
                rows: Vec::new(),
            },
        );
        let rows = (0..3)
            .map(|i| RowSpan {
                index: i,
                top: 5 + i as u16,
                height: 1,
            })
            .collect();
        app.pane_rows.insert(
            Pane::Prefixes,
            PaneRows {
                area: Rect::new(40, 4, 40, 5),
                rows,
            },
        );

        app.mouse_down(41, 5);
        assert!(app.drag.is_active());
        app.mouse_drag(7);
        app.mouse_up(10, 7);

        assert!(!app.drag.is_active());
        assert!(app.drag_pane.is_none());
        let names: Vec<_> = app.prefixes.items().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(app.prefixes.items()[0].id, a.id);
    }
}
