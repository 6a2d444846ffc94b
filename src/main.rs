mod actions;
mod app;
mod cli;
mod clipboard;
mod compose;
mod config;
mod error;
mod library;
mod logging;
mod modal_ui;
mod modals;
mod prompt;
mod selection;
mod storage;
mod ui;
mod validators;

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{DefaultTerminal, Terminal};
use tracing::{debug, info, warn};

use crate::app::{App, Pane};
use crate::cli::Cli;
use crate::clipboard::SystemClipboard;
use crate::config::{ConfigLoadStatus, LoadedConfig};
use crate::library::Library;
use crate::modals::{
    PathModalMode, handle_confirm_delete_input, handle_path_modal_input,
    handle_prompt_form_input,
};
use crate::storage::Store;
use crate::ui::draw_ui;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();

    let loaded_config = config::load_config();

    // Logging goes to a file so it never fights the terminal UI.
    let (session_id, log_directory, _guard) =
        match logging::init(&loaded_config.config.logging.level) {
            Ok(ctx) => (Some(ctx.session_id), Some(ctx.log_directory), Some(ctx._guard)),
            Err(e) => {
                eprintln!("Warning: Failed to initialize logging: {}", e);
                (None, None, None)
            }
        };
    if let Some(dir) = &log_directory {
        logging::cleanup_old_logs(dir);
    }

    debug!(
        config_path = %loaded_config.config_path.display(),
        status = ?loaded_config.status,
        "config_loaded"
    );
    if let ConfigLoadStatus::Error(e) = &loaded_config.status {
        warn!(error = %e, "config_fallback_to_defaults");
    }

    let data_file = cli
        .data_file
        .clone()
        .unwrap_or_else(|| loaded_config.config.data_file_path());
    info!(data_file = %data_file.display(), "library_opening");
    let mut library = Library::open(Store::new(data_file));

    let result = match cli.command {
        Some(command) => {
            // The process exits right after the copy, so the selection has
            // to be handed over before returning.
            let mut clipboard = SystemClipboard::holding();
            let mut stdout = io::stdout().lock();
            cli::run_command(
                command,
                &mut library,
                &loaded_config.config,
                &mut clipboard,
                &mut stdout,
            )
        }
        None => run_tui(library, loaded_config, session_id.clone(), log_directory),
    };

    if let Some(sid) = session_id {
        info!(
            session_id = %sid,
            duration_secs = start_time.elapsed().as_secs_f64(),
            "session_end"
        );
    }

    result
}

fn run_tui(
    library: Library,
    loaded_config: LoadedConfig,
    session_id: Option<String>,
    log_directory: Option<PathBuf>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let terminal = Terminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

    let app = App::new(
        library,
        Box::new(SystemClipboard::new()),
        loaded_config.config,
        loaded_config.config_path,
        session_id,
        log_directory,
    );
    let result = run_app(terminal, app);

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;

    result
}

fn run_app(mut terminal: DefaultTerminal, mut app: App) -> Result<()> {
    loop {
        app.poll_updates();

        terminal.draw(|f| draw_ui(f, &mut app))?;

        if crossterm::event::poll(Duration::from_millis(50))? {
            match crossterm::event::read()? {
                Event::Key(key) => handle_key(&mut app, key),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Modals take all input while open.
    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?')) {
            app.show_help = false;
        }
        return;
    }
    if app.prompt_form.is_some() {
        handle_prompt_form_input(app, key.code, key.modifiers);
        return;
    }
    if app.path_modal.is_some() {
        handle_path_modal_input(app, key.code, key.modifiers);
        return;
    }
    if app.confirm_delete.is_some() {
        handle_confirm_delete_input(app, key.code);
        return;
    }

    if app.editing_body {
        match key.code {
            KeyCode::Esc => app.editing_body = false,
            KeyCode::Enter => app.body.insert_char('\n'),
            code => {
                app.body.handle_edit_key(code);
            }
        }
        return;
    }

    if app.editing_search {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => app.editing_search = false,
            code => {
                if app.search.handle_edit_key(code) {
                    app.library_cursor = 0;
                }
            }
        }
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab => app.focus_next(),
        KeyCode::BackTab => app.focus_prev(),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_up(),
        KeyCode::Char('j') | KeyCode::Down => app.cursor_down(),
        KeyCode::Char(' ') => app.toggle_checked(),
        KeyCode::Char('K') => app.move_selected(-1),
        KeyCode::Char('J') => app.move_selected(1),
        KeyCode::Char('n') => app.open_create_form(),
        KeyCode::Char('e') | KeyCode::Enter if app.focus == Pane::Body => app.editing_body = true,
        KeyCode::Char('e') => app.open_edit_form(),
        KeyCode::Char('d') => app.request_delete(),
        KeyCode::Char('f') => app.toggle_favorite_selected(),
        KeyCode::Char('y') => app.copy_selected(),
        KeyCode::Char('/') => app.editing_search = true,
        KeyCode::Char('g') => app.cycle_category_filter(),
        KeyCode::Char('s') => app.cycle_separator(),
        KeyCode::Char('c') => app.compose_and_copy(),
        KeyCode::Char('b') => app.copy_body(),
        KeyCode::Char('x') => app.clear_selection(),
        KeyCode::Char('E') => app.open_path_modal(PathModalMode::Export),
        KeyCode::Char('I') => app.open_path_modal(PathModalMode::Import),
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Esc => {
            if app.drag.is_active() {
                app.cancel_drag();
            } else if !app.search.is_blank() {
                app.search.clear();
                app.library_cursor = 0;
            }
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.has_modal() {
        return;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.mouse_down(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.mouse_drag(mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.mouse_up(mouse.column, mouse.row),
        MouseEventKind::ScrollUp => app.cursor_up(),
        MouseEventKind::ScrollDown => app.cursor_down(),
        _ => {}
    }
}
