//! UI rendering functions.

use std::path::Path;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthChar;

use crate::app::{App, Pane, PaneRows};
use crate::modal_ui::{draw_confirm_delete, draw_help_modal, draw_path_modal, draw_prompt_form};
use crate::prompt::{Prompt, PromptRole};
use crate::selection::{RowSpan, SelectionList};

/// Drag handle glyph drawn at the start of every selectable row.
pub const DRAG_HANDLE: &str = "⠿ ";

/// Contract a path by replacing the home directory with `~` for display.
pub fn contract_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(suffix) = path.strip_prefix(&home)
    {
        return format!("~/{}", suffix.display());
    }
    path.display().to_string()
}

/// Truncates a string to the given display width, appending "..." if truncated.
/// Newlines become spaces.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    let single_line: String = s.chars().map(|c| if c == '\n' { ' ' } else { c }).collect();

    let width = |c: char| c.width().unwrap_or(0);
    if single_line.chars().map(width).sum::<usize>() <= max_width {
        return single_line;
    }

    let budget = max_width.saturating_sub(3);
    let mut out = String::new();
    let mut used = 0;
    for c in single_line.chars() {
        let w = width(c);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// First visible index so that `cursor` stays inside a window of `height` rows.
pub fn scroll_offset(cursor: usize, height: usize) -> usize {
    if height == 0 {
        return cursor;
    }
    cursor.saturating_sub(height - 1)
}

pub fn empty_hint(role: PromptRole) -> String {
    format!("No {} prompts yet.", role)
}

fn pane_block(app: &App, pane: Pane, title: String) -> Block<'static> {
    let focused = app.focus == pane && !app.has_modal();
    let (border_type, color) = if focused {
        (BorderType::Double, Color::Cyan)
    } else {
        (BorderType::Rounded, Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(color))
        .title(Line::from(title).left_aligned())
}

/// Draw the main UI.
pub fn draw_ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header (border + 1 content row + border)
            Constraint::Min(8),    // Panes
            Constraint::Length(7), // Preview
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Min(4),
            Constraint::Percentage(35),
        ])
        .split(columns[1]);

    draw_library(f, app, columns[0]);
    draw_role_list(f, app, Pane::Prefixes, right[0]);
    draw_body(f, app, right[1]);
    draw_role_list(f, app, Pane::Suffixes, right[2]);
    draw_preview(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);

    if app.prompt_form.is_some() {
        draw_prompt_form(f, app);
    }
    if app.path_modal.is_some() {
        draw_path_modal(f, app);
    }
    if app.confirm_delete.is_some() {
        draw_confirm_delete(f, app);
    }
    if app.show_help {
        draw_help_modal(f, app);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let stats = app.stats();
    let dim = Style::default().add_modifier(Modifier::DIM);

    let mut spans = vec![
        Span::styled(
            "promptdeck",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "    {} prompts  ★ {}  {} uses",
            stats.total, stats.favorites, stats.total_uses
        )),
        Span::raw("    Data: "),
        Span::styled(contract_path(app.library.store().path()), dim),
    ];
    if let Some(log_dir) = &app.log_directory {
        spans.push(Span::raw("    Logs: "));
        spans.push(Span::styled(contract_path(log_dir), dim));
    }

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));
    if let Some(session_id) = &app.session_id {
        block = block.title(Line::from(format!(" {} ", session_id)).right_aligned());
    }

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_library(f: &mut Frame, app: &mut App, area: Rect) {
    let prompts = app.visible_library();
    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2) as usize;
    let offset = scroll_offset(app.library_cursor, inner_height);
    let focused = app.focus == Pane::Library;

    let mut title = format!(" Library ({}) ", prompts.len());
    if let Some(category) = &app.category_filter {
        title.push_str(&format!("[{}] ", category));
    }
    let mut block = pane_block(app, Pane::Library, title);
    if app.editing_search || !app.search.value().is_empty() {
        let cursor = if app.editing_search { "▏" } else { "" };
        block = block.title_bottom(
            Line::from(format!(" / {}{} ", app.search.value(), cursor)).left_aligned(),
        );
    }

    let mut lines = Vec::new();
    let mut rows = Vec::new();
    if prompts.is_empty() {
        let hint = if app.library.state().prompts.is_empty() {
            "No prompts yet. Press n to add one."
        } else {
            "No prompts match."
        };
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (index, prompt) in prompts.iter().enumerate().skip(offset).take(inner_height) {
        rows.push(RowSpan {
            index,
            top: area.y + 1 + (index - offset) as u16,
            height: 1,
        });
        lines.push(library_line(
            prompt,
            focused && index == app.library_cursor,
            inner_width,
        ));
    }

    app.pane_rows.insert(Pane::Library, PaneRows { area, rows });
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn library_line(prompt: &Prompt, highlighted: bool, width: usize) -> Line<'static> {
    let star = if prompt.is_favorite { "★ " } else { "  " };
    let role = format!("{:<6} ", prompt.role.as_str());
    let uses = format!(" ×{}", prompt.usage_count);
    let name_width = width.saturating_sub(2 + role.len() + uses.len());
    let row_style = if highlighted {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::styled(star, row_style.fg(Color::Yellow)),
        Span::styled(role, row_style.add_modifier(Modifier::DIM)),
        Span::styled(truncate_str(&prompt.name, name_width), row_style),
        Span::styled(uses, row_style.add_modifier(Modifier::DIM)),
    ])
    .style(row_style)
}

fn draw_role_list(f: &mut Frame, app: &mut App, pane: Pane, area: Rect) {
    let (list, cursor, role) = match pane {
        Pane::Prefixes => (&app.prefixes, app.prefix_cursor, PromptRole::Prefix),
        Pane::Suffixes => (&app.suffixes, app.suffix_cursor, PromptRole::Suffix),
        Pane::Library | Pane::Body => return,
    };
    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2) as usize;
    let offset = scroll_offset(cursor, inner_height);
    let focused = app.focus == pane;
    let dragging_here = app.drag_pane == Some(pane);

    let title = format!(
        " {} ({}/{}) ",
        pane.title(),
        list.checked_count(),
        list.len()
    );

    let mut lines = Vec::new();
    let mut rows = Vec::new();
    if list.is_empty() {
        lines.push(Line::from(Span::styled(
            empty_hint(role),
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (index, prompt) in list.items().iter().enumerate().skip(offset).take(inner_height) {
        rows.push(RowSpan {
            index,
            top: area.y + 1 + (index - offset) as u16,
            height: 1,
        });
        let is_source = dragging_here && app.drag.source() == Some(index);
        let is_target = dragging_here && app.drag.target() == Some(index);
        lines.push(selection_line(
            list,
            prompt,
            focused && index == cursor,
            is_source,
            is_target,
            inner_width,
        ));
    }

    let block = pane_block(app, pane, title);
    app.pane_rows.insert(pane, PaneRows { area, rows });
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn selection_line(
    list: &SelectionList<Prompt>,
    prompt: &Prompt,
    highlighted: bool,
    is_source: bool,
    is_target: bool,
    width: usize,
) -> Line<'static> {
    let checkbox = if list.is_checked(&prompt.id) { "[x] " } else { "[ ] " };
    let row_style = if is_target {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else if highlighted {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else if is_source {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };
    let name_width = width.saturating_sub(DRAG_HANDLE.chars().count() + checkbox.len());

    Line::from(vec![
        Span::styled(DRAG_HANDLE, row_style.fg(Color::DarkGray)),
        Span::styled(checkbox, row_style),
        Span::styled(truncate_str(&prompt.name, name_width), row_style),
    ])
    .style(row_style)
}

fn draw_body(f: &mut Frame, app: &App, area: Rect) {
    let title = if app.editing_body {
        " Body (editing, Esc to finish) ".to_string()
    } else {
        " Body ".to_string()
    };
    let block = pane_block(app, Pane::Body, title);

    let content = if app.body.value().is_empty() && !app.editing_body {
        ratatui::text::Text::from(Line::from(Span::styled(
            "Press e to write the body text.",
            Style::default().fg(Color::DarkGray),
        )))
    } else if app.editing_body {
        let value = app.body.value();
        let split = value
            .char_indices()
            .nth(app.body.cursor())
            .map(|(i, _)| i)
            .unwrap_or(value.len());
        let mut with_cursor = String::with_capacity(value.len() + 3);
        with_cursor.push_str(&value[..split]);
        with_cursor.push('▏');
        with_cursor.push_str(&value[split..]);
        ratatui::text::Text::from(with_cursor)
    } else {
        ratatui::text::Text::from(app.body.value().to_string())
    };

    f.render_widget(
        Paragraph::new(content)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_preview(f: &mut Frame, app: &App, area: Rect) {
    let preview = app.preview();
    let summary = app.selection_summary();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Line::from(" Preview ").left_aligned())
        .title(Line::from(format!(" Separator: {} ", app.separator.label())).right_aligned())
        .title_bottom(Line::from(format!(" {} ", summary)).left_aligned());

    let paragraph = if preview.is_empty() {
        Paragraph::new(Span::styled(
            "Check prefixes and suffixes, write a body, then press c to copy.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(preview)
    };
    f.render_widget(paragraph.block(block).wrap(Wrap { trim: false }), area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(toast) = app.active_toast() {
        let color = if toast.is_error { Color::Yellow } else { Color::Green };
        Line::from(Span::styled(
            toast.message.clone(),
            Style::default().fg(color),
        ))
    } else {
        let hints = match app.focus {
            Pane::Library => "[n] New  [e] Edit  [d] Delete  [f] Star  [y] Copy  [/] Search  [g] Category  [?] Help  [q] Quit",
            Pane::Prefixes | Pane::Suffixes => "[space] Check  [K/J] Move  [c] Compose & copy  [s] Separator  [x] Clear  [?] Help",
            Pane::Body => "[e] Edit body  [b] Copy body  [c] Compose & copy  [?] Help  [q] Quit",
        };
        Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray)))
    };
    f.render_widget(Paragraph::new(line), area);
}
