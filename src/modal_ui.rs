//! Modal UI rendering functions.

use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::App;
use crate::modals::{PathModalField, PathModalMode, PromptFormField, TextInput};
use crate::prompt::PromptRole;
use crate::ui::{centered_rect, contract_path};

/// Width of the text shown for an input field.
const FIELD_WIDTH: usize = 44;

/// Picks the slice of `chars` to show so the cursor stays visible.
/// Returns the visible characters and the cursor's column inside them.
fn visible_window(chars: &[char], cursor: usize, width: usize) -> (String, usize) {
    if chars.len() <= width {
        return (chars.iter().collect(), cursor);
    }
    let start = cursor.saturating_sub(width / 2);
    let end = (start + width).min(chars.len());
    let start = end.saturating_sub(width);
    (chars[start..end].iter().collect(), cursor - start)
}

/// Renders a text input, with a block cursor when focused.
fn render_input(input: &TextInput, focused: bool) -> Vec<Span<'static>> {
    // Newlines shown as a visible glyph so multi-line content stays on one row.
    let chars: Vec<char> = input
        .value()
        .chars()
        .map(|c| if c == '\n' { '↵' } else { c })
        .collect();
    let (shown, cursor) = visible_window(&chars, input.cursor(), FIELD_WIDTH);

    if !focused {
        return vec![Span::styled(shown, Style::default().fg(Color::White))];
    }

    let shown: Vec<char> = shown.chars().collect();
    let before: String = shown[..cursor.min(shown.len())].iter().collect();
    let cursor_char = shown.get(cursor).copied().unwrap_or(' ').to_string();
    let rest: String = shown.iter().skip(cursor + 1).collect();

    vec![
        Span::styled(before, Style::default().fg(Color::White)),
        Span::styled(
            cursor_char,
            Style::default().fg(Color::Black).bg(Color::White),
        ),
        Span::styled(rest, Style::default().fg(Color::White)),
    ]
}

fn label_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn button(label: &str, focused: bool, enabled: bool) -> Span<'static> {
    let style = if !enabled {
        Style::default().fg(Color::DarkGray)
    } else if focused {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default().fg(Color::Cyan)
    };
    Span::styled(format!(" {} ", label), style)
}

fn field_error_line(error: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("              \u{26a0} {}", error),
        Style::default().fg(Color::Yellow),
    ))
}

fn error_or_blank(error: Option<&String>) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            format!("  Error: {}", error),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(""),
    }
}

/// Draw the create/edit prompt form.
pub fn draw_prompt_form(f: &mut Frame, app: &App) {
    let modal_area = centered_rect(64, 17, f.area());
    f.render_widget(Clear, modal_area);

    let Some(state) = &app.prompt_form else {
        return;
    };
    let focus = state.focus;
    let mut content: Vec<Line> = vec![Line::from("")];

    let text_fields = [
        (PromptFormField::Name, "  Name:       ", &state.name),
        (PromptFormField::Content, "  Content:    ", &state.content),
    ];
    for (field, label, input) in text_fields {
        let focused = focus == field;
        let mut line = vec![Span::styled(label, label_style(focused))];
        line.extend(render_input(input, focused));
        content.push(Line::from(line));
        if let Some(error) = state.validation_errors.get(&field) {
            content.push(field_error_line(error));
        }
    }

    // Role selector
    let role_focused = focus == PromptFormField::Role;
    let mut role_line = vec![Span::styled("  Role:       ", label_style(role_focused))];
    for role in PromptRole::ALL {
        let style = if role == state.role {
            Style::default().fg(Color::Black).bg(if role_focused {
                Color::Cyan
            } else {
                Color::White
            })
        } else {
            Style::default().fg(Color::DarkGray)
        };
        role_line.push(Span::styled(format!(" {} ", role), style));
        role_line.push(Span::raw(" "));
    }
    content.push(Line::from(role_line));

    let category_focused = focus == PromptFormField::Category;
    let mut category_line = vec![Span::styled("  Category:   ", label_style(category_focused))];
    category_line.extend(render_input(&state.category, category_focused));
    if state.category.is_blank() && !category_focused {
        category_line.push(Span::styled("general", Style::default().fg(Color::DarkGray)));
    }
    content.push(Line::from(category_line));
    if let Some(error) = state.validation_errors.get(&PromptFormField::Category) {
        content.push(field_error_line(error));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Tab next field · Enter in Content adds a line · Ctrl+S save",
        Style::default().fg(Color::DarkGray),
    )));
    content.push(error_or_blank(state.error.as_ref()));

    content.push(Line::from(vec![
        Span::raw("                    "),
        button(
            "Save",
            focus == PromptFormField::SaveButton,
            !state.has_validation_errors(),
        ),
        Span::raw("    "),
        button("Cancel", focus == PromptFormField::CancelButton, true),
    ]));

    let modal = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(state.title())
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(Color::White)),
    );
    f.render_widget(modal, modal_area);
}

/// Draw the export/import dialog.
pub fn draw_path_modal(f: &mut Frame, app: &App) {
    let modal_area = centered_rect(64, 12, f.area());
    f.render_widget(Clear, modal_area);

    let Some(state) = &app.path_modal else {
        return;
    };
    let focus = state.focus;
    let mut content: Vec<Line> = vec![Line::from("")];

    let path_focused = focus == PathModalField::Path;
    let mut path_line = vec![Span::styled("  File:  ", label_style(path_focused))];
    path_line.extend(render_input(&state.path, path_focused));
    content.push(Line::from(path_line));
    if let Some(error) = &state.validation_error {
        content.push(field_error_line(error));
    }

    if state.mode == PathModalMode::Import {
        let merge_focused = focus == PathModalField::Merge;
        let (mark, description) = if state.merge {
            ("[x]", "Merge: keep existing prompts, add new ids")
        } else {
            ("[ ]", "Merge: off, replace the whole library")
        };
        let mark_style = if merge_focused {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        };
        content.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(mark, mark_style),
            Span::styled(format!(" {}", description), label_style(merge_focused)),
        ]));
    } else {
        content.push(Line::from(vec![
            Span::styled("  Library: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!(
                    "{} prompts from {}",
                    app.stats().total,
                    contract_path(app.library.store().path())
                ),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]));
    }

    content.push(Line::from(""));
    content.push(error_or_blank(state.error.as_ref()));

    let confirm_label = match state.mode {
        PathModalMode::Export => "Export",
        PathModalMode::Import => "Import",
    };
    content.push(Line::from(vec![
        Span::raw("                    "),
        button(
            confirm_label,
            focus == PathModalField::ConfirmButton,
            state.validation_error.is_none(),
        ),
        Span::raw("    "),
        button("Cancel", focus == PathModalField::CancelButton, true),
    ]));

    let modal = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(state.title())
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(Color::White)),
    );
    f.render_widget(modal, modal_area);
}

/// Draw the delete confirmation.
pub fn draw_confirm_delete(f: &mut Frame, app: &App) {
    let modal_area = centered_rect(50, 7, f.area());
    f.render_widget(Clear, modal_area);

    let Some(pending) = &app.confirm_delete else {
        return;
    };

    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  Delete "),
            Span::styled(
                format!("\"{}\"", pending.name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("?"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("y", Style::default().fg(Color::Red)),
            Span::styled(" delete    ", Style::default().fg(Color::DarkGray)),
            Span::styled("n", Style::default().fg(Color::Cyan)),
            Span::styled(" keep", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let modal = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Confirm ")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(modal, modal_area);
}

/// Draw the keyboard help.
pub fn draw_help_modal(f: &mut Frame, _app: &App) {
    let modal_width: u16 = 54;
    let modal_height: u16 = 28;
    let modal_area = centered_rect(modal_width, modal_height, f.area());

    f.render_widget(Clear, modal_area);

    let key_style = Style::default().fg(Color::Cyan);
    let desc_style = Style::default().fg(Color::DarkGray);
    let header_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let entry = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("{:<9}", key), key_style),
            Span::styled(desc, desc_style),
        ])
    };

    let inner_width = modal_width.saturating_sub(4) as usize;
    let footer_text = "? or Esc to close";
    let footer_padding = inner_width.saturating_sub(footer_text.len());

    let content: Vec<Line> = vec![
        Line::from(Span::styled("  Library", header_style)),
        entry("n", "New prompt"),
        entry("e", "Edit prompt (body text in Body pane)"),
        entry("d", "Delete prompt"),
        entry("f", "Star / unstar"),
        entry("y", "Copy prompt"),
        entry("/", "Search"),
        entry("g", "Cycle category filter"),
        Line::from(""),
        Line::from(Span::styled("  Compose", header_style)),
        entry("space", "Check / uncheck prefix or suffix"),
        entry("K / J", "Move up / down"),
        entry("drag ⠿", "Reorder with the mouse"),
        entry("s", "Cycle separator"),
        entry("c", "Compose & copy"),
        entry("b", "Copy body only"),
        entry("x", "Clear selection and body"),
        Line::from(""),
        Line::from(Span::styled("  General", header_style)),
        entry("Tab", "Next pane"),
        entry("j / k", "Cursor down / up"),
        entry("E / I", "Export / import library"),
        entry("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::raw(" ".repeat(footer_padding)),
            Span::styled(footer_text, desc_style),
        ]),
    ];

    let modal = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(Color::White)),
    );

    f.render_widget(modal, modal_area);
}
