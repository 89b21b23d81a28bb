//! Shared UI components (status bar, help overlay, modal helpers).
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::collections::{BTreeMap, BTreeSet};

use crate::app::keymap::{KeyAction, Keymap};
use crate::app::{AppState, InputMode};

/// Render the bottom status bar with mode, count and target API.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal if app.loading => "LOADING",
        InputMode::Normal if app.error.is_some() => "ERROR (r: reload)",
        InputMode::Normal => "NORMAL",
        InputMode::Modal if app.is_saving() => "SAVING",
        InputMode::Modal => "MODAL",
    };
    let msg = format!("mode: {mode}  users:{}  api: {}", app.users.len(), app.api_url);
    let p = Paragraph::new(msg).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

fn action_label(action: KeyAction) -> Option<&'static str> {
    match action {
        KeyAction::Quit => Some("Quit"),
        KeyAction::NewUser => Some("Create user"),
        KeyAction::EditSelection => Some("Edit user"),
        KeyAction::DeleteSelection => Some("Delete user"),
        KeyAction::Reload => Some("Reload"),
        KeyAction::OpenHelp => Some("Help"),
        KeyAction::MoveUp => Some("Move up"),
        KeyAction::MoveDown => Some("Move down"),
        KeyAction::PageUp => Some("Page up"),
        KeyAction::PageDown => Some("Page down"),
        KeyAction::Ignore => None,
    }
}

/// Render the keybindings overlay, grouped by action.
pub fn render_help(f: &mut Frame, area: Rect, app: &AppState) {
    let width = 64u16.min(area.width.saturating_sub(4)).max(40);
    let height = 22u16.min(area.height.saturating_sub(2)).max(10);
    let rect = centered_rect(width, height, area);

    let mut grouped: BTreeMap<&'static str, BTreeSet<String>> = BTreeMap::new();
    for ((mods, code), action) in app.keymap.all_bindings() {
        if let Some(label) = action_label(action) {
            grouped
                .entry(label)
                .or_default()
                .insert(Keymap::format_key(mods, code));
        }
    }

    let col1_w = grouped
        .keys()
        .map(|k| k.len())
        .chain(["Next / previous field".len()])
        .max()
        .unwrap_or(0);
    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::raw(format!("  {:>width$} │ ", label, width = col1_w)),
            Span::styled(value, Style::default().add_modifier(Modifier::ITALIC)),
        ])
    };

    let mut lines: Vec<Line> = vec![Line::from(Span::styled(
        "User list:",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for (label, keys) in grouped {
        lines.push(row(label, keys.into_iter().collect::<Vec<_>>().join(", ")));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Form:",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for (label, value) in [
        ("Next / previous field", "Tab, Down / Shift+Tab, Up"),
        ("Submit", "Enter"),
        ("Cancel", "Esc"),
    ] {
        lines.push(row(label, value.to_string()));
    }

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Keybindings (any key to close)")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
