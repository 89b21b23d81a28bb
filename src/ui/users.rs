use chrono::{DateTime, Local, NaiveDateTime};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};

use crate::app::AppState;
use crate::app::form::{FormField, FormFocus, UserForm};

pub const LOADING_TEXT: &str = "Loading users...";
pub const EMPTY_TEXT: &str = "There are no users to display.";

/// Render a service timestamp as a date in the local timezone.
///
/// Offset-less timestamps are taken as already local. Anything unparsable is shown as is.
pub fn format_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format("%Y-%m-%d").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

/// Body of the screen: loading text, the error message, or the table. Never more than one.
pub fn render_users_view(f: &mut Frame, area: Rect, app: &mut AppState) {
    let block = Block::default()
        .title("User List")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));

    if app.loading {
        let p = Paragraph::new(LOADING_TEXT)
            .style(Style::default().fg(app.theme.text))
            .block(block);
        f.render_widget(p, area);
        return;
    }
    if let Some(err) = &app.error {
        let p = Paragraph::new(err.as_str())
            .style(Style::default().fg(app.theme.error))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)].as_ref())
        .split(inner);

    let summary = Line::from(vec![
        Span::styled(
            format!("Total users: {}", app.users.len()),
            Style::default().fg(app.theme.text),
        ),
        Span::raw("    "),
        Span::styled(
            "+ Create User (n)",
            Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(Paragraph::new(summary), parts[0]);
    render_users_table(f, parts[1], app);
}

pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let body_height = area.height.saturating_sub(1) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }

    let start = (app.selected_index / app.rows_per_page) * app.rows_per_page;
    let end = (start + app.rows_per_page).min(app.users.len());
    let rows: Vec<Row> = app.users[start.min(end)..end]
        .iter()
        .enumerate()
        .map(|(i, u)| {
            let style = if start + i == app.selected_index {
                Style::default()
                    .fg(app.theme.highlight_fg)
                    .bg(app.theme.highlight_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(app.theme.text)
            };
            Row::new(vec![
                Cell::from(u.first_name.clone()),
                Cell::from(u.last_name.clone()),
                Cell::from(u.email.clone()),
                Cell::from(u.phone.clone()),
                Cell::from(format_date(&u.created_at)),
                Cell::from(format_date(&u.updated_at)),
                Cell::from("Edit | Delete"),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(14),
        Constraint::Percentage(14),
        Constraint::Percentage(24),
        Constraint::Length(12),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(13),
    ];

    let header = Row::new(vec![
        "First Name",
        "Last Name",
        "Email",
        "Phone",
        "Created At",
        "Updated At",
        "Actions",
    ])
    .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, widths).header(header).column_spacing(1);
    f.render_widget(table, area);

    if app.users.is_empty() {
        // A single placeholder row spanning the whole table
        let row_area = Rect {
            y: area.y.saturating_add(1),
            height: area.height.saturating_sub(1).min(1),
            ..area
        };
        let p = Paragraph::new(EMPTY_TEXT)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.muted));
        f.render_widget(p, row_area);
    }
}

pub fn render_user_form(f: &mut Frame, area: Rect, app: &AppState, form: &UserForm) {
    let rect = crate::ui::components::centered_rect(60, 16, area);
    let marker = |focus: FormFocus| if form.focus() == focus { "▶" } else { " " };

    let mut lines: Vec<Line> = Vec::new();
    for field in FormField::ALL {
        let focused = form.focus() == FormFocus::Field(field);
        let value_style = if focused {
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        lines.push(Line::from(vec![
            Span::raw(format!("{} {:<11}", marker(FormFocus::Field(field)), format!("{}:", field.label()))),
            Span::styled(form.value(field).to_string(), value_style),
        ]));
        match form.error(field) {
            Some(err) => lines.push(Line::from(Span::styled(
                format!("  {err}"),
                Style::default().fg(app.theme.error),
            ))),
            None => lines.push(Line::raw("")),
        }
    }

    let button = |label: &str, focus: FormFocus| {
        let style = if form.focus() == focus {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        Span::styled(format!("{} [ {} ]", marker(focus), label), style)
    };
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        button("Cancel", FormFocus::Cancel),
        Span::raw("   "),
        button(form.submit_label(), FormFocus::Submit),
    ]));

    let p = Paragraph::new(lines).block(
        Block::default()
            .title(form.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

pub fn render_delete_confirm(f: &mut Frame, area: Rect, app: &AppState, name: &str, selected: usize) {
    let rect = crate::ui::components::centered_rect(50, 8, area);
    let opt = |idx: usize, label: &str| {
        if idx == selected { format!("▶ {label}") } else { format!("  {label}") }
    };
    let text = format!(
        "Are you sure you want to delete this user?\n{name}\n\n{}    {}",
        opt(0, "Yes"),
        opt(1, "No")
    );
    let p = Paragraph::new(text).style(Style::default().fg(app.theme.text)).block(
        Block::default()
            .title("Delete user")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
