pub mod components;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, ModalState};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());

    let p = Paragraph::new("n: create  e/Enter: edit  d: delete  r: reload  ?: keys  q: quit")
        .block(
            Block::default()
                .title("Management Users System")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, root[0]);

    users::render_users_view(f, root[1], app);
    components::render_status_bar(f, root[2], app);

    let area = f.area();
    if let Some(state) = app.modal.clone() {
        match state {
            ModalState::Form(form) => users::render_user_form(f, area, app, &form),
            ModalState::DeleteConfirm { name, selected, .. } => {
                users::render_delete_confirm(f, area, app, &name, selected)
            }
            ModalState::Help => components::render_help(f, area, app),
        }
    }
}
