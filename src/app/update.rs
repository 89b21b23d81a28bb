use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;
use tracing::debug;

use crate::api::UserClient;
use crate::app::form::FormFocus;
use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode, ModalState, Outcome, Request};
use crate::ui;

/// What the event loop should do after a key press.
#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    Send(Request),
}

impl From<Option<Request>> for Effect {
    fn from(req: Option<Request>) -> Self {
        req.map_or(Effect::None, Effect::Send)
    }
}

/// Runs [`Request`]s on the tokio runtime and posts each [`Outcome`] back to the UI thread.
#[derive(Clone)]
pub struct Dispatcher {
    client: UserClient,
    runtime: tokio::runtime::Handle,
    tx: Sender<Outcome>,
}

impl Dispatcher {
    pub fn new(client: UserClient, runtime: tokio::runtime::Handle, tx: Sender<Outcome>) -> Self {
        Self {
            client,
            runtime,
            tx,
        }
    }

    pub fn dispatch(&self, req: Request) {
        debug!(?req, "dispatching");
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let outcome = execute(&client, req).await;
            // The receiver only goes away when the UI is shutting down.
            let _ = tx.send(outcome);
        });
    }
}

/// Perform one request against the API.
pub async fn execute(client: &UserClient, req: Request) -> Outcome {
    match req {
        Request::LoadUsers => Outcome::UsersLoaded(client.list_users().await),
        Request::CreateUser(payload) => Outcome::UserSaved(client.create_user(&payload).await),
        Request::UpdateUser { id, patch } => {
            Outcome::UserSaved(client.update_user(&id, &patch).await)
        }
        Request::DeleteUser { id } => Outcome::UserDeleted(client.delete_user(&id).await),
    }
}

pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut app: AppState,
    dispatcher: Dispatcher,
    outcomes: Receiver<Outcome>,
) -> Result<()> {
    dispatcher.dispatch(app.begin_load());

    loop {
        while let Ok(outcome) = outcomes.try_recv() {
            if let Some(next) = app.apply(outcome) {
                dispatcher.dispatch(next);
            }
        }

        terminal.draw(|f| {
            ui::render(f, &mut app);
        })?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match handle_key(&mut app, key) {
                        Effect::None => {}
                        Effect::Quit => break,
                        Effect::Send(req) => dispatcher.dispatch(req),
                    }
                }
            }
        }
    }
    Ok(())
}

/// Apply one key press to the state.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Effect {
    match app.input_mode {
        InputMode::Normal => handle_list_key(app, key),
        InputMode::Modal => handle_modal_key(app, key),
    }
}

fn handle_list_key(app: &mut AppState, key: KeyEvent) -> Effect {
    let Some(action) = app.keymap.resolve(&key) else {
        return Effect::None;
    };
    match action {
        KeyAction::Quit => return Effect::Quit,
        KeyAction::OpenHelp => {
            app.open_help();
            return Effect::None;
        }
        _ => {}
    }
    if app.loading {
        return Effect::None;
    }
    if app.error.is_some() {
        // Only the message is on screen; reloading is the way back.
        return match action {
            KeyAction::Reload => Effect::Send(app.begin_load()),
            _ => Effect::None,
        };
    }
    match action {
        KeyAction::NewUser => app.open_create(),
        KeyAction::EditSelection => app.open_edit(),
        KeyAction::DeleteSelection => app.request_delete(),
        KeyAction::Reload => return Effect::Send(app.begin_load()),
        KeyAction::MoveUp => app.move_selection(-1),
        KeyAction::MoveDown => app.move_selection(1),
        KeyAction::PageUp => app.move_selection(-(app.rows_per_page as isize)),
        KeyAction::PageDown => app.move_selection(app.rows_per_page as isize),
        KeyAction::Quit | KeyAction::OpenHelp | KeyAction::Ignore => {}
    }
    Effect::None
}

fn handle_modal_key(app: &mut AppState, key: KeyEvent) -> Effect {
    match app.modal.as_mut() {
        Some(ModalState::Form(form)) => match key.code {
            KeyCode::Esc => {
                app.cancel_form();
                Effect::None
            }
            KeyCode::Tab | KeyCode::Down => {
                form.focus_next();
                Effect::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.focus_prev();
                Effect::None
            }
            KeyCode::Enter => {
                if form.focus() == FormFocus::Cancel {
                    app.cancel_form();
                    Effect::None
                } else {
                    app.submit_form().into()
                }
            }
            KeyCode::Backspace => {
                form.backspace();
                Effect::None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                form.insert_char(c);
                Effect::None
            }
            _ => Effect::None,
        },
        Some(ModalState::DeleteConfirm { selected, .. }) => match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
                *selected = 1 - *selected;
                Effect::None
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete().into(),
            KeyCode::Enter if *selected == 0 => app.confirm_delete().into(),
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                app.dismiss_modal();
                Effect::None
            }
            _ => Effect::None,
        },
        Some(ModalState::Help) => {
            app.dismiss_modal();
            Effect::None
        }
        None => {
            app.input_mode = InputMode::Normal;
            Effect::None
        }
    }
}
