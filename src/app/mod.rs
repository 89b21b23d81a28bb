//! Application state types and entry glue.
//!
//! `AppState` is the list screen: it holds the cached user collection, the
//! loading/error flags and whichever modal is open. Network work is expressed
//! as [`Request`] values and comes back as [`Outcome`] values, so the state
//! machine never touches the HTTP client directly.
//!
pub mod config;
pub mod form;
pub mod keymap;
pub mod update;

use ratatui::style::Color;
use tracing::warn;

use crate::api::{User, UserPatch, UserPayload};
use crate::error::RequestError;
use form::UserForm;

pub const LOAD_FAILED: &str = "Failed to load users";
pub const SAVE_FAILED: &str = "Failed to save user";
pub const DELETE_FAILED: &str = "Failed to delete user";

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Modal,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub error: Color,
}

impl Theme {
    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            error: Color::Rgb(0xf3, 0x8b, 0xa8),        // red
        }
    }

    /// Load theme from a simple key=value file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();

        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().map(|s| s.trim()).unwrap_or("");
            let val = parts.next().map(|s| s.trim()).unwrap_or("");
            if key.is_empty() || val.is_empty() {
                continue;
            }
            if let Some(color) = Self::parse_color(val) {
                match key {
                    "text" => theme.text = color,
                    "muted" => theme.muted = color,
                    "title" => theme.title = color,
                    "border" => theme.border = color,
                    "header_bg" => theme.header_bg = color,
                    "header_fg" => theme.header_fg = color,
                    "status_bg" => theme.status_bg = color,
                    "status_fg" => theme.status_fg = color,
                    "highlight_fg" => theme.highlight_fg = color,
                    "highlight_bg" => theme.highlight_bg = color,
                    "error" => theme.error = color,
                    _ => {}
                }
            }
        }

        Some(theme)
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB") or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(lower.as_str());
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
        None
    }

    /// Persist the theme to a config file in key=value format.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# users-admin theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");

        fn color_to_str(c: Color) -> String {
            match c {
                Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
                _ => "reset".to_string(),
            }
        }

        let mut kv = |k: &str, v: Color| {
            let _ = writeln!(&mut buf, "{} = {}", k, color_to_str(v));
        };

        kv("text", self.text);
        kv("muted", self.muted);
        kv("title", self.title);
        kv("border", self.border);
        kv("header_bg", self.header_bg);
        kv("header_fg", self.header_fg);
        kv("status_bg", self.status_bg);
        kv("status_fg", self.status_fg);
        kv("highlight_fg", self.highlight_fg);
        kv("highlight_bg", self.highlight_bg);
        kv("error", self.error);

        std::fs::write(path, buf)
    }

    /// Load the theme at `path`, writing the defaults there first if the file is missing.
    pub fn load_or_init(path: &str) -> Self {
        let p = std::path::Path::new(path);
        if p.exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        if let Err(e) = t.write_file(path) {
            warn!(path, error = %e, "could not write default theme");
        }
        t
    }
}

/// Dialogs drawn on top of the list.
#[derive(Clone, Debug)]
pub enum ModalState {
    Form(UserForm),
    DeleteConfirm {
        user_id: String,
        name: String,
        /// 0 = Yes, 1 = No
        selected: usize,
    },
    Help,
}

/// Work for the API client, produced by the list screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    LoadUsers,
    CreateUser(UserPayload),
    UpdateUser { id: String, patch: UserPatch },
    DeleteUser { id: String },
}

/// Result of a [`Request`], fed back into [`AppState::apply`].
#[derive(Clone, Debug)]
pub enum Outcome {
    UsersLoaded(Result<Vec<User>, RequestError>),
    UserSaved(Result<User, RequestError>),
    UserDeleted(Result<(), RequestError>),
}

pub struct AppState {
    pub users: Vec<User>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected_index: usize,
    pub rows_per_page: usize,
    pub input_mode: InputMode,
    pub modal: Option<ModalState>,
    pub theme: Theme,
    pub keymap: keymap::Keymap,
    pub api_url: String,
    /// Bumped every time a form is opened, so a save can be matched to its form.
    form_serial: u64,
    /// Serial of the form whose save is in flight.
    saving: Option<u64>,
}

impl AppState {
    /// Fresh state in the loading phase; nothing has been fetched yet.
    pub fn new(theme: Theme, keymap: keymap::Keymap, api_url: impl Into<String>) -> Self {
        Self {
            users: Vec::new(),
            loading: true,
            error: None,
            selected_index: 0,
            rows_per_page: 10,
            input_mode: InputMode::Normal,
            modal: None,
            theme,
            keymap,
            api_url: api_url.into(),
            form_serial: 0,
            saving: None,
        }
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.users.get(self.selected_index)
    }

    /// The form currently on screen, if any.
    pub fn form(&self) -> Option<&UserForm> {
        match &self.modal {
            Some(ModalState::Form(form)) => Some(form),
            _ => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut UserForm> {
        match &mut self.modal {
            Some(ModalState::Form(form)) => Some(form),
            _ => None,
        }
    }

    /// A create or update call is in flight.
    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }

    /// Enter the loading state and ask for the full collection.
    pub fn begin_load(&mut self) -> Request {
        self.loading = true;
        Request::LoadUsers
    }

    /// Fold a finished request into the state. May ask for a follow-up reload.
    pub fn apply(&mut self, outcome: Outcome) -> Option<Request> {
        match outcome {
            Outcome::UsersLoaded(Ok(users)) => {
                self.users = users;
                self.error = None;
                self.loading = false;
                self.clamp_selection();
                None
            }
            Outcome::UsersLoaded(Err(e)) => {
                warn!(error = %e, "loading users failed");
                self.error = Some(LOAD_FAILED.to_string());
                self.loading = false;
                None
            }
            Outcome::UserSaved(Ok(user)) => {
                tracing::info!(id = %user.id, "user saved");
                self.finish_save();
                Some(self.begin_load())
            }
            Outcome::UserSaved(Err(e)) => {
                warn!(error = %e, "saving user failed");
                self.error = Some(SAVE_FAILED.to_string());
                self.finish_save();
                None
            }
            Outcome::UserDeleted(Ok(())) => Some(self.begin_load()),
            Outcome::UserDeleted(Err(e)) => {
                warn!(error = %e, "deleting user failed");
                self.error = Some(DELETE_FAILED.to_string());
                None
            }
        }
    }

    pub fn open_create(&mut self) {
        self.open_form(UserForm::new(None));
    }

    /// Open the form seeded with the selected row. No-op on an empty list.
    pub fn open_edit(&mut self) {
        if let Some(user) = self.selected_user().cloned() {
            self.open_form(UserForm::new(Some(user)));
        }
    }

    /// Ask for confirmation before deleting the selected row.
    pub fn request_delete(&mut self) {
        if let Some(user) = self.selected_user() {
            let modal = ModalState::DeleteConfirm {
                user_id: user.id.clone(),
                name: format!("{} {}", user.first_name, user.last_name),
                selected: 1,
            };
            self.open_modal(modal);
        }
    }

    /// Close the confirmation dialog and hand back the delete call.
    pub fn confirm_delete(&mut self) -> Option<Request> {
        match self.modal.take() {
            Some(ModalState::DeleteConfirm { user_id, .. }) => {
                self.input_mode = InputMode::Normal;
                Some(Request::DeleteUser { id: user_id })
            }
            other => {
                self.modal = other;
                None
            }
        }
    }

    /// Validate the open form; on success produce the create or update call.
    ///
    /// The form stays open until the save outcome arrives, and no second save
    /// is issued while one is in flight.
    pub fn submit_form(&mut self) -> Option<Request> {
        if self.saving.is_some() {
            return None;
        }
        let serial = self.form_serial;
        let form = self.form_mut()?;
        let payload = form.submit()?;
        let req = match form.seed() {
            Some(existing) => Request::UpdateUser {
                id: existing.id.clone(),
                patch: payload.into(),
            },
            None => Request::CreateUser(payload),
        };
        self.saving = Some(serial);
        Some(req)
    }

    /// Discard the draft without contacting the API.
    pub fn cancel_form(&mut self) {
        if self.form().is_some() {
            self.close_modal();
        }
    }

    pub fn open_help(&mut self) {
        self.open_modal(ModalState::Help);
    }

    pub fn dismiss_modal(&mut self) {
        self.close_modal();
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.users.is_empty() {
            self.selected_index = 0;
            return;
        }
        let last = self.users.len() - 1;
        let next = self.selected_index as isize + delta;
        self.selected_index = next.clamp(0, last as isize) as usize;
    }

    fn clamp_selection(&mut self) {
        if self.selected_index >= self.users.len() {
            self.selected_index = self.users.len().saturating_sub(1);
        }
    }

    fn open_form(&mut self, form: UserForm) {
        self.form_serial = self.form_serial.wrapping_add(1);
        self.open_modal(ModalState::Form(form));
    }

    /// Close the form that issued the finished save, if it is still on screen.
    fn finish_save(&mut self) {
        let Some(serial) = self.saving.take() else {
            return;
        };
        if self.form().is_some() && self.form_serial == serial {
            self.close_modal();
        }
    }

    fn open_modal(&mut self, modal: ModalState) {
        self.modal = Some(modal);
        self.input_mode = InputMode::Modal;
    }

    fn close_modal(&mut self) {
        self.modal = None;
        self.input_mode = InputMode::Normal;
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
