//! users-admin binary entry point.
//!
//! Parses configuration, starts logging and the HTTP runtime, initializes the
//! terminal in raw mode, runs the TUI event loop, and restores the terminal
//! state on exit.
//!
use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::sync::{Mutex, mpsc};
use tracing_subscriber::EnvFilter;

use users_admin::api::UserClient;
use users_admin::app::config::Config;
use users_admin::app::keymap::Keymap;
use users_admin::app::update::Dispatcher;
use users_admin::app::{self, AppState, Theme};

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Send logs to a file; the terminal belongs to the UI.
fn init_tracing(config: &Config) -> Result<()> {
    let path = config.log_path();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(config.log_level().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

/// Program entry point: run the TUI and report any top-level error to stderr.
fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    let client = UserClient::new(&config.api_url)?;
    tracing::info!(api_url = %client.base_url(), "starting users-admin");

    let (tx, rx) = mpsc::channel();
    let dispatcher = Dispatcher::new(client, runtime.handle().clone(), tx);
    let state = AppState::new(
        Theme::load_or_init(&config.theme_path()),
        Keymap::load_or_init(&config.keybinds_path()),
        config.api_url.clone(),
    );

    let mut terminal = init_terminal().context("init terminal")?;

    let res = app::run(&mut terminal, state, dispatcher, rx);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        eprintln!("application error: {err:#}");
    }
    Ok(())
}
