//! Command-line and environment configuration.
//!
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::api::DEFAULT_API_URL;

const APP_DIR: &str = "users-admin";

#[derive(Debug, Clone, Parser)]
#[command(name = "users-admin", version, about = "Manage users of a REST service from the terminal")]
pub struct Config {
    /// Base URL of the users resource
    #[arg(long, env = "USERS_ADMIN_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Theme file (key = #RRGGBB); created with defaults if missing
    #[arg(long, env = "USERS_ADMIN_THEME")]
    pub theme: Option<PathBuf>,

    /// Keybindings file (Action = KeySpec); created with defaults if missing
    #[arg(long, env = "USERS_ADMIN_KEYBINDS")]
    pub keybinds: Option<PathBuf>,

    /// Where to write the log; the terminal itself is owned by the UI
    #[arg(long, env = "USERS_ADMIN_LOG")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    pub fn theme_path(&self) -> String {
        path_or_default(self.theme.as_ref(), "theme.conf")
    }

    pub fn keybinds_path(&self) -> String {
        path_or_default(self.keybinds.as_ref(), "keybinds.conf")
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(format!("{APP_DIR}.log")))
    }

    /// Default filter directive when `RUST_LOG` is not set.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

/// `$XDG_CONFIG_HOME/users-admin`, else `$HOME/.config/users-admin`.
pub fn config_dir() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join(APP_DIR))
}

fn path_or_default(explicit: Option<&PathBuf>, file: &str) -> String {
    let path = match explicit {
        Some(p) => p.clone(),
        None => match config_dir() {
            Some(dir) => {
                if let Err(e) = std::fs::create_dir_all(&dir) {
                    tracing::warn!(dir = %dir.display(), error = %e, "could not create config dir");
                }
                dir.join(file)
            }
            None => PathBuf::from(file),
        },
    };
    path.to_string_lossy().to_string()
}
