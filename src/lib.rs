//! Library crate for users-admin.
//!
//! This crate exposes the building blocks of the TUI:
//! - HTTP client and record types for the users resource (`api`)
//! - Application state, form, keymap and update loop (`app`)
//! - Error types for API calls (`error`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `users-admin` binary and by tests.
#![deny(rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod app;
pub mod error;
pub mod ui;

pub use error::{RequestError, RequestResult};
