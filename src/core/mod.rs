//! Core module - settings, command line and session failure handling
//!
//! - [`GameSettings`] - persisted user preferences ([`settings`])
//! - [`Cli`] - command line overrides ([`cli`])
//! - [`CorePlugin`] - [`FatalError`] bookkeeping, error exit and [`FatalReport`]
//! - [`SessionError`] - every subsystem error in one type

pub mod cli;
pub mod error;
pub mod plugin;
pub mod settings;

pub use cli::Cli;
pub use error::{CoreError, CoreResult, SessionError};
pub use plugin::{exit_on_fatal, session_running, CorePlugin, FatalError, FatalReport};
pub use settings::{default_settings_path, load_settings, read_settings, save_settings, GameSettings};
