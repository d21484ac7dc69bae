//! Core plugin
//!
//! Owns session-wide failure handling. Systems that hit an unrecoverable
//! error store it in [`FatalError`]; game systems stop running
//! ([`session_running`]) and [`exit_on_fatal`] ends the app with a failure
//! exit code so `main` can report the diagnostic.
//!
//! # Plugin Order
//!
//! Add [`CorePlugin`] before [`crate::game::GamePlugin`], whose systems use
//! [`session_running`] as their run condition.

use super::error::SessionError;
use bevy::prelude::*;
use std::sync::{Arc, Mutex};

/// First unrecoverable error of the session, if any
#[derive(Resource, Debug, Default)]
pub struct FatalError {
    error: Option<SessionError>,
}

impl FatalError {
    /// Keep the first error; later ones are only logged
    pub fn record(&mut self, error: impl Into<SessionError>) {
        let error = error.into();
        if self.error.is_some() {
            warn!("[CORE] Ignoring error after fatal failure: {}", error);
            return;
        }
        error!("[CORE] Fatal: {}", error);
        self.error = Some(error);
    }

    pub fn is_set(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    pub fn take(&mut self) -> Option<SessionError> {
        self.error.take()
    }
}

/// Copy of the fatal diagnostic that outlives the app
///
/// `main` keeps a clone and reads it after `App::run` returns, when the world
/// is no longer reachable.
#[derive(Resource, Debug, Clone, Default)]
pub struct FatalReport(Arc<Mutex<Option<String>>>);

impl FatalReport {
    pub fn message(&self) -> Option<String> {
        self.0.lock().ok().and_then(|message| message.clone())
    }

    fn store(&self, message: String) {
        if let Ok(mut slot) = self.0.lock() {
            slot.get_or_insert(message);
        }
    }
}

/// Run condition for everything that must stop after a fatal error
pub fn session_running(fatal: Res<FatalError>) -> bool {
    !fatal.is_set()
}

/// Keep requesting an error exit while a fatal error is recorded
pub fn exit_on_fatal(
    fatal: Res<FatalError>,
    report: Res<FatalReport>,
    mut exit: MessageWriter<AppExit>,
) {
    if let Some(error) = fatal.error() {
        report.store(error.to_string());
        exit.write(AppExit::error());
    }
}

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FatalError>()
            .init_resource::<FatalReport>()
            .add_systems(Last, exit_on_fatal);
    }
}
