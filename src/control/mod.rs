//! Light and fan control: schedule parsing, window resolution and the
//! per-query actuator decision.

pub mod duration;
pub mod evaluator;
pub mod service;
pub mod window;

pub use evaluator::{evaluate, ControlDecision};
pub use service::{ControlService, SettingsUpdate};
pub use window::{LightWindow, LightWindowResolver, SunsetLookup, WindowError};

use crate::db::StoreError;

/// Malformed user input in a settings update.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid duration {0:?}: expected something like \"1h30m\", \"45m\" or \"90s\"")]
    InvalidDuration(String),

    #[error("invalid start time {0:?}: expected \"HH:MM\" or \"sunset\"")]
    InvalidStartTime(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
