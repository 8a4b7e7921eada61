pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::{GameSession, SessionReport};
pub use config::GameConfig;
pub use crate::core::engine::{GameEngine, GameRules, Phase, Seat};
pub use utils::error::{DixitError, Result};
