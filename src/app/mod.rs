// Application layer: wires configuration, adapters and the engine into a runnable game.

pub mod game_session;

pub use game_session::{GameSession, SessionReport};
