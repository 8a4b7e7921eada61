pub mod agent;
pub mod deck;
pub mod engine;
pub mod evaluator;
pub mod scoring;

pub use crate::domain::model::{Card, GameOutcome, Player, PlayerId, RoundRecord, Selection};
pub use crate::domain::ports::{Agent, DeckSource, Evaluator, ResponseCache, RoundSink, VisionBackend};
pub use crate::utils::error::Result;
