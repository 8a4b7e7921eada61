// Adapters layer: concrete implementations for external systems
// (response cache, vision backends, deck source, round log).

pub mod cache;
pub mod deck_source;
pub mod round_log;
pub mod vision;
