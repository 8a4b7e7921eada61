use crate::domain::model::{CacheKey, Card, ImagePayload, RoundRecord, Selection};
use crate::utils::error::Result;
use async_trait::async_trait;

/// An external image-understanding service: image plus instruction in, text out.
///
/// Implementations may fail with `EvaluatorUnavailable` or `EvaluatorRateLimited`;
/// nothing above this trait retries.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Backend family, used in errors and logs.
    fn name(&self) -> &str;
    /// Model identifier; part of every cache key.
    fn model(&self) -> &str;
    async fn analyze(&self, image: &ImagePayload, prompt: &str) -> Result<String>;
}

/// Uniform evaluation contract consulted by agents.
#[async_trait]
pub trait Evaluator: Send + Sync {
    fn model(&self) -> &str;
    async fn analyze(&self, card: &Card, prompt: &str) -> Result<String>;
}

/// A player policy. Storytellers call `generate_clue`, everyone else
/// `rate_and_select` (once to play a card, once to vote).
#[async_trait]
pub trait Agent: Send + Sync {
    async fn generate_clue(&self, card: &Card) -> Result<String>;

    /// Pick the candidate that best matches `clue`. Ties go to the first
    /// candidate with the top score.
    async fn rate_and_select(&self, clue: &str, candidates: &[Card]) -> Result<Selection>;
}

/// Durable memoization of evaluator responses. Safe to share across tasks.
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Result<Option<String>>;
    /// Last write wins.
    fn put(&self, key: &CacheKey, response: &str) -> Result<()>;
}

pub trait DeckSource {
    /// Cards in a stable order; the engine shuffles.
    fn load(&self) -> Result<Vec<Card>>;
}

pub trait RoundSink {
    fn record(&mut self, round: &RoundRecord) -> Result<()>;
}
