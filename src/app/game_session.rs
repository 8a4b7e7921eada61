use crate::adapters::cache::{MemoryResponseCache, SqliteResponseCache};
use crate::adapters::deck_source::ImageDirectory;
use crate::adapters::round_log::{JsonLinesRoundLog, MemoryRoundLog};
use crate::adapters::vision::create_backend;
use crate::config::GameConfig;
use crate::core::agent::VisionAgent;
use crate::core::engine::{GameEngine, Seat};
use crate::core::evaluator::{CacheStats, CachedEvaluator};
use crate::domain::model::{Card, GameOutcome};
use crate::domain::ports::{DeckSource, Evaluator, ResponseCache};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub outcome: GameOutcome,
    pub cache: CacheStats,
}

/// 依配置建立快取、後端與玩家，並執行一場遊戲
pub struct GameSession {
    config: GameConfig,
    evaluators: Vec<Arc<CachedEvaluator>>,
}

impl GameSession {
    pub fn from_config(config: GameConfig) -> Result<Self> {
        config.validate()?;

        let cache: Arc<dyn ResponseCache> = if config.cache_enabled() {
            tracing::info!("💾 Using response cache at {}", config.cache_path());
            Arc::new(SqliteResponseCache::open(config.cache_path())?)
        } else {
            tracing::info!("💾 Persistent cache disabled, responses kept in memory");
            Arc::new(MemoryResponseCache::new())
        };

        let mut evaluators = Vec::with_capacity(config.players.len());
        for player in &config.players {
            let backend = create_backend(&player.backend)?;
            let evaluator = CachedEvaluator::new(backend, Arc::clone(&cache))
                .with_call_delay(config.call_delay());
            evaluators.push(Arc::new(evaluator));
        }

        Ok(Self { config, evaluators })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn load_deck(&self) -> Result<Vec<Card>> {
        ImageDirectory::new(&self.config.game.image_directory).load()
    }

    pub fn build_engine(&self) -> Result<GameEngine> {
        let seats = self
            .evaluators
            .iter()
            .enumerate()
            .map(|(index, evaluator)| {
                let evaluator: Arc<dyn Evaluator> = evaluator.clone();
                let agent = VisionAgent::new(evaluator);
                Seat::new(self.config.player_name(index), Arc::new(agent))
            })
            .collect();

        GameEngine::new(self.config.rules(), seats, self.load_deck()?)
    }

    pub async fn run(&self) -> Result<SessionReport> {
        let mut engine = self.build_engine()?;

        let outcome = match self.config.round_log_path() {
            Some(path) => {
                let mut log = JsonLinesRoundLog::create(path)?;
                tracing::info!("📝 Writing round log to {}", log.path().display());
                engine.run(&mut log).await?
            }
            None => engine.run(&mut MemoryRoundLog::new()).await?,
        };

        let cache = self.cache_stats();
        tracing::info!("💾 Cache hits: {}, misses: {}", cache.hits, cache.misses);
        Ok(SessionReport { outcome, cache })
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.evaluators
            .iter()
            .map(|evaluator| evaluator.stats())
            .fold(CacheStats::default(), |total, stats| CacheStats {
                hits: total.hits + stats.hits,
                misses: total.misses + stats.misses,
            })
    }
}
