use crate::adapters::cache::content_hash;
use crate::domain::model::{CacheKey, Card, ImagePayload};
use crate::domain::ports::{Evaluator, ResponseCache, VisionBackend};
use crate::utils::error::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// 先查快取，未命中才呼叫視覺後端，並把回應寫回快取
pub struct CachedEvaluator {
    backend: Arc<dyn VisionBackend>,
    cache: Arc<dyn ResponseCache>,
    call_delay: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedEvaluator {
    pub fn new(backend: Arc<dyn VisionBackend>, cache: Arc<dyn ResponseCache>) -> Self {
        Self {
            backend,
            cache,
            call_delay: Duration::ZERO,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Pause before every backend call. Cache hits are never delayed.
    pub fn with_call_delay(mut self, call_delay: Duration) -> Self {
        self.call_delay = call_delay;
        self
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl Evaluator for CachedEvaluator {
    fn model(&self) -> &str {
        self.backend.model()
    }

    async fn analyze(&self, card: &Card, prompt: &str) -> Result<String> {
        let bytes = tokio::fs::read(card.path()).await?;
        let key = CacheKey::new(self.backend.model(), content_hash(&bytes), prompt);

        if let Some(response) = self.cache.get(&key)? {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Cache hit for {} ({})", card, self.backend.model());
            return Ok(response);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Cache miss for {} ({}), calling {}", card, self.backend.model(), self.backend.name());

        if !self.call_delay.is_zero() {
            tokio::time::sleep(self.call_delay).await;
        }

        let payload = ImagePayload {
            base64: STANDARD.encode(&bytes),
            media_type: card.media_type(),
        };
        let response = self.backend.analyze(&payload, prompt).await?;

        self.cache.put(&key, &response)?;
        Ok(response)
    }
}
