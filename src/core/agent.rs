use crate::domain::model::{Card, Selection};
use crate::domain::ports::{Agent, Evaluator};
use crate::utils::error::{DixitError, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub const CLUE_PROMPT: &str =
    "Generate a creative, metaphorical clue for this Dixit card that is neither too obvious nor too obscure.";

pub fn rating_prompt(clue: &str) -> String {
    format!(
        "Rate how well this image matches the clue '{}' on a scale of 0-10.",
        clue
    )
}

/// 解析評分。無法解析（或非有限值）時回傳 None，呼叫端以 0 分計。
pub fn parse_score(response: &str) -> Option<f64> {
    response
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|score| score.is_finite())
}

/// Index of the highest score; the first one wins a tie.
pub fn select_best(scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, score) in scores.iter().enumerate() {
        match best {
            Some(current) if scores[current] >= *score => {}
            _ => best = Some(index),
        }
    }
    best
}

/// Agent that asks a vision evaluator for clues and ratings.
pub struct VisionAgent {
    evaluator: Arc<dyn Evaluator>,
}

impl VisionAgent {
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        Self { evaluator }
    }
}

#[async_trait]
impl Agent for VisionAgent {
    async fn generate_clue(&self, card: &Card) -> Result<String> {
        let response = self.evaluator.analyze(card, CLUE_PROMPT).await?;
        let clue = response.trim();
        if clue.is_empty() {
            return Err(DixitError::malformed(
                self.evaluator.model(),
                format!("empty clue for {}", card),
            ));
        }
        Ok(clue.to_string())
    }

    async fn rate_and_select(&self, clue: &str, candidates: &[Card]) -> Result<Selection> {
        let prompt = rating_prompt(clue);
        let mut scores = Vec::with_capacity(candidates.len());

        for card in candidates {
            let response = self.evaluator.analyze(card, &prompt).await?;
            let score = parse_score(&response).unwrap_or_else(|| {
                tracing::warn!(
                    "⚠️ Could not parse score {:?} for {} ({}), counting it as 0",
                    response,
                    card,
                    self.evaluator.model()
                );
                0.0
            });
            scores.push(score);
        }

        let index = select_best(&scores).ok_or_else(|| {
            DixitError::invalid_config("candidates", 0, "Cannot select from an empty set of cards")
        })?;
        Ok(Selection { index, scores })
    }
}
