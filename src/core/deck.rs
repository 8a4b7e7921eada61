use crate::domain::model::Card;
use crate::utils::error::{DixitError, Result};
use rand::seq::SliceRandom;
use rand::Rng;

/// 牌堆：洗牌後從尾端抽牌
#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn shuffled<R: Rng + ?Sized>(mut cards: Vec<Card>, rng: &mut R) -> Self {
        cards.shuffle(rng);
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Deal exactly `count` cards or none at all.
    pub fn deal(&mut self, count: usize) -> Result<Vec<Card>> {
        if self.cards.len() < count {
            return Err(DixitError::DeckExhausted {
                needed: count,
                available: self.cards.len(),
            });
        }
        let split_at = self.cards.len() - count;
        let mut dealt = self.cards.split_off(split_at);
        // Keep pop order: the last card of the deck is dealt first.
        dealt.reverse();
        Ok(dealt)
    }

    /// 牌堆用完時把棄牌堆洗回牌堆
    pub fn recycle<R: Rng + ?Sized>(&mut self, discard: &mut DiscardPile, rng: &mut R) {
        let mut recycled = discard.take_all();
        recycled.shuffle(rng);
        self.cards.extend(recycled);
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiscardPile {
    cards: Vec<Card>,
}

impl DiscardPile {
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    fn take_all(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards)
    }
}
