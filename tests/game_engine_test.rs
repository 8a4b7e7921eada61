use async_trait::async_trait;
use dixit_sim::adapters::round_log::MemoryRoundLog;
use dixit_sim::core::agent::select_best;
use dixit_sim::domain::model::{Card, RoundRecord, Selection};
use dixit_sim::domain::ports::Agent;
use dixit_sim::{DixitError, GameEngine, GameRules, Result, Seat};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Clue is the card's file name, so rating against the clue is exact.
fn clue_for(card: &Card) -> String {
    card.to_string()
}

/// Scores are a fixed function of (taste, clue, card), with the clue's own
/// card always rated highest.
struct TastefulAgent {
    taste: u64,
}

impl TastefulAgent {
    fn rate(&self, clue: &str, card: &Card) -> f64 {
        if clue_for(card) == clue {
            return 10.0;
        }
        let mut hasher = DefaultHasher::new();
        (self.taste, clue, card.to_string()).hash(&mut hasher);
        (hasher.finish() % 10) as f64
    }
}

#[async_trait]
impl Agent for TastefulAgent {
    async fn generate_clue(&self, card: &Card) -> Result<String> {
        Ok(clue_for(card))
    }

    async fn rate_and_select(&self, clue: &str, candidates: &[Card]) -> Result<Selection> {
        let scores: Vec<f64> = candidates.iter().map(|card| self.rate(clue, card)).collect();
        let index = select_best(&scores).unwrap_or(0);
        Ok(Selection { index, scores })
    }
}

/// Prefers anything except the card the clue describes.
struct ContrarianAgent;

#[async_trait]
impl Agent for ContrarianAgent {
    async fn generate_clue(&self, card: &Card) -> Result<String> {
        Ok(clue_for(card))
    }

    async fn rate_and_select(&self, clue: &str, candidates: &[Card]) -> Result<Selection> {
        let scores: Vec<f64> = candidates
            .iter()
            .map(|card| if clue_for(card) == clue { 0.0 } else { 10.0 })
            .collect();
        let index = select_best(&scores).unwrap_or(0);
        Ok(Selection { index, scores })
    }
}

/// Plays normally but cannot tell stories.
struct MuteAgent;

#[async_trait]
impl Agent for MuteAgent {
    async fn generate_clue(&self, _card: &Card) -> Result<String> {
        Err(DixitError::unavailable("mock", "connection refused"))
    }

    async fn rate_and_select(&self, _clue: &str, candidates: &[Card]) -> Result<Selection> {
        Ok(Selection {
            index: 0,
            scores: vec![5.0; candidates.len()],
        })
    }
}

fn cards(count: usize) -> Vec<Card> {
    (0..count)
        .map(|i| Card::new(format!("data/original/card_{:03}.jpg", i)))
        .collect()
}

fn tasteful_seats(count: usize) -> Vec<Seat> {
    (0..count)
        .map(|i| {
            let agent: Arc<dyn Agent> = Arc::new(TastefulAgent { taste: i as u64 });
            Seat::new(format!("AI_Player_{}", i + 1), agent)
        })
        .collect()
}

fn rules(max_rounds: usize, seed: u64) -> GameRules {
    GameRules {
        max_rounds,
        score_to_win: 1000,
        hand_size: 6,
        seed: Some(seed),
    }
}

async fn play(seed: u64) -> (Vec<RoundRecord>, dixit_sim::domain::model::GameOutcome) {
    let mut engine = GameEngine::new(rules(8, seed), tasteful_seats(4), cards(40)).unwrap();
    let mut log = MemoryRoundLog::new();
    let outcome = engine.run(&mut log).await.unwrap();
    (log.rounds, outcome)
}

#[tokio::test]
async fn test_same_seed_replays_identically() {
    let (first_rounds, first_outcome) = play(2024).await;
    let (second_rounds, second_outcome) = play(2024).await;

    assert_eq!(first_rounds.len(), 8);
    assert_eq!(first_rounds, second_rounds);
    assert_eq!(first_outcome, second_outcome);
    assert_eq!(first_outcome.seed, 2024);
}

#[tokio::test]
async fn test_different_seeds_deal_differently() {
    let (first_rounds, _) = play(1).await;
    let (second_rounds, _) = play(2).await;

    let first_cards: Vec<&String> = first_rounds.iter().map(|r| &r.storyteller_card).collect();
    let second_cards: Vec<&String> = second_rounds.iter().map(|r| &r.storyteller_card).collect();
    assert_ne!(first_cards, second_cards);
}

#[tokio::test]
async fn test_round_records_are_consistent() {
    let (rounds, outcome) = play(77).await;

    let mut previous_totals = vec![0u32; 4];
    for (i, record) in rounds.iter().enumerate() {
        assert_eq!(record.round, i + 1);
        assert_eq!(record.storyteller, format!("AI_Player_{}", i % 4 + 1));
        assert_eq!(record.pool.len(), 4);
        assert_eq!(record.votes.len(), 3);
        assert!(record.pool.contains(&record.storyteller_card));
        assert!(record.votes.iter().all(|vote| vote.player != record.storyteller));

        let found = record
            .votes
            .iter()
            .filter(|vote| vote.card == record.storyteller_card)
            .count();
        assert_eq!(found, record.storyteller_votes);

        // Every seat's total moves by exactly its delta and never shrinks.
        for (seat, (total, delta)) in record.totals.iter().zip(&record.deltas).enumerate() {
            assert_eq!(total.points, previous_totals[seat] + delta.points);
            previous_totals[seat] = total.points;
        }
    }

    let best = previous_totals.iter().copied().max().unwrap();
    assert_eq!(outcome.winning_score, best);
}

#[tokio::test]
async fn test_two_of_three_voters_find_the_card() {
    let seats = vec![
        Seat::new("P1", Arc::new(TastefulAgent { taste: 1 }) as Arc<dyn Agent>),
        Seat::new("P2", Arc::new(TastefulAgent { taste: 2 }) as Arc<dyn Agent>),
        Seat::new("P3", Arc::new(TastefulAgent { taste: 3 }) as Arc<dyn Agent>),
        Seat::new("P4", Arc::new(ContrarianAgent) as Arc<dyn Agent>),
    ];
    let mut engine = GameEngine::new(rules(1, 9), seats, cards(40)).unwrap();

    let record = engine.play_round().await.unwrap();

    assert_eq!(record.storyteller, "P1");
    assert_eq!(record.storyteller_votes, 2);

    let contrarian_vote = record.votes.iter().find(|vote| vote.player == "P4").unwrap();
    assert_ne!(contrarian_vote.card, record.storyteller_card);

    let points = |name: &str| {
        record
            .deltas
            .iter()
            .find(|line| line.player == name)
            .map(|line| line.points)
            .unwrap()
    };
    assert_eq!(points("P1"), 3);
    assert_eq!(points("P4"), 0);
    for finder in ["P2", "P3"] {
        let bonus = u32::from(contrarian_vote.card_owner == finder);
        assert_eq!(points(finder), 3 + bonus);
    }
}

#[tokio::test]
async fn test_nobody_finds_the_card() {
    let seats = vec![
        Seat::new("Teller", Arc::new(TastefulAgent { taste: 0 }) as Arc<dyn Agent>),
        Seat::new("A", Arc::new(ContrarianAgent) as Arc<dyn Agent>),
        Seat::new("B", Arc::new(ContrarianAgent) as Arc<dyn Agent>),
    ];
    let mut engine = GameEngine::new(rules(1, 5), seats, cards(30)).unwrap();

    let record = engine.play_round().await.unwrap();

    assert_eq!(record.storyteller_votes, 0);
    assert_eq!(record.deltas[0].points, 0);
    // Each guesser gets 2, plus 1 if the other guesser voted for their card.
    let guesser_points: u32 = record.deltas[1..].iter().map(|line| line.points).sum();
    let cross_votes = record
        .votes
        .iter()
        .filter(|vote| vote.card_owner != vote.player && vote.card_owner != "Teller")
        .count() as u32;
    assert_eq!(guesser_points, 4 + cross_votes);
}

#[tokio::test]
async fn test_failure_keeps_completed_rounds() {
    let seats = vec![
        Seat::new("P1", Arc::new(TastefulAgent { taste: 1 }) as Arc<dyn Agent>),
        Seat::new("P2", Arc::new(TastefulAgent { taste: 2 }) as Arc<dyn Agent>),
        Seat::new("P3", Arc::new(MuteAgent) as Arc<dyn Agent>),
    ];
    let mut engine = GameEngine::new(rules(10, 3), seats, cards(30)).unwrap();
    let mut log = MemoryRoundLog::new();

    let err = engine.run(&mut log).await.unwrap_err();

    assert!(matches!(err, DixitError::EvaluatorUnavailable { .. }));
    assert_eq!(log.rounds.len(), 2);
    assert_eq!(engine.rounds_played(), 2);
}

#[tokio::test]
async fn test_long_game_conserves_cards() {
    // 3 players * 6 cards leaves only 2 in the deck, so refills reshuffle the discard pile.
    let mut engine = GameEngine::new(rules(12, 11), tasteful_seats(3), cards(20)).unwrap();
    let mut log = MemoryRoundLog::new();

    let outcome = engine.run(&mut log).await.unwrap();

    assert_eq!(outcome.rounds_played, 12);
    assert_eq!(engine.card_census().len(), 20);
    assert!(engine.players().iter().all(|player| player.hand.len() == 6));
}
