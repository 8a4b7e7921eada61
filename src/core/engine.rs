use crate::core::deck::{Deck, DiscardPile};
use crate::core::scoring::{self, Ballot};
use crate::domain::model::{
    Card, CardScore, GameOutcome, PlayRecord, Player, PlayerId, RoundRecord, ScoreLine, Selection,
    VoteRecord,
};
use crate::domain::ports::{Agent, RoundSink};
use crate::utils::error::{DixitError, Result};
use crate::utils::validation::{validate_positive_number, validate_unique_names, Validate};
use futures_util::future::try_join_all;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_HAND_SIZE: usize = 6;
pub const DEFAULT_MAX_ROUNDS: usize = 10;
pub const DEFAULT_SCORE_TO_WIN: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRules {
    pub max_rounds: usize,
    pub score_to_win: u32,
    pub hand_size: usize,
    /// Fixed seed for replay; a random one is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            score_to_win: DEFAULT_SCORE_TO_WIN,
            hand_size: DEFAULT_HAND_SIZE,
            seed: None,
        }
    }
}

impl Validate for GameRules {
    fn validate(&self) -> Result<()> {
        validate_positive_number("game.max_rounds", self.max_rounds, 1)?;
        validate_positive_number("game.score_to_win", self.score_to_win as usize, 1)?;
        validate_positive_number("game.hand_size", self.hand_size, 1)?;
        Ok(())
    }
}

/// A named player bound to the policy that plays for them.
pub struct Seat {
    pub name: String,
    pub agent: Arc<dyn Agent>,
}

impl Seat {
    pub fn new(name: impl Into<String>, agent: Arc<dyn Agent>) -> Self {
        Self {
            name: name.into(),
            agent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    RoundStart,
    ClueGiven,
    CardsPlayed,
    Voted,
    Scored,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Setup => "setup",
            Self::RoundStart => "round-start",
            Self::ClueGiven => "clue-given",
            Self::CardsPlayed => "cards-played",
            Self::Voted => "voted",
            Self::Scored => "scored",
            Self::GameOver => "game-over",
        };
        f.write_str(name)
    }
}

/// A card in the voting pool together with the player who played it.
#[derive(Debug, Clone)]
struct PoolSlot {
    owner: PlayerId,
    card: Card,
}

/// 回合狀態機：出題、出牌、投票、計分
pub struct GameEngine {
    rules: GameRules,
    players: Vec<Player>,
    agents: Vec<Arc<dyn Agent>>,
    deck: Deck,
    discard: DiscardPile,
    rng: StdRng,
    seed: u64,
    rounds_played: usize,
    phase: Phase,
}

impl GameEngine {
    /// 驗證設定、洗牌並替每位玩家發牌
    pub fn new(rules: GameRules, seats: Vec<Seat>, cards: Vec<Card>) -> Result<Self> {
        rules.validate()?;
        if seats.len() < 2 {
            return Err(DixitError::invalid_config(
                "players",
                seats.len(),
                "At least two players are required",
            ));
        }
        validate_unique_names(seats.iter().map(|seat| seat.name.as_str()))?;

        let needed = seats.len() * rules.hand_size;
        if cards.len() < needed {
            return Err(DixitError::DeckExhausted {
                needed,
                available: cards.len(),
            });
        }

        let seed = rules.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut deck = Deck::shuffled(cards, &mut rng);

        let mut players = Vec::with_capacity(seats.len());
        let mut agents = Vec::with_capacity(seats.len());
        for (index, seat) in seats.into_iter().enumerate() {
            let mut player = Player::new(PlayerId(index), seat.name);
            player.hand = deck.deal(rules.hand_size)?;
            players.push(player);
            agents.push(seat.agent);
        }

        tracing::info!(
            "🃏 Dealt {} cards to {} players, {} left in the deck (seed {})",
            rules.hand_size,
            players.len(),
            deck.len(),
            seed
        );

        Ok(Self {
            rules,
            players,
            agents,
            deck,
            discard: DiscardPile::default(),
            rng,
            seed,
            rounds_played: 0,
            phase: Phase::Setup,
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rounds_played(&self) -> usize {
        self.rounds_played
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn discard_pile(&self) -> &DiscardPile {
        &self.discard
    }

    /// Every card the game owns: deck, then hands in seat order, then discards.
    pub fn card_census(&self) -> Vec<&Card> {
        self.deck
            .cards()
            .iter()
            .chain(self.players.iter().flat_map(|p| p.hand.iter()))
            .chain(self.discard.cards().iter())
            .collect()
    }

    /// Checked before each round, so the round that crosses the threshold is
    /// still scored.
    pub fn is_over(&self) -> bool {
        self.rounds_played >= self.rules.max_rounds
            || self
                .players
                .iter()
                .all(|player| player.score >= self.rules.score_to_win)
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!("Round {}: {} -> {}", self.rounds_played + 1, self.phase, phase);
        self.phase = phase;
    }

    /// Play one full round and return its record.
    pub async fn play_round(&mut self) -> Result<RoundRecord> {
        let round = self.rounds_played + 1;
        self.enter(Phase::RoundStart);

        let storyteller = PlayerId(self.rounds_played % self.players.len());
        let storyteller_index = self.rng.gen_range(0..self.players[storyteller.0].hand.len());
        let storyteller_card = self.players[storyteller.0].hand[storyteller_index].clone();

        let clue = self.agents[storyteller.0]
            .generate_clue(&storyteller_card)
            .await?;
        self.enter(Phase::ClueGiven);
        tracing::info!(
            "📖 Round {}: {} (Storyteller) gives clue: {}",
            round,
            self.players[storyteller.0].name,
            clue
        );

        let guessers: Vec<PlayerId> = self
            .players
            .iter()
            .map(|player| player.id)
            .filter(|id| *id != storyteller)
            .collect();

        let plays = {
            let agents = &self.agents;
            let players = &self.players;
            let clue = clue.as_str();
            try_join_all(guessers.iter().map(|id| {
                let hand = players[id.0].hand.as_slice();
                async move {
                    let selection = agents[id.0].rate_and_select(clue, hand).await?;
                    check_selection(&players[id.0].name, &selection, hand.len())?;
                    Ok::<_, DixitError>(selection)
                }
            }))
            .await?
        };
        self.enter(Phase::CardsPlayed);

        // Hand index of the card each player put down, indexed by seat.
        let mut played_index = vec![0usize; self.players.len()];
        played_index[storyteller.0] = storyteller_index;
        for (id, selection) in guessers.iter().zip(&plays) {
            played_index[id.0] = selection.index;
        }

        let mut pool: Vec<PoolSlot> = self
            .players
            .iter()
            .map(|player| PoolSlot {
                owner: player.id,
                card: player.hand[played_index[player.id.0]].clone(),
            })
            .collect();
        pool.shuffle(&mut self.rng);
        let pool_cards: Vec<Card> = pool.iter().map(|slot| slot.card.clone()).collect();

        let votes = {
            let agents = &self.agents;
            let players = &self.players;
            let clue = clue.as_str();
            let pool_cards = pool_cards.as_slice();
            try_join_all(guessers.iter().map(|id| async move {
                let selection = agents[id.0].rate_and_select(clue, pool_cards).await?;
                check_selection(&players[id.0].name, &selection, pool_cards.len())?;
                Ok::<_, DixitError>(selection)
            }))
            .await?
        };
        self.enter(Phase::Voted);

        let ballots: Vec<Ballot> = guessers
            .iter()
            .zip(&votes)
            .map(|(id, selection)| Ballot {
                voter: *id,
                owner: pool[selection.index].owner,
            })
            .collect();

        let result = scoring::score_round(self.players.len(), storyteller, &ballots);
        for (player, delta) in self.players.iter_mut().zip(&result.deltas) {
            player.score += delta;
        }
        self.enter(Phase::Scored);

        tracing::info!(
            "🗳️ Round {}: {} of {} voters found the storyteller's card",
            round,
            result.storyteller_votes,
            guessers.len()
        );
        for player in &self.players {
            tracing::info!("   {}: {}", player.name, player.score);
        }

        let record = RoundRecord {
            round,
            storyteller: self.players[storyteller.0].name.clone(),
            clue,
            storyteller_card: storyteller_card.to_string(),
            plays: self
                .players
                .iter()
                .map(|player| {
                    let scores = guessers
                        .iter()
                        .position(|id| *id == player.id)
                        .map(|i| card_scores(&player.hand, &plays[i].scores))
                        .unwrap_or_default();
                    PlayRecord {
                        player: player.name.clone(),
                        card: player.hand[played_index[player.id.0]].to_string(),
                        scores,
                    }
                })
                .collect(),
            pool: pool_cards.iter().map(Card::to_string).collect(),
            votes: guessers
                .iter()
                .zip(&votes)
                .map(|(id, selection)| {
                    let slot = &pool[selection.index];
                    VoteRecord {
                        player: self.players[id.0].name.clone(),
                        card: slot.card.to_string(),
                        card_owner: self.players[slot.owner.0].name.clone(),
                        scores: card_scores(&pool_cards, &selection.scores),
                    }
                })
                .collect(),
            storyteller_votes: result.storyteller_votes,
            deltas: self
                .players
                .iter()
                .zip(&result.deltas)
                .map(|(player, delta)| ScoreLine {
                    player: player.name.clone(),
                    points: *delta,
                })
                .collect(),
            totals: self.score_lines(),
        };

        self.discard_and_refill(&played_index);
        self.rounds_played += 1;
        Ok(record)
    }

    /// 出過的牌移到棄牌堆，並補牌到手牌上限
    fn discard_and_refill(&mut self, played_index: &[usize]) {
        for (player, index) in self.players.iter_mut().zip(played_index) {
            let card = player.hand.remove(*index);
            self.discard.push(card);
        }

        for seat in 0..self.players.len() {
            while self.players[seat].hand.len() < self.rules.hand_size {
                if self.deck.is_empty() {
                    if self.discard.is_empty() {
                        break;
                    }
                    tracing::info!("♻️ Deck empty, reshuffling {} discarded cards", self.discard.len());
                    self.deck.recycle(&mut self.discard, &mut self.rng);
                }
                match self.deck.draw() {
                    Some(card) => self.players[seat].hand.push(card),
                    None => break,
                }
            }
        }
    }

    fn score_lines(&self) -> Vec<ScoreLine> {
        self.players
            .iter()
            .map(|player| ScoreLine {
                player: player.name.clone(),
                points: player.score,
            })
            .collect()
    }

    /// 執行整場遊戲，每回合結束後交給 sink
    ///
    /// A fatal error stops the game; rounds already handed to `sink` stay there.
    pub async fn run(&mut self, sink: &mut dyn RoundSink) -> Result<GameOutcome> {
        while !self.is_over() {
            let record = self.play_round().await?;
            sink.record(&record)?;
        }
        self.enter(Phase::GameOver);

        let outcome = self.outcome();
        tracing::info!(
            "🏆 Game Over! Winner: {} with {} points after {} rounds",
            outcome.winner,
            outcome.winning_score,
            outcome.rounds_played
        );
        Ok(outcome)
    }

    pub fn outcome(&self) -> GameOutcome {
        // new() guarantees at least two players.
        let (winner, winning_score) = scoring::winner(&self.players)
            .map(|player| (player.name.clone(), player.score))
            .unwrap_or_default();
        GameOutcome {
            winner,
            winning_score,
            rounds_played: self.rounds_played,
            seed: self.seed,
            final_scores: self.score_lines(),
        }
    }
}

fn check_selection(player: &str, selection: &Selection, candidates: usize) -> Result<()> {
    if selection.index >= candidates {
        return Err(DixitError::malformed(
            player,
            format!(
                "selected card {} out of {} candidates",
                selection.index, candidates
            ),
        ));
    }
    Ok(())
}

fn card_scores(cards: &[Card], scores: &[f64]) -> Vec<CardScore> {
    cards
        .iter()
        .zip(scores)
        .map(|(card, score)| CardScore {
            card: card.to_string(),
            score: *score,
        })
        .collect()
}
