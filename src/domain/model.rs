use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// 一張牌，對應一個圖片檔案。建立後不可變。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    path: PathBuf,
}

impl Card {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 依副檔名推斷圖片的 media type
    pub fn media_type(&self) -> &'static str {
        match self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            _ => "image/jpeg",
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// 傳給視覺後端的圖片內容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub base64: String,
    pub media_type: &'static str,
}

impl ImagePayload {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.base64)
    }
}

/// Composite cache key: model, content digest of the image bytes, prompt text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub model: String,
    pub image_hash: String,
    pub prompt: String,
}

impl CacheKey {
    pub fn new(model: impl Into<String>, image_hash: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            image_hash: image_hash.into(),
            prompt: prompt.into(),
        }
    }
}

/// Position of a player in the seating order. Identity never depends on names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub usize);

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,
    pub score: u32,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            hand: Vec::new(),
            score: 0,
        }
    }
}

/// Result of rating a candidate set against a clue.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Index into the candidate slice that was rated.
    pub index: usize,
    /// One parsed score per candidate, in candidate order.
    pub scores: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardScore {
    pub card: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayRecord {
    pub player: String,
    pub card: String,
    /// 說書人沒有評分過程，此欄位為空
    pub scores: Vec<CardScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub player: String,
    pub card: String,
    pub card_owner: String,
    pub scores: Vec<CardScore>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub player: String,
    pub points: u32,
}

/// 每回合交給 RoundSink 的結構化紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: usize,
    pub storyteller: String,
    pub clue: String,
    pub storyteller_card: String,
    pub plays: Vec<PlayRecord>,
    /// Pool order exactly as shown to voters.
    pub pool: Vec<String>,
    pub votes: Vec<VoteRecord>,
    pub storyteller_votes: usize,
    pub deltas: Vec<ScoreLine>,
    pub totals: Vec<ScoreLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub winner: String,
    pub winning_score: u32,
    pub rounds_played: usize,
    pub seed: u64,
    pub final_scores: Vec<ScoreLine>,
}
