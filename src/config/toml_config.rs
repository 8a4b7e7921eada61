use crate::adapters::vision::BackendConfig;
use crate::core::engine::{GameRules, DEFAULT_HAND_SIZE, DEFAULT_MAX_ROUNDS, DEFAULT_SCORE_TO_WIN};
use crate::utils::error::{DixitError, Result};
use crate::utils::validation::{validate_path, validate_unique_names, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CACHE_PATH: &str = "image_analysis_cache.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub game: GameSection,
    pub cache: Option<CacheConfig>,
    pub evaluator: Option<EvaluatorConfig>,
    pub round_log: Option<RoundLogConfig>,
    #[serde(default)]
    pub players: Vec<PlayerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSection {
    pub image_directory: String,
    pub max_rounds: Option<usize>,
    pub score_to_win: Option<u32>,
    pub hand_size: Option<usize>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub path: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    pub call_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundLogConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: Option<String>,
    #[serde(flatten)]
    pub backend: BackendConfig,
}

impl GameConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DixitError::ConfigParse {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPENAI_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DixitError::ConfigParse {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("game.image_directory", &self.game.image_directory)?;
        self.rules().validate()?;

        if self.players.len() < 2 {
            return Err(DixitError::invalid_config(
                "players",
                self.players.len(),
                "At least two players are required",
            ));
        }

        let names: Vec<String> = (0..self.players.len()).map(|i| self.player_name(i)).collect();
        validate_unique_names(names.iter().map(String::as_str))?;

        for player in &self.players {
            player.backend.validate()?;
        }

        if self.cache_enabled() {
            validate_path("cache.path", self.cache_path())?;
        }
        if let Some(log) = &self.round_log {
            validate_path("round_log.path", &log.path)?;
        }

        Ok(())
    }

    pub fn rules(&self) -> GameRules {
        GameRules {
            max_rounds: self.game.max_rounds.unwrap_or(DEFAULT_MAX_ROUNDS),
            score_to_win: self.game.score_to_win.unwrap_or(DEFAULT_SCORE_TO_WIN),
            hand_size: self.game.hand_size.unwrap_or(DEFAULT_HAND_SIZE),
            seed: self.game.seed,
        }
    }

    /// 未命名的玩家依座位取名 AI_Player_1、AI_Player_2 ...
    pub fn player_name(&self, index: usize) -> String {
        self.players
            .get(index)
            .and_then(|player| player.name.clone())
            .unwrap_or_else(|| format!("AI_Player_{}", index + 1))
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache
            .as_ref()
            .and_then(|cache| cache.enabled)
            .unwrap_or(true)
    }

    pub fn cache_path(&self) -> &str {
        self.cache
            .as_ref()
            .and_then(|cache| cache.path.as_deref())
            .unwrap_or(DEFAULT_CACHE_PATH)
    }

    pub fn call_delay(&self) -> Duration {
        Duration::from_millis(
            self.evaluator
                .as_ref()
                .and_then(|evaluator| evaluator.call_delay_ms)
                .unwrap_or(0),
        )
    }

    pub fn round_log_path(&self) -> Option<&str> {
        self.round_log.as_ref().map(|log| log.path.as_str())
    }
}

impl Validate for GameConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
