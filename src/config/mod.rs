pub mod toml_config;

pub use toml_config::GameConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "dixit-sim")]
#[command(about = "Simulate Dixit games between vision-model players")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "dixit.toml")]
    pub config: String,

    /// Override game.max_rounds
    #[arg(long)]
    pub max_rounds: Option<usize>,

    /// Override game.score_to_win
    #[arg(long)]
    pub score_to_win: Option<u32>,

    /// Override game.seed to replay a previous run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Keep evaluator responses in memory only
    #[arg(long)]
    pub no_cache: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    /// Validate configuration and load the deck without calling any backend
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 套用命令列覆蓋設定
    pub fn apply_overrides(&self, config: &mut GameConfig) {
        if let Some(max_rounds) = self.max_rounds {
            config.game.max_rounds = Some(max_rounds);
            tracing::info!("🔧 max_rounds overridden to: {}", max_rounds);
        }
        if let Some(score_to_win) = self.score_to_win {
            config.game.score_to_win = Some(score_to_win);
            tracing::info!("🔧 score_to_win overridden to: {}", score_to_win);
        }
        if let Some(seed) = self.seed {
            config.game.seed = Some(seed);
            tracing::info!("🔧 seed overridden to: {}", seed);
        }
        if self.no_cache {
            let cache = config.cache.get_or_insert(toml_config::CacheConfig {
                path: None,
                enabled: None,
            });
            cache.enabled = Some(false);
            tracing::info!("🔧 persistent cache disabled");
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = GameConfig::from_toml_str(
            r#"
[game]
image_directory = "cards"
max_rounds = 10
"#,
        )
        .unwrap();

        let cli = CliConfig::parse_from([
            "dixit-sim",
            "--max-rounds",
            "3",
            "--seed",
            "99",
            "--no-cache",
        ]);
        cli.apply_overrides(&mut config);

        assert_eq!(config.rules().max_rounds, 3);
        assert_eq!(config.rules().seed, Some(99));
        assert!(!config.cache_enabled());
        assert_eq!(cli.config, "dixit.toml");
    }
}
