use clap::Parser;
use dixit_sim::config::GameConfig;
use dixit_sim::utils::error::{DixitError, ErrorSeverity};
use dixit_sim::utils::{logger, validation::Validate};
use dixit_sim::{CliConfig, GameSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting dixit-sim");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match GameConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    args.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No backend will be called");
        return perform_dry_run(&config);
    }

    let session = match GameSession::from_config(config) {
        Ok(session) => session,
        Err(e) => exit_with(&e),
    };

    match session.run().await {
        Ok(report) => {
            let outcome = &report.outcome;
            println!(
                "🏆 Game Over! Winner: {} with {} points",
                outcome.winner, outcome.winning_score
            );
            for line in &outcome.final_scores {
                println!("   {}: {}", line.player, line.points);
            }
            println!(
                "🎲 Rounds: {}, seed: {} (pass --seed {} to replay)",
                outcome.rounds_played, outcome.seed, outcome.seed
            );
            println!(
                "💾 Cache hits: {}, misses: {}",
                report.cache.hits, report.cache.misses
            );
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

fn exit_with(e: &DixitError) -> ! {
    tracing::error!(
        "❌ Game failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn display_config_summary(config: &GameConfig) {
    let rules = config.rules();
    tracing::info!("📋 Game Summary:");
    tracing::info!("   Images: {}", config.game.image_directory);
    tracing::info!(
        "   Rounds: {}, score to win: {}, hand size: {}",
        rules.max_rounds,
        rules.score_to_win,
        rules.hand_size
    );
    match rules.seed {
        Some(seed) => tracing::info!("   Seed: {}", seed),
        None => tracing::info!("   Seed: random"),
    }
    for (index, player) in config.players.iter().enumerate() {
        tracing::info!(
            "   {}: {} / {}",
            config.player_name(index),
            player.backend.backend.as_str(),
            player.backend.model
        );
    }
    if config.cache_enabled() {
        tracing::info!("   Cache: {}", config.cache_path());
    } else {
        tracing::info!("   Cache: in-memory only");
    }
}

fn perform_dry_run(config: &GameConfig) -> anyhow::Result<()> {
    use dixit_sim::adapters::deck_source::ImageDirectory;
    use dixit_sim::domain::ports::DeckSource;

    let cards = ImageDirectory::new(&config.game.image_directory).load()?;
    let needed = config.players.len() * config.rules().hand_size;

    println!("🔍 Dry run summary:");
    println!("   Players: {}", config.players.len());
    println!("   Cards found: {} (need at least {})", cards.len(), needed);
    if cards.len() < needed {
        println!("   ⚠️ Not enough cards to deal a full hand to every player");
    }
    Ok(())
}
