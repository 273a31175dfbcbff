//! Wager engine CLI
//!
//! Runs house-edge simulations against the engine and writes sample
//! configuration files.

use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc, time::Instant};
use tracing::{info, warn};
use wager_engine::{
    config::{generate_sample_config, ConfigLoader, EngineConfig},
    errors::{EngineResult, ValidationError},
    games::types::{DiceDirection, RiskLevel, RouletteBet},
    rng::{RandomSource, StdDraws},
    ChannelHistorySink, EngineFactory, GameParams, GameType, Money, PlayResult, StoreKind, SubjectId,
};

/// Wager engine CLI
#[derive(Parser)]
#[command(name = "wager-engine")]
#[command(about = "Virtual-currency wagering engine and outcome simulator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Play many rounds of one game and report the observed RTP
    Simulate {
        /// Game to simulate
        #[arg(short, long)]
        game: GameType,

        /// Number of rounds
        #[arg(short, long, default_value = "10000")]
        rounds: u64,

        /// Bet per round in display units
        #[arg(short, long, default_value = "1.00")]
        bet: f64,

        /// Wallet store: session or account
        #[arg(long, default_value = "session")]
        store: StoreKind,

        /// Risk level for wheel and plinko
        #[arg(long, default_value = "medium")]
        risk: RiskLevel,

        /// Seed for a repeatable run
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write the default configuration as TOML
    SampleConfig {
        /// Output path
        #[arg(short, long, default_value = "wager_engine.toml")]
        out: String,
    },
}

#[tokio::main]
async fn main() -> EngineResult<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "wager_engine=debug" } else { "wager_engine=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    match cli.command {
        Commands::Simulate {
            game,
            rounds,
            bet,
            store,
            risk,
            seed,
        } => {
            let config = match &cli.config {
                Some(path) => ConfigLoader::new().with_path(path).load()?,
                None => EngineConfig::simulation(),
            };
            run_simulation(config, game, rounds, bet, store, risk, seed).await
        }
        Commands::SampleConfig { out } => {
            generate_sample_config(&out)?;
            println!("Sample configuration written to {}", out);
            Ok(())
        }
    }
}

async fn run_simulation(
    config: EngineConfig,
    game: GameType,
    rounds: u64,
    bet: f64,
    store: StoreKind,
    risk: RiskLevel,
    seed: Option<u64>,
) -> EngineResult<()> {
    let params = simulation_params(game, risk)?;
    let bet = Money::try_from_f64(bet)?;

    let rng: Box<dyn RandomSource> = match seed {
        Some(seed) => Box::new(StdDraws::seeded(seed)),
        None => Box::new(StdDraws::from_entropy()),
    };
    let (sink, mut receiver) = ChannelHistorySink::new(4096);
    let collector = tokio::spawn(async move {
        let mut delivered = 0u64;
        while receiver.recv().await.is_some() {
            delivered += 1;
        }
        delivered
    });

    let engine = EngineFactory::create_engine(&config, store, rng, Arc::new(sink))?;
    let subject = match store {
        StoreKind::Account => SubjectId::account("simulator"),
        StoreKind::Session => SubjectId::session("simulator"),
    };
    engine.reset_wallet(&subject).await?;

    info!(%game, rounds, %bet, %store, "Starting simulation");
    let started = Instant::now();
    let mut played = 0u64;
    for _ in 0..rounds {
        match engine.play(&subject, bet, params.clone()).await? {
            PlayResult::Settled(_) => played += 1,
            PlayResult::InsufficientFunds => {
                warn!(played, "Wallet exhausted, stopping early");
                break;
            }
            PlayResult::InProgress { round_id, .. } => {
                warn!(%round_id, "One-shot play left a round open");
                break;
            }
        }
    }
    let elapsed = started.elapsed();

    let wallet = engine.wallet(&subject).await?;
    let monitor = engine.monitor().clone();
    drop(engine);
    let delivered = collector.await.unwrap_or(0);

    println!("Simulation Results: {}", game);
    println!("============================================");
    println!("Rounds played:     {}", played);
    println!("Total wagered:     {}", monitor.wagered());
    println!("Total returned:    {}", monitor.returned());
    println!("Observed RTP:      {:.4}", monitor.observed_rtp());
    println!("Win rate:          {:.2}%", monitor.win_rate() * 100.0);
    println!("Pushes:            {}", monitor.push_count());
    println!("Final balance:     {}", wallet.balance);
    println!("Net profit:        {:.2}", wallet.net_profit() as f64 / 100.0);
    println!("History records:   {}", delivered);
    println!("Rounds per second: {:.0}", played as f64 / elapsed.as_secs_f64().max(f64::EPSILON));

    Ok(())
}

/// Fixed parameters used for each simulated game
fn simulation_params(game: GameType, risk: RiskLevel) -> Result<GameParams, ValidationError> {
    let params = match game {
        GameType::Dice => GameParams::Dice {
            target: 50.0,
            direction: DiceDirection::Over,
        },
        GameType::Limbo => GameParams::Limbo { target: 2.0 },
        GameType::Roulette => GameParams::Roulette { bet: RouletteBet::Red },
        GameType::Wheel => GameParams::Wheel { risk },
        GameType::Keno => GameParams::Keno {
            picks: vec![3, 11, 17, 24, 38],
        },
        GameType::Slots => GameParams::Slots,
        GameType::Mines => GameParams::Mines {
            mines: 3,
            reveals: vec![0, 6, 12],
        },
        GameType::Crash => GameParams::Crash { auto_cash_out: 2.0 },
        GameType::Plinko => GameParams::Plinko { rows: 16, risk },
        GameType::Blackjack => GameParams::Blackjack { stand_on: 17 },
        GameType::Arcade => {
            return Err(ValidationError::InvalidParameter {
                field: "game",
                reason: "arcade payouts depend on a player score, not a random draw".to_string(),
            })
        }
    };
    Ok(params)
}
