//! Headless skirmish: the auto-pilot party against the sample enemies.
//!
//! Usage: `skirmish [config.json]`. Log verbosity follows `RUST_LOG`.

use anyhow::{Context, Result};
use turn_combat::battle::BattleOutcome;
use turn_combat::core::BattleConfig;
use turn_combat::games::skirmish::SkirmishBuilder;
use turn_combat::input::AutoPilot;
use turn_combat::presentation::LogSink;
use turn_combat::stores::Inventory;

fn load_config() -> Result<BattleConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing {}", path))
        }
        None => Ok(BattleConfig::instant()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config()?;
    tracing::info!("Starting skirmish with seed {}", config.seed);

    let mut battle = SkirmishBuilder::new()
        .poisoned_enemies(true)
        .build()
        .battle(config)
        .with_input(AutoPilot)
        .with_sink(LogSink)
        .build()?;

    let outcome = battle.run().await?;
    let stats = battle.stats();
    println!("{} after {} rounds", outcome, battle.round());
    println!(
        "events: {} queued, {} applied, {} dropped, {} suppressed, {} cleared",
        stats.enqueued, stats.applied, stats.dropped, stats.suppressed, stats.cleared
    );
    if let BattleOutcome::Won(spoils) = &outcome {
        println!("loot: {:?}, purse: {} gold", spoils.items, battle.inventory().gold());
    }
    Ok(())
}
