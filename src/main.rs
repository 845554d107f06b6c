//! Citadel AI - sandbox runner
//!
//! Loads an AI script, gives it one player in a sandbox match and runs a
//! number of ticks. Villagers trickle random resources into the ledger each
//! tick so economy rules have something to react to.

use citadel_ai::ai::{Match, SandboxExecutor};
use citadel_ai::core::error::Result;
use citadel_ai::core::types::{Commodity, ObjectClass, ObjectTypeId, PlayerId, ResourceType};
use citadel_ai::core::{config, set_config, EngineConfig};
use citadel_ai::script::ScriptDef;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AI: PlayerId = PlayerId(1);
const OPPONENT: PlayerId = PlayerId(2);

const TOWN_CENTER: ObjectTypeId = ObjectTypeId(109);
const VILLAGER: ObjectTypeId = ObjectTypeId(83);

/// Run an AI script in a sandbox match
#[derive(Parser, Debug)]
#[command(name = "citadel-ai")]
#[command(about = "Run a scripted computer player in a sandbox match")]
struct Args {
    /// AI script (TOML)
    #[arg(long)]
    script: PathBuf,

    /// Engine configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 100)]
    ticks: u32,

    /// Random seed for reproducible runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Print a JSON report instead of a summary
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    script: String,
    seed: u64,
    ticks: u32,
    fired: BTreeMap<String, u32>,
    rejected: Vec<String>,
    resources: BTreeMap<ResourceType, i32>,
    objects: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("citadel_ai=info")),
        )
        .init();

    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if set_config(loaded).is_err() {
        tracing::warn!("configuration was already set");
    }
    let config = config().clone();

    let script = ScriptDef::load(&args.script)?;
    tracing::info!("loaded script '{}' with {} rules", script.name, script.rules.len());

    let mut game = Match::new(config.clone());
    game.add_player(OPPONENT);
    game.add_ai_player(AI, &script)?;
    setup_start(&mut game, &config)?;

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut executor = SandboxExecutor::new();
    for _ in 0..args.ticks {
        gather(&mut game, &mut rng)?;
        game.tick(&mut executor)?;
    }

    let report = build_report(&game, &script, &args);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, &executor);
    }
    Ok(())
}

/// Town center, three villagers and the starting stockpile
fn setup_start(game: &mut Match, config: &EngineConfig) -> Result<()> {
    game.apply(|state| Ok(state.spawn_object(AI, TOWN_CENTER).1))?;
    for _ in 0..3 {
        game.apply(|state| Ok(state.spawn_object(AI, VILLAGER).1))?;
    }
    let amount = config.starting_resources.stockpile();
    for commodity in Commodity::ALL {
        game.apply(|state| state.add_commodity(AI, commodity, amount))?;
    }
    Ok(())
}

/// Each villager brings in a few units of a random commodity
fn gather(game: &mut Match, rng: &mut ChaCha8Rng) -> Result<()> {
    let villagers = game
        .state()
        .objects()
        .iter()
        .filter(|o| o.owner == AI && o.class == ObjectClass::Civilian)
        .count();

    for _ in 0..villagers {
        let commodity = Commodity::ALL[rng.gen_range(0..Commodity::ALL.len())];
        let amount = rng.gen_range(5..=15);
        game.apply(|state| state.add_commodity(AI, commodity, amount))?;
    }
    Ok(())
}

fn build_report(game: &Match, script: &ScriptDef, args: &Args) -> Report {
    let (fired, rejected) = match game.ai_player(AI) {
        Some(ai) => (
            ai.rules().rules().map(|r| (r.name().to_string(), r.fired())).collect(),
            ai.rules().rejected().iter().map(|r| format!("{}: {}", r.name, r.reason)).collect(),
        ),
        None => (BTreeMap::new(), Vec::new()),
    };

    Report {
        script: script.name.clone(),
        seed: args.seed,
        ticks: args.ticks,
        fired,
        rejected,
        resources: ResourceType::ALL
            .iter()
            .map(|r| (*r, game.state().resource(AI, *r)))
            .collect(),
        objects: game.state().objects().len(),
    }
}

fn print_summary(report: &Report, executor: &SandboxExecutor) {
    println!("\n=== {} ({} ticks, seed {}) ===", report.script, report.ticks, report.seed);
    println!("\nRules fired:");
    for (name, count) in &report.fired {
        println!("  {:<32} {}", name, count);
    }
    if !report.rejected.is_empty() {
        println!("\nRejected:");
        for line in &report.rejected {
            println!("  {}", line);
        }
    }
    println!("\nResources:");
    for (resource, value) in &report.resources {
        println!("  {:<18} {}", format!("{:?}", resource), value);
    }
    println!("\nObjects: {}  Skipped actions: {}  Chat lines: {}", report.objects, executor.skipped(), executor.chat().len());
}
