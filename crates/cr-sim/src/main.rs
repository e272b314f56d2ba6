//! Duel simulator
//!
//! Runs seeded duels through the combat rules and prints a JSON summary.
//! Set `RUST_LOG=cr_core=debug` to watch the rolls.

mod duel;

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use cr_core::artifact::{HookRegistry, UnrandArtifact};
use cr_core::config::CombatConfig;
use cr_core::item::WeaponType;
use cr_core::message::{MessageSink, MsgChannel};
use cr_core::{CombatError, ConfigError, GameRng};

use duel::{DuelSetup, DuelSummary, Winner, run_duel};

/// Seeded duel simulator
#[derive(Parser, Debug)]
#[command(name = "cr-sim")]
#[command(author, version, about = "Pit a player against a monster and count the blows", long_about = None)]
struct Args {
    /// RNG seed; the same seed replays the same duels
    #[arg(short = 's', long = "seed", default_value_t = 1)]
    seed: u64,

    /// Number of duels to run
    #[arg(short = 'n', long = "duels", default_value_t = 1)]
    duels: u32,

    /// Round limit per duel
    #[arg(short = 'r', long = "rounds", default_value_t = 100)]
    rounds: u32,

    /// Starting distance between the fighters
    #[arg(short = 'd', long = "distance", default_value_t = 6)]
    distance: i32,

    /// Unique artifact to give the player (e.g. Sniper, Woe)
    #[arg(short = 'a', long = "artifact")]
    artifact: Option<UnrandArtifact>,

    /// Fight without the default shortbow
    #[arg(long = "unarmed")]
    unarmed: bool,

    /// Monster hit dice
    #[arg(long = "hd", default_value_t = 6)]
    hit_dice: i32,

    /// Monster hit points
    #[arg(long = "hp", default_value_t = 45)]
    hit_points: i32,

    /// Combat options file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Print the narration as it happens
    #[arg(short = 'v', long = "narrate")]
    narrate: bool,

    /// Pretty-print the JSON summary
    #[arg(long = "pretty")]
    pretty: bool,
}

#[derive(Debug, Error)]
enum SimError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("combat: {0}")]
    Combat(#[from] CombatError),
    #[error("summary: {0}")]
    Json(#[from] serde_json::Error),
}

/// Prints narration to stdout when asked and counts every line.
struct Narrator {
    echo: bool,
    lines: usize,
}

impl MessageSink for Narrator {
    fn notify(&mut self, _channel: MsgChannel, text: &str) {
        self.lines += 1;
        if self.echo {
            println!("{text}");
        }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    seed: u64,
    duels: Vec<DuelSummary>,
    player_wins: usize,
    monster_wins: usize,
    draws: usize,
    messages: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("cr-sim: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), SimError> {
    let config = match &args.config {
        Some(path) => CombatConfig::load_from_file(path)?,
        None => CombatConfig::default(),
    };
    tracing::debug!(?config, "combat options");

    let setup = DuelSetup {
        max_rounds: args.rounds,
        distance: args.distance,
        weapon: (!args.unarmed).then_some(WeaponType::Shortbow),
        artifact: args.artifact,
        monster_hd: args.hit_dice,
        monster_hp: args.hit_points,
        ..DuelSetup::default()
    };
    let hooks = HookRegistry::global();
    let mut rng = GameRng::new(args.seed);
    let mut narrator = Narrator {
        echo: args.narrate,
        lines: 0,
    };

    let mut duels = Vec::new();
    for n in 0..args.duels {
        tracing::info!(duel = n + 1, seed = args.seed, "starting duel");
        duels.push(run_duel(&setup, &mut rng, &mut narrator, &config, hooks)?);
    }

    let count = |w: Winner| duels.iter().filter(|d| d.winner == w).count();
    let report = Report {
        seed: args.seed,
        player_wins: count(Winner::Player),
        monster_wins: count(Winner::Monster),
        draws: count(Winner::Nobody),
        messages: narrator.lines,
        duels,
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}
