//! othello-agent CLI
//!
//! - `move`: choose a move for one position read from a file
//! - `play`: run a self-play match and print the summary

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use othello_agent::arena::{Contender, play_standard_match};
use othello_agent::{Board, Color, DecisionEngine, EngineConfig};

#[derive(Parser)]
#[command(name = "othello-agent")]
#[command(version, about = "Phase-aware Othello move selection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Choose a move for a board position
    Move(MoveArgs),

    /// Play a self-play match
    Play(PlayArgs),
}

#[derive(Args, Debug)]
struct MoveArgs {
    /// Board file: whitespace separated rows of 0/1/2 or ./B/W
    #[arg(long, short = 'b')]
    board: PathBuf,

    /// Side to move
    #[arg(long, short = 'c')]
    color: Color,

    /// Engine configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ContenderKind {
    Engine,
    Random,
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Number of games
    #[arg(long, short = 'g', default_value_t = 100)]
    games: usize,

    /// Board side length (even, 4-16)
    #[arg(long, default_value_t = 8)]
    size: usize,

    /// Random seed; game i uses seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Contender taking Black in the first game
    #[arg(long, value_enum, default_value_t = ContenderKind::Engine)]
    black: ContenderKind,

    /// Contender taking White in the first game
    #[arg(long, value_enum, default_value_t = ContenderKind::Random)]
    white: ContenderKind,

    /// Engine configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn seed_or_random(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::rng().random())
}

fn run_move(args: MoveArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let text = fs::read_to_string(&args.board)
        .with_context(|| format!("Failed to read board from {}", args.board.display()))?;
    let board: Board = text
        .parse()
        .with_context(|| format!("Failed to parse board in {}", args.board.display()))?;

    let seed = seed_or_random(args.seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let engine = DecisionEngine::new(config);
    let decision = engine.decide(&board, args.color, args.color.opposite(), &mut rng);

    log::info!(
        "seed {seed}: {} via {:?} in {:.2}ms",
        decision.phase,
        decision.selector,
        decision.elapsed.as_secs_f64() * 1000.0
    );
    match decision.mv {
        Some(mv) => println!("{} {}", mv.row, mv.col),
        None => println!("pass"),
    }
    Ok(())
}

fn run_play(args: PlayArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let contender = |kind: ContenderKind| match kind {
        ContenderKind::Engine => Contender::Engine(config.clone()),
        ContenderKind::Random => Contender::Random,
    };
    let first = contender(args.black);
    let second = contender(args.white);
    let seed = seed_or_random(args.seed);

    println!("{first} vs {second}: {} games on {}x{}, seed {seed}", args.games, args.size, args.size);
    let summary = play_standard_match(&first, &second, args.games, args.size, seed)
        .context("Match aborted")?;
    println!("{summary}");
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Move(args) => run_move(args),
        Commands::Play(args) => run_play(args),
    }
}
