//! VLM analyzer
//!
//! Solves one position given as a move string and prints the report.
//!
//! ```text
//! vlm_analyzer -s hhaaihabjhac -d 7 --dual
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use renju_vlm::report::{interactive_report, json_report};
use renju_vlm::{MoveList, SolverConfig, VlmSolver};

#[derive(Parser, Debug)]
#[command(name = "vlm_analyzer")]
#[command(about = "Search a Renju position for a forced win within a ply bound")]
struct Cli {
    /// Start position as a move string, e.g. "hhhgih" ("pp" is a pass)
    #[arg(short = 's', long = "string")]
    board: String,

    /// Maximum search depth in plies
    #[arg(short, long, default_value_t = 7)]
    depth: i16,

    /// Also look for dual solutions
    #[arg(long)]
    dual: bool,

    /// Fold defender replies that transpose into the pass line
    #[arg(long)]
    summarize: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Solver settings in TOML
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = SolverConfig::load_or_default(cli.config.as_deref())?;
    let moves: MoveList = cli
        .board
        .parse()
        .with_context(|| format!("invalid move string: {}", cli.board))?;
    let mut solver = VlmSolver::new(&moves, config).with_context(|| {
        format!("the move sequence is not a non-terminal normal sequence: {moves}")
    })?;

    let mut result = solver.solve(cli.depth, cli.dual);
    if cli.summarize && result.solved {
        if let Some(tree) = solver.root_proof_tree(true) {
            result.proof_tree = tree;
        }
    }

    if cli.json {
        println!("{}", json_report(&moves.to_string(), &result)?);
    } else {
        print!("{}", interactive_report(&result, cli.dual));
    }
    Ok(())
}
