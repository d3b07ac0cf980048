//! VLM batch analyzer
//!
//! Solves every problem of a CSV database in parallel and prints one CSV
//! row per problem. Progress goes to stderr.
//!
//! ```text
//! vlm_batch --header > result.csv
//! vlm_batch -p problems.csv -d 9 --thread 8 >> result.csv
//! ```

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use renju_vlm::batch::{BatchRunner, ProblemDb};
use renju_vlm::report::CSV_COLUMNS;
use renju_vlm::SolverConfig;

#[derive(Parser, Debug)]
#[command(name = "vlm_batch")]
#[command(about = "Solve a database of Renju problems in parallel")]
struct Cli {
    /// Problem database (CSV with ID, Name and Board columns)
    #[arg(short = 'p', long = "problem-db")]
    problem_db: Option<PathBuf>,

    /// Maximum search depth in plies
    #[arg(short, long, default_value_t = 7)]
    depth: i16,

    /// Also look for dual solutions
    #[arg(long)]
    dual: bool,

    /// Number of worker threads
    #[arg(long = "thread", default_value_t = 1)]
    threads: usize,

    /// Print the CSV header and exit
    #[arg(long)]
    header: bool,

    /// Solver settings in TOML
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.header {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(io::stdout());
        writer.write_record(CSV_COLUMNS)?;
        writer.flush()?;
        return Ok(());
    }
    let Some(path) = cli.problem_db else {
        bail!("a problem db is required (-p <path>)");
    };

    let config = SolverConfig::load_or_default(cli.config.as_deref())?;
    let db = ProblemDb::load(&path)?;
    eprintln!("Read: {} problems", db.len());

    let runner = BatchRunner::new(&db, config, cli.depth, cli.dual);
    runner.run(cli.threads, io::stdout(), io::stderr())?;
    Ok(())
}
