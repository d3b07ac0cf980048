//! Rendering of search results
//!
//! Three formats: the human-readable report of `vlm_analyzer`, the CSV rows
//! of `vlm_batch`, and JSON for machine consumption.

use std::fmt;
use std::time::Duration;

use csv::StringRecord;
use serde::Serialize;

use crate::board::Move;
use crate::search::{Outcome, SearchResult, SearchStats};

/// Column header of the batch output.
pub const CSV_COLUMNS: [&str; 10] = [
    "ID",
    "Name",
    "Board",
    "Result",
    "FirstMove",
    "ProofTree",
    "SearchedDepth",
    "Time(sec)",
    "Nodes",
    "NPS",
];

fn secs(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64()
}

fn nps_string(stats: &SearchStats) -> String {
    match stats.nps() {
        Some(nps) => format!("{nps:.0}"),
        None => "INF".to_string(),
    }
}

fn line_string(line: &[Move]) -> String {
    line.iter().map(Move::to_string).collect()
}

/// Multi-line report for one solve, rendered through [`fmt::Display`].
///
/// The dual line is printed only when dual detection was requested.
pub struct InteractiveReport<'a> {
    pub result: &'a SearchResult,
    pub dual_requested: bool,
}

pub fn interactive_report(result: &SearchResult, dual_requested: bool) -> InteractiveReport<'_> {
    InteractiveReport {
        result,
        dual_requested,
    }
}

impl fmt::Display for InteractiveReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        let stats = &result.stats;

        writeln!(f, "Result: {}", result.outcome())?;
        if result.solved {
            if let Some(first) = result.first_move() {
                writeln!(f, "First Move: {first}")?;
            }
            writeln!(f, "Proof Tree: {}", result.proof_tree)?;
            if self.dual_requested {
                if result.dual_solution {
                    writeln!(f, "Dual Solution: {}", result.dual_tree)?;
                } else {
                    writeln!(f, "Dual Solution: none")?;
                }
            }
            writeln!(f, "Best Response: {}", line_string(&result.best_response))?;
        }
        writeln!(f, "Depth: {}", result.search_depth)?;
        writeln!(f, "Nodes: {}", stats.nodes)?;
        writeln!(
            f,
            "ProofTree: {} / {} ({} %)",
            stats.proof_tree_success,
            stats.proof_tree_count,
            stats.proof_tree_rate()
        )?;
        writeln!(
            f,
            "Simulation: {} / {} ({} %)",
            stats.simulation_success,
            stats.simulation_count,
            stats.simulation_rate()
        )?;
        writeln!(f, "Time(s): {:.3}", secs(stats.elapsed))?;
        writeln!(f, "NPS: {}", nps_string(stats))
    }
}

/// One batch output record, matching [`CSV_COLUMNS`].
pub fn csv_record(id: &str, name: &str, board: &str, result: &SearchResult) -> StringRecord {
    let (first, tree) = if result.solved {
        (
            result.first_move().map(|m| m.to_string()).unwrap_or_default(),
            result.proof_tree.to_string(),
        )
    } else {
        (String::new(), String::new())
    };
    StringRecord::from(vec![
        id.to_string(),
        name.to_string(),
        board.to_string(),
        result.outcome().to_string(),
        first,
        tree,
        result.search_depth.to_string(),
        format!("{:.3}", secs(result.stats.elapsed)),
        result.stats.nodes.to_string(),
        nps_string(&result.stats),
    ])
}

#[derive(Serialize)]
struct JsonReport<'a> {
    board: &'a str,
    outcome: Outcome,
    first_move: Option<Move>,
    #[serde(flatten)]
    result: &'a SearchResult,
}

/// Pretty-printed JSON document for one solve.
pub fn json_report(board: &str, result: &SearchResult) -> serde_json::Result<String> {
    let report = JsonReport {
        board,
        outcome: result.outcome(),
        first_move: result.first_move(),
        result,
    };
    serde_json::to_string_pretty(&report)
}
