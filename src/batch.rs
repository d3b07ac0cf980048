//! Problem database and the multi-threaded batch driver
//!
//! The database is a CSV file with at least the columns `ID`, `Name` and
//! `Board` (a move string). Workers pull problem indices from a shared
//! queue, solve each with their own transposition table, and write one
//! result row per problem to the output stream. Progress lines and
//! diagnostics go to a separate error stream; both streams are guarded by
//! their own lock so lines never interleave.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::panic;
use std::path::Path;
use std::thread;

use csv::StringRecord;
use log::{info, warn};
use parking_lot::Mutex;

use crate::board::MoveList;
use crate::config::SolverConfig;
use crate::error::{PositionError, ProblemDbError};
use crate::report;
use crate::search::{LocalTable, LockMode, SearchResult, SharedTable, TableHandle, VlmSolver};

/// One row of the problem database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub id: String,
    pub name: String,
    pub board: String,
}

impl Problem {
    /// Progress tag written before each solve.
    pub fn tag(&self) -> String {
        format!("{}_{}", self.id, self.name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProblemDb {
    problems: Vec<Problem>,
}

impl ProblemDb {
    /// Parse CSV text. Columns are found by header name and extra columns
    /// are allowed. Rows lacking a required field are logged and skipped.
    pub fn parse(text: &str) -> Result<Self, ProblemDbError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(ProblemDbError::Empty);
        }
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|c| c == name)
                .ok_or(ProblemDbError::MissingColumn(name))
        };
        let (id_col, name_col, board_col) = (column("ID")?, column("Name")?, column("Board")?);

        let mut problems = Vec::new();
        for record in reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!("skipping malformed problem: {e}");
                    continue;
                }
            };
            let field = |col: usize| record.get(col).map(str::to_string);
            match (field(id_col), field(name_col), field(board_col)) {
                (Some(id), Some(name), Some(board)) => problems.push(Problem { id, name, board }),
                _ => {
                    let e = ProblemDbError::RaggedRow {
                        row: record.position().map_or(0, |p| p.line() as usize),
                        found: record.len(),
                        expected: headers.len(),
                    };
                    warn!("skipping malformed problem: {e}");
                }
            }
        }
        Ok(Self { problems })
    }

    pub fn load(path: &Path) -> Result<Self, ProblemDbError> {
        let text = std::fs::read_to_string(path).map_err(|source| ProblemDbError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self::parse(&text)?;
        info!("read {} problems from {}", db.len(), path.display());
        Ok(db)
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }
}

impl FromIterator<Problem> for ProblemDb {
    fn from_iter<I: IntoIterator<Item = Problem>>(iter: I) -> Self {
        Self {
            problems: iter.into_iter().collect(),
        }
    }
}

/// Outcome of one solved problem.
#[derive(Debug, Clone)]
pub struct BatchRow {
    /// Position of the problem in the database
    pub index: usize,
    pub problem: Problem,
    pub result: SearchResult,
}

impl BatchRow {
    /// Output record, laid out as [`report::CSV_COLUMNS`].
    pub fn record(&self) -> StringRecord {
        report::csv_record(
            &self.problem.id,
            &self.problem.name,
            &self.problem.board,
            &self.result,
        )
    }
}

/// Solves every problem of a database across worker threads.
pub struct BatchRunner<'a> {
    db: &'a ProblemDb,
    config: SolverConfig,
    max_depth: i16,
    detect_dual: bool,
}

/// Shared state of one batch run.
struct Shared<O: Write, E> {
    queue: Mutex<VecDeque<usize>>,
    out: Mutex<csv::Writer<O>>,
    err: Mutex<E>,
    rows: Mutex<Vec<BatchRow>>,
}

impl<O: Write, E: Write> Shared<O, E> {
    fn next_problem(&self) -> Option<usize> {
        self.queue.lock().pop_front()
    }

    fn log_err(&self, line: &str) -> io::Result<()> {
        let mut err = self.err.lock();
        writeln!(err, "{line}")
    }
}

impl<'a> BatchRunner<'a> {
    pub fn new(db: &'a ProblemDb, config: SolverConfig, max_depth: i16, detect_dual: bool) -> Self {
        Self {
            db,
            config,
            max_depth,
            detect_dual,
        }
    }

    /// Run with `threads` workers.
    ///
    /// Each solved problem produces exactly one record on `out`. Problems
    /// whose move string is not a legal undecided position are reported on
    /// `err` and skipped. Returns the solved rows in database order.
    ///
    /// With [`LockMode::LockFree`] every worker owns a table and clears it
    /// before each problem. With [`LockMode::Mutex`] all workers share one
    /// table for the whole run.
    pub fn run<O, E>(&self, threads: usize, out: O, err: E) -> io::Result<Vec<BatchRow>>
    where
        O: Write + Send,
        E: Write + Send,
    {
        let threads = threads.max(1);
        let shared = Shared {
            queue: Mutex::new((0..self.db.len()).collect()),
            out: Mutex::new(csv::WriterBuilder::new().has_headers(false).from_writer(out)),
            err: Mutex::new(err),
            rows: Mutex::new(Vec::with_capacity(self.db.len())),
        };
        info!(
            "batch: {} problems, {} threads, depth {}, {:?} table",
            self.db.len(),
            threads,
            self.max_depth,
            self.config.lock_mode
        );

        let (size_mb, exact) = (self.config.table_size_mb, self.config.exact_board);
        let shared = &shared;
        thread::scope(|s| {
            let handles: Vec<_> = match self.config.lock_mode {
                LockMode::LockFree => (0..threads)
                    .map(|_| s.spawn(move || self.worker(shared, &LocalTable::new(size_mb, exact), true)))
                    .collect(),
                LockMode::Mutex => {
                    let table = SharedTable::new(size_mb, exact);
                    (0..threads)
                        .map(|_| {
                            let table = table.clone();
                            s.spawn(move || self.worker(shared, &table, false))
                        })
                        .collect()
                }
            };
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
                .collect::<io::Result<Vec<()>>>()
        })?;

        shared.out.lock().flush()?;
        shared.err.lock().flush()?;

        let mut rows = std::mem::take(&mut *shared.rows.lock());
        rows.sort_by_key(|row| row.index);
        Ok(rows)
    }

    fn worker<O, E, T>(&self, shared: &Shared<O, E>, table: &T, reset: bool) -> io::Result<()>
    where
        O: Write,
        E: Write,
        T: TableHandle,
    {
        while let Some(index) = shared.next_problem() {
            let problem = &self.db.problems()[index];
            shared.log_err(&problem.tag())?;

            let solver = problem
                .board
                .parse::<MoveList>()
                .map_err(PositionError::from)
                .and_then(|moves| {
                    if reset {
                        table.clear();
                    }
                    VlmSolver::with_table(&moves, self.config.clone(), table.clone())
                });
            let mut solver = match solver {
                Ok(solver) => solver,
                Err(e) => {
                    warn!("skipping {}: {}", problem.tag(), e);
                    shared.log_err(&format!(
                        "The move sequence is not a non-terminal normal sequence: {} ({e})",
                        problem.board
                    ))?;
                    continue;
                }
            };

            let result = solver.solve(self.max_depth, self.detect_dual);
            let row = BatchRow {
                index,
                problem: problem.clone(),
                result,
            };
            {
                let mut out = shared.out.lock();
                out.write_record(&row.record())?;
                out.flush()?;
            }
            shared.rows.lock().push(row);
        }
        Ok(())
    }
}
