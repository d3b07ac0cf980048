//! Batch driver against single-threaded solves.

use std::fs;

use renju_vlm::batch::{BatchRunner, ProblemDb};
use renju_vlm::report::CSV_COLUMNS;
use renju_vlm::{MoveList, SolverConfig, VlmSolver};

const DB: &str = "\
ID,Name,Board
1,open three,hhaaihabjhac
2,win now,hhaaihabjhackhgh
3,quiet,hhhg
4,counter four,hhdchleclhfcllgc
5,split three,ddaofdoogdoa
6,edge three,ddaoedoofdoa
";

fn config() -> SolverConfig {
    SolverConfig {
        table_size_mb: 2,
        ..SolverConfig::default()
    }
}

#[test]
fn test_parallel_rows_match_single_solves() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("problems.csv");
    fs::write(&path, DB).unwrap();
    let db = ProblemDb::load(&path).unwrap();
    assert_eq!(db.len(), 6);

    let mut out = Vec::new();
    let mut err = Vec::new();
    let rows = BatchRunner::new(&db, config(), 5, false)
        .run(3, &mut out, &mut err)
        .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert_eq!(out.lines().count(), db.len());
    assert_eq!(rows.len(), db.len());

    for (row, problem) in rows.iter().zip(db.problems()) {
        assert_eq!(&row.problem, problem);
        let moves: MoveList = problem.board.parse().unwrap();
        let single = VlmSolver::new(&moves, config()).unwrap().solve(5, false);
        assert_eq!(row.result.outcome(), single.outcome(), "{}", problem.tag());
        assert_eq!(row.result.search_depth, single.search_depth);
        assert_eq!(row.result.first_move(), single.first_move());

        // Every row appears exactly once in the output stream
        let prefix = format!("{},{},{},", problem.id, problem.name, problem.board);
        assert_eq!(out.lines().filter(|l| l.starts_with(&prefix)).count(), 1);
    }

    let err = String::from_utf8(err).unwrap();
    for problem in db.problems() {
        assert!(err.lines().any(|l| l == problem.tag()));
    }
}

#[test]
fn test_thread_count_does_not_change_results() {
    let db = ProblemDb::parse(DB).unwrap();
    let one = BatchRunner::new(&db, config(), 3, false)
        .run(1, Vec::new(), Vec::new())
        .unwrap();
    let many = BatchRunner::new(&db, config(), 3, false)
        .run(8, Vec::new(), Vec::new())
        .unwrap();
    assert_eq!(one.len(), many.len());
    for (a, b) in one.iter().zip(&many) {
        assert_eq!(a.index, b.index);
        assert_eq!(a.result.outcome(), b.result.outcome());
        assert_eq!(a.result.proof_tree, b.result.proof_tree);
    }
}

#[test]
fn test_rows_follow_header_layout() {
    let db = ProblemDb::parse(DB).unwrap();
    let rows = BatchRunner::new(&db, config(), 3, false)
        .run(2, Vec::new(), Vec::new())
        .unwrap();
    for row in rows {
        let record = row.record();
        assert_eq!(record.len(), CSV_COLUMNS.len());
        assert_eq!(&record[0], row.problem.id);
        assert_eq!(&record[3], row.result.outcome().to_string());
    }
}
