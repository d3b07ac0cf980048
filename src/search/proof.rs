//! Proof trees: reconstruction from the table and cached re-verification
//!
//! A proof is never recorded during search. Once the root is proved, the
//! tree is rebuilt by walking the transposition table: every attacker move
//! whose child carries a shorter proof becomes an edge, and every defender
//! reply must itself rebuild. A tree that rebuilds is a certificate that the
//! table alone justifies the win.
//!
//! The same trees double as a cache. After one defender reply is proved, its
//! tree is replayed against the sibling replies ([`VlmSolver::simulate_or`]);
//! the replay only follows moves the tree already knows and fails closed on
//! anything new.

use std::fmt;

use log::trace;
use serde::Serialize;

use super::ordering::{candidates_and, candidates_or, Turn};
use super::solver::VlmSolver;
use super::tt::TableHandle;
use super::value::SearchValue;
use crate::board::{Bitboard, Move};

/// One move of a proof tree and everything below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofEdge {
    pub mv: Move,
    pub subtree: ProofTree,
}

/// Winning game tree rooted at the analysed position.
///
/// Levels alternate: attacker moves at even depth, defender replies (and
/// passes) at odd depth. A leaf edge is the move completing five.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProofTree {
    pub children: Vec<ProofEdge>,
}

impl ProofTree {
    /// A tree holding the single move `mv`.
    pub fn leaf(mv: Move) -> Self {
        let mut tree = Self::default();
        tree.add(mv, Self::default());
        tree
    }

    pub fn add(&mut self, mv: Move, subtree: ProofTree) {
        self.children.push(ProofEdge { mv, subtree });
    }

    pub fn get(&self, mv: Move) -> Option<&ProofTree> {
        self.children
            .iter()
            .find(|edge| edge.mv == mv)
            .map(|edge| &edge.subtree)
    }

    pub fn first_move(&self) -> Option<Move> {
        self.children.first().map(|edge| edge.mv)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Plies on the longest line.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|edge| 1 + edge.subtree.depth())
            .max()
            .unwrap_or(0)
    }

    /// Every root-to-leaf line.
    pub fn lines(&self) -> Vec<Vec<Move>> {
        let mut out = Vec::new();
        let mut line = Vec::new();
        self.collect_lines(&mut line, &mut out);
        out
    }

    fn collect_lines(&self, line: &mut Vec<Move>, out: &mut Vec<Vec<Move>>) {
        if self.is_empty() {
            if !line.is_empty() {
                out.push(line.clone());
            }
            return;
        }
        for edge in &self.children {
            line.push(edge.mv);
            edge.subtree.collect_lines(line, out);
            line.pop();
        }
    }

    /// The defender's most stubborn line: the first attacker move at each
    /// attacker level, the reply with the deepest subtree at each defender
    /// level.
    pub fn principal_line(&self) -> Vec<Move> {
        let mut line = Vec::new();
        let mut node = self;
        let mut attacker = true;
        loop {
            let edge = if attacker {
                node.children.first()
            } else {
                // First of the deepest replies
                node.children
                    .iter()
                    .rev()
                    .max_by_key(|edge| edge.subtree.depth())
            };
            let Some(edge) = edge else { break };
            line.push(edge.mv);
            node = &edge.subtree;
            attacker = !attacker;
        }
        line
    }
}

impl fmt::Display for ProofTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.children.as_slice() {
            [] => Ok(()),
            [edge] => write!(f, "{}{}", edge.mv, edge.subtree),
            edges => {
                for edge in edges {
                    write!(f, "({}{})", edge.mv, edge.subtree)?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for ProofTree {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<T: TableHandle> VlmSolver<T> {
    fn proved_distance(&self) -> Option<i16> {
        self.probe()
            .filter(|v| v.is_proved())
            .map(SearchValue::distance)
    }

    /// Child proof strictly shorter than `bound`, if the table has one.
    fn child_proved_within(&self, bound: i16) -> bool {
        self.proved_distance().is_some_and(|d| d < bound)
    }

    // =========================================================================
    // Reconstruction
    // =========================================================================

    /// Rebuild the proof of the OR node at the current position.
    ///
    /// With `summarize`, defender replies whose continuation equals the
    /// pass continuation are folded into the pass branch.
    pub(super) fn proof_tree_or<P: Turn>(&mut self, summarize: bool) -> Option<ProofTree> {
        let distance = self.proved_distance()?;

        if let Some(five) = P::five_points(&self.board).iter_ones().next() {
            return Some(ProofTree::leaf(Move::Place(five)));
        }

        let moves = candidates_or::<P>(&self.board, distance, &self.config, false);
        let mut tree = ProofTree::default();
        for mv in moves {
            self.make_move(mv);
            let subtree = if self.child_proved_within(distance) {
                self.proof_tree_and::<P>(summarize)
            } else {
                None
            };
            self.undo_move(mv);

            if let Some(subtree) = subtree {
                tree.add(mv, subtree);
            }
        }
        (!tree.is_empty()).then_some(tree)
    }

    fn proof_tree_and<P: Turn>(&mut self, summarize: bool) -> Option<ProofTree> {
        let distance = self.proved_distance()?;
        let replies = candidates_and::<P>(&self.board, distance, &self.config, false);

        let mut tree = ProofTree::default();
        for mv in replies.moves {
            self.make_move(mv);
            let subtree = if self.child_proved_within(distance) {
                self.proof_tree_or::<P>(summarize)
            } else {
                None
            };
            self.undo_move(mv);

            tree.add(mv, subtree?);
        }

        if summarize {
            if let Some(pass) = tree.get(Move::Pass).cloned() {
                tree.children
                    .retain(|edge| edge.mv.is_pass() || edge.subtree != pass);
            }
        }
        Some(tree)
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Re-prove the OR node at the current position by following `tree`.
    ///
    /// Returns the proof on success and stores it. `None` means the cache
    /// did not cover the position and a full search is required.
    pub(super) fn simulate_or<P: Turn>(&mut self, tree: &ProofTree, remain: i16) -> Option<SearchValue> {
        if self.manager.visit() {
            return None;
        }
        match self.probe() {
            Some(v) if v.is_proved() => return Some(v),
            Some(v) if v.is_strong_disproved() => return None,
            _ => {}
        }

        if !P::five_points(&self.board).is_empty() {
            let v = SearchValue::proved(1);
            self.record(v);
            return Some(v);
        }
        if remain <= 1 {
            return None;
        }

        let defender_fives = <P::Opponent as Turn>::five_points(&self.board);
        let allowed = match defender_fives.count() {
            0 => P::legal_points(&self.board),
            1 => defender_fives
                .iter_ones()
                .filter(|&p| P::is_legal(&self.board, p))
                .collect::<Bitboard>(),
            _ => return None,
        };

        for edge in &tree.children {
            let Some(pos) = edge.mv.pos() else { continue };
            if !allowed.get(pos) {
                continue;
            }
            self.make_move(edge.mv);
            let result = self.simulate_and::<P>(&edge.subtree, remain - 1);
            self.undo_move(edge.mv);

            if let Some(v) = result {
                let v = v.step_up();
                self.record(v);
                return Some(v);
            }
            if self.manager.is_terminated() {
                return None;
            }
        }
        None
    }

    fn simulate_and<P: Turn>(&mut self, tree: &ProofTree, remain: i16) -> Option<SearchValue> {
        if self.manager.visit() {
            return None;
        }
        match self.probe() {
            Some(v) if v.is_proved() => return Some(v),
            Some(v) if v.is_strong_disproved() => return None,
            _ => {}
        }

        if !<P::Opponent as Turn>::five_points(&self.board).is_empty() {
            return None;
        }
        if remain <= 2 && P::five_points(&self.board).is_empty() {
            return None;
        }

        let replies = candidates_and::<P>(&self.board, remain, &self.config, false);
        let mut worst = if replies.implicit_loss {
            SearchValue::proved(4)
        } else {
            SearchValue::proved(1)
        };

        for mv in replies.moves {
            let Some(subtree) = tree.get(mv) else {
                trace!("simulation: reply {mv} not in cached tree");
                return None;
            };
            self.make_move(mv);
            let result = self.simulate_or::<P>(subtree, remain - 1);
            self.undo_move(mv);

            worst = worst.min(result?.step_up());
        }

        self.record(worst);
        Some(worst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, MoveList, Stone};
    use crate::config::SolverConfig;
    use crate::search::ordering::{BlackTurn, WhiteTurn};
    use crate::search::solver::{SearchConfig, VlmSolver};

    fn mv(s: &str) -> Move {
        s.parse().unwrap()
    }

    fn solver_for(moves: &str, use_simulation: bool) -> VlmSolver {
        let moves: MoveList = moves.parse().unwrap();
        let config = SolverConfig {
            table_size_mb: 4,
            use_simulation,
            ..SolverConfig::default()
        };
        VlmSolver::new(&moves, config).unwrap()
    }

    fn sample_tree() -> ProofTree {
        // gh, then fh or kh, each answered by the other end
        let mut replies = ProofTree::default();
        replies.add(mv("fh"), ProofTree::leaf(mv("kh")));
        replies.add(mv("kh"), ProofTree::leaf(mv("fh")));
        let mut tree = ProofTree::default();
        tree.add(mv("gh"), replies);
        tree
    }

    #[test]
    fn test_tree_shape() {
        let tree = sample_tree();
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.first_move(), Some(mv("gh")));
        assert_eq!(tree.lines().len(), 2);
        assert_eq!(tree.lines()[1], vec![mv("gh"), mv("kh"), mv("fh")]);
        assert!(tree.get(mv("gh")).unwrap().get(mv("pp")).is_none());
        assert!(ProofTree::default().lines().is_empty());
    }

    #[test]
    fn test_tree_display() {
        assert_eq!(sample_tree().to_string(), "gh(fhkh)(khfh)");
        assert_eq!(ProofTree::leaf(mv("lh")).to_string(), "lh");
        assert_eq!(ProofTree::default().to_string(), "");
    }

    #[test]
    fn test_principal_line_prefers_deepest_reply() {
        let mut replies = ProofTree::default();
        replies.add(mv("aa"), ProofTree::leaf(mv("kh")));
        let mut long = ProofTree::default();
        let mut inner = ProofTree::default();
        inner.add(mv("bb"), ProofTree::leaf(mv("cc")));
        long.add(mv("jj"), inner);
        replies.add(mv("pp"), long);
        let mut tree = ProofTree::default();
        tree.add(mv("gh"), replies);

        let line = tree.principal_line();
        assert_eq!(line, vec![mv("gh"), mv("pp"), mv("jj"), mv("bb"), mv("cc")]);
    }

    #[test]
    fn test_reconstructed_lines_end_in_five() {
        let mut solver = solver_for("hhaaihabjhac", true);
        let result = solver.solve(5, false);
        assert!(result.solved);

        let root = *solver.board();
        for line in result.proof_tree.lines() {
            let mut board = root;
            let attacker = board.side_to_move();
            for &m in &line[..line.len() - 1] {
                board.play(m);
            }
            let last = line[line.len() - 1].pos().unwrap();
            assert!(crate::rules::makes_five(&board, last, attacker));
            assert_eq!(line.len() % 2, 1);
        }
    }

    #[test]
    fn test_reconstruction_requires_proved_root() {
        let mut solver = solver_for("hhhg", true);
        solver.solve(3, false);
        assert!(solver.root_proof_tree(false).is_none());
    }

    #[test]
    fn test_summarize_never_grows_tree() {
        let mut solver = solver_for("hhaaihabjhac", true);
        assert!(solver.solve(5, false).solved);
        let full = solver.root_proof_tree(false).unwrap();
        let summary = solver.root_proof_tree(true).unwrap();
        assert!(summary.lines().len() <= full.lines().len());
        assert_eq!(summary.first_move(), full.first_move());
    }

    #[test]
    fn test_simulation_success_agrees_with_search() {
        // Prove the open three, then replay its tree after an unrelated
        // black corner stone and a white pass
        let mut solver = solver_for("hhaaihabjhac", false);
        assert!(solver.solve(3, false).solved);
        let tree = solver.root_proof_tree(false).unwrap();

        let mut replay = solver_for("hhaaihabjhacoopp", false);
        let simulated = replay.simulate_or::<BlackTurn>(&tree, 3);
        let simulated = simulated.expect("tree covers the shifted position");
        assert!(simulated.is_proved());

        let mut fresh = solver_for("hhaaihabjhacoopp", false);
        let search = SearchConfig {
            remain: 3,
            detect_dual: false,
            is_search: true,
        };
        let searched = fresh.solve_or::<BlackTurn>(&search);
        assert_eq!(searched, simulated);
    }

    #[test]
    fn test_simulation_fails_closed() {
        // Unrelated tree: no edge is playable here
        let mut tree = ProofTree::default();
        tree.add(mv("aa"), ProofTree::leaf(mv("ab")));
        let mut solver = solver_for("hhaaihabjhac", false);
        assert_eq!(solver.simulate_or::<BlackTurn>(&tree, 3), None);
        assert_eq!(solver.simulate_or::<BlackTurn>(&ProofTree::default(), 3), None);
    }

    // White eh fh _ hh is a split three; any block is met by gi, a double
    // three through fh. Win in 7 with three defender replies at ply 2.
    const SEVEN_PLY_WIN: &str = "aaikoaekaohhooehah";

    #[test]
    fn test_in_search_simulation_matches_full_search() {
        let with = solver_for(SEVEN_PLY_WIN, true).solve(7, false);
        let without = solver_for(SEVEN_PLY_WIN, false).solve(7, false);

        assert!(with.stats.proof_tree_success > 0);
        assert!(with.stats.simulation_count > 0);
        assert_eq!(with.stats.simulation_success, with.stats.simulation_count);
        assert_eq!(without.stats.simulation_count, 0);

        assert_eq!(with.outcome(), without.outcome());
        assert_eq!(with.search_depth, 7);
        assert_eq!(with.search_depth, without.search_depth);
        assert_eq!(with.proof_tree, without.proof_tree);
        assert_eq!(
            with.proof_tree.to_string(),
            "fh(dhgippfjigdl)(ghgippfjigdl)(ihgippfjigdl)"
        );
    }

    fn assert_replies_complete<P: Turn>(board: &mut Board, tree: &ProofTree, remain: i16, config: &SolverConfig) {
        for edge in &tree.children {
            board.play(edge.mv);
            if !edge.subtree.is_empty() {
                let expected = candidates_and::<P>(board, remain - 1, config, false).moves;
                let replies: Vec<Move> = edge.subtree.children.iter().map(|e| e.mv).collect();
                assert_eq!(replies.as_slice(), expected.as_slice(), "after {}", edge.mv);

                for reply in &edge.subtree.children {
                    board.play(reply.mv);
                    assert_replies_complete::<P>(board, &reply.subtree, remain - 2, config);
                    board.unplay(reply.mv);
                }
            }
            board.unplay(edge.mv);
        }
    }

    #[test]
    fn test_defender_nodes_hold_every_reply() {
        for (moves, depth) in [("hhaaihabjhac", 3), ("aaihaojhoakiookjag", 5), (SEVEN_PLY_WIN, 7)] {
            let mut solver = solver_for(moves, true);
            let result = solver.solve(depth, false);
            assert!(result.solved, "{moves}");
            assert_eq!(result.search_depth, depth);

            let mut board = *solver.board();
            let config = solver.config().clone();
            match board.side_to_move() {
                Stone::White => {
                    assert_replies_complete::<WhiteTurn>(&mut board, &result.proof_tree, depth, &config)
                }
                _ => assert_replies_complete::<BlackTurn>(&mut board, &result.proof_tree, depth, &config),
            }
            assert_eq!(board, *solver.board());
        }
    }
}
