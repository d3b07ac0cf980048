//! Dual solution ("cook") detection
//!
//! A dual is an attacker node with two winning moves that are not mirror
//! images of each other under the position's own symmetries. The detector
//! follows the first winning move down the tree; at a defender node the
//! cook only counts if every reply leads into one, since a single clean
//! reply already pins the intended line.

use super::ordering::Turn;
use super::proof::ProofTree;
use super::solver::VlmSolver;
use super::tt::TableHandle;
use crate::board::board_symmetries;

impl<T: TableHandle> VlmSolver<T> {
    /// Cooks below the OR node at the current position, as a tree of the
    /// distinct winning moves leading to them.
    pub(super) fn find_dual_or<P: Turn>(&mut self, tree: &ProofTree) -> Option<ProofTree> {
        let symmetries = board_symmetries(&self.board);
        let mut distinct = ProofTree::default();
        for edge in &tree.children {
            let mirrored = distinct.children.iter().any(|seen| {
                symmetries
                    .iter()
                    .any(|sym| sym.apply_move(seen.mv) == edge.mv)
            });
            if !mirrored {
                distinct.add(edge.mv, edge.subtree.clone());
            }
        }
        if distinct.len() >= 2 {
            return Some(distinct);
        }

        let edge = tree.children.first()?;
        self.make_move(edge.mv);
        let below = self.find_dual_and::<P>(&edge.subtree);
        self.undo_move(edge.mv);

        below.map(|subtree| {
            let mut dual = ProofTree::default();
            dual.add(edge.mv, subtree);
            dual
        })
    }

    fn find_dual_and<P: Turn>(&mut self, tree: &ProofTree) -> Option<ProofTree> {
        if tree.is_empty() {
            return None;
        }
        let mut dual = ProofTree::default();
        for edge in &tree.children {
            self.make_move(edge.mv);
            let below = self.find_dual_or::<P>(&edge.subtree);
            self.undo_move(edge.mv);

            dual.add(edge.mv, below?);
        }
        Some(dual)
    }
}
