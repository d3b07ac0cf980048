//! Candidate generation and move ordering for OR and AND nodes
//!
//! The acting player is a type parameter. [`Turn`] bundles everything that
//! differs between the colours (legality, win detection, pattern points), so
//! the solver is written once and monomorphised for each attacker.

use smallvec::SmallVec;

use crate::board::{Bitboard, Board, Move, Pos, Stone};
use crate::config::SolverConfig;
use crate::rules::{self, ThreatMap};

pub type MoveVec = SmallVec<[Move; 64]>;

/// Capabilities of one player.
pub trait Turn {
    const STONE: Stone;
    type Opponent: Turn;

    #[inline]
    fn is_legal(board: &Board, pos: Pos) -> bool {
        rules::is_legal(board, pos, Self::STONE)
    }

    #[inline]
    fn legal_points(board: &Board) -> Bitboard {
        rules::legal_points(board, Self::STONE)
    }

    #[inline]
    fn five_points(board: &Board) -> Bitboard {
        rules::five_points(board, Self::STONE)
    }

    #[inline]
    fn threats(board: &Board) -> ThreatMap {
        ThreatMap::compute(board, Self::STONE)
    }

    #[inline]
    fn open_four_points(board: &Board) -> Bitboard {
        rules::open_four_points(board, Self::STONE)
    }
}

pub struct BlackTurn;
pub struct WhiteTurn;

impl Turn for BlackTurn {
    const STONE: Stone = Stone::Black;
    type Opponent = WhiteTurn;
}

impl Turn for WhiteTurn {
    const STONE: Stone = Stone::White;
    type Opponent = BlackTurn;

    #[inline]
    fn is_legal(board: &Board, pos: Pos) -> bool {
        board.is_empty(pos)
    }

    #[inline]
    fn legal_points(board: &Board) -> Bitboard {
        board.empties()
    }
}

/// Emit moves tier by tier, each cell at most once.
struct TierSink {
    remaining: Bitboard,
    moves: MoveVec,
}

impl TierSink {
    fn new(pool: Bitboard) -> Self {
        Self {
            remaining: pool,
            moves: MoveVec::new(),
        }
    }

    fn take(&mut self, tier: Bitboard) {
        for p in (tier & self.remaining).iter_ones() {
            self.remaining.clear(p);
            self.moves.push(Move::Place(p));
        }
    }

    fn finish(mut self) -> MoveVec {
        let rest = self.remaining;
        self.take(rest);
        self.moves
    }
}

/// Attacker `P` to move.
///
/// If the defender threatens five the only candidate is the block.
/// Otherwise every legal cell, ordered most forcing first when `ordered`.
pub fn candidates_or<P: Turn>(
    board: &Board,
    remain: i16,
    config: &SolverConfig,
    ordered: bool,
) -> MoveVec {
    let defender_fives = <P::Opponent as Turn>::five_points(board);
    if let Some(block) = defender_fives.iter_ones().next() {
        return MoveVec::from_slice(&[Move::Place(block)]);
    }

    let legal = P::legal_points(board);
    if !ordered {
        return legal.iter_ones().map(Move::Place).collect();
    }

    let map = P::threats(board);
    let mut sink = TierSink::new(legal);
    sink.take(map.four_three());
    if remain >= config.ordering_depth {
        sink.take(map.threat_with_sword());
        sink.take(map.mise());
        sink.take(map.any_sword());
        sink.take(map.any_two());
    }
    sink.take(map.any_four());
    sink.take(map.any_three());
    sink.finish()
}

/// Replies available to the defender when attacker `P` has just moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndCandidates {
    pub moves: MoveVec,
    /// Replies were pruned because they lose within three plies; the node
    /// is worth at most `Proved(4)` to the defender.
    pub implicit_loss: bool,
}

/// Defender (`P::Opponent`) to move against attacker `P`.
///
/// 1. Attacker threatens five: the block, or a pass when blocking is illegal.
/// 2. Attacker can make an open four next ply (only with `remain >= 4`):
///    replies that leave no open four plus the defender's own fours, or a
///    pass when there are none.
/// 3. Otherwise every legal cell plus a pass.
pub fn candidates_and<P: Turn>(
    board: &Board,
    remain: i16,
    config: &SolverConfig,
    ordered: bool,
) -> AndCandidates {
    let attacker_fives = P::five_points(board);
    if let Some(five) = attacker_fives.iter_ones().next() {
        let reply = if <P::Opponent as Turn>::is_legal(board, five) {
            Move::Place(five)
        } else {
            Move::Pass
        };
        return AndCandidates {
            moves: MoveVec::from_slice(&[reply]),
            implicit_loss: false,
        };
    }

    if remain >= 4 {
        let open_fours = P::open_four_points(board);
        if !open_fours.is_empty() {
            let mut moves: MoveVec = open_four_defences::<P>(board, open_fours)
                .iter_ones()
                .map(Move::Place)
                .collect();
            if moves.is_empty() {
                moves.push(Move::Pass);
            }
            return AndCandidates {
                moves,
                implicit_loss: true,
            };
        }
    }

    let legal = <P::Opponent as Turn>::legal_points(board);
    let moves = if ordered && remain >= config.and_ordering_depth {
        let defender = <P::Opponent as Turn>::threats(board);
        let attacker = P::threats(board);
        let mut sink = TierSink::new(legal);
        sink.moves.push(Move::Pass);
        sink.take(defender.any_three());
        sink.take(attacker.any_four());
        sink.finish()
    } else {
        let mut moves: MoveVec = legal.iter_ones().map(Move::Place).collect();
        moves.push(Move::Pass);
        moves
    };
    AndCandidates {
        moves,
        implicit_loss: false,
    }
}

/// Defender cells that stop every attacker open four, together with the
/// defender's own four-making moves.
fn open_four_defences<P: Turn>(board: &Board, open_fours: Bitboard) -> Bitboard {
    // A defending stone matters only on an open-four point or on one of the
    // five points it would create.
    let mut relevant = open_fours;
    for p in open_fours.iter_ones() {
        let mut next = *board;
        next.place_stone(p, P::STONE);
        relevant |= P::five_points(&next);
    }

    let mut defences: Bitboard = relevant
        .iter_ones()
        .filter(|&q| <P::Opponent as Turn>::is_legal(board, q))
        .filter(|&q| {
            let mut next = *board;
            next.place_stone(q, <P::Opponent as Turn>::STONE);
            P::open_four_points(&next).is_empty()
        })
        .collect();

    let counter_fours = <P::Opponent as Turn>::threats(board).any_four();
    defences |= counter_fours
        .iter_ones()
        .filter(|&q| <P::Opponent as Turn>::is_legal(board, q))
        .collect();
    defences
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(s: &str) -> Move {
        s.parse().unwrap()
    }

    #[test]
    fn test_or_must_block_defender_four() {
        // White to move, black threatens five at lh
        let board = Board::from_moves_str("hhhgihghjhggkh").unwrap();
        let cfg = SolverConfig::default();
        let moves = candidates_or::<WhiteTurn>(&board, 5, &cfg, true);
        assert_eq!(moves.as_slice(), &[place("lh")]);
    }

    #[test]
    fn test_and_blocks_attacker_four() {
        let board = Board::from_moves_str("hhhgihghjhggkh").unwrap();
        let cfg = SolverConfig::default();
        let and = candidates_and::<BlackTurn>(&board, 4, &cfg, true);
        assert_eq!(and.moves.as_slice(), &[place("lh")]);
        assert!(!and.implicit_loss);
    }

    #[test]
    fn test_or_all_open_cells() {
        let board = Board::from_moves_str("hhhgihghjhgg").unwrap();
        let cfg = SolverConfig::default();
        let unordered = candidates_or::<BlackTurn>(&board, 3, &cfg, false);
        assert_eq!(unordered.len(), 219);
        let mut ordered = candidates_or::<BlackTurn>(&board, 7, &cfg, true);
        assert_eq!(ordered.len(), 219);
        ordered.sort();
        let mut unordered = unordered;
        unordered.sort();
        assert_eq!(ordered, unordered);
    }

    #[test]
    fn test_or_four_points_lead() {
        // Black hh ih jh is closed by white gh: kh and lh make fours
        let board = Board::from_moves_str("hhhgihghjhgg").unwrap();
        let cfg = SolverConfig::default();
        let moves = candidates_or::<BlackTurn>(&board, 3, &cfg, true);
        assert_eq!(&moves[..2], &[place("kh"), place("lh")]);
    }

    #[test]
    fn test_and_all_cells_plus_pass() {
        let board = Board::from_moves_str("hhhgihghjhgg").unwrap();
        let cfg = SolverConfig::default();
        let and = candidates_and::<WhiteTurn>(&board, 2, &cfg, false);
        assert_eq!(and.moves.len(), 220);
        assert_eq!(and.moves.last(), Some(&Move::Pass));
    }

    #[test]
    fn test_and_ordering_puts_pass_first() {
        let board = Board::from_moves_str("hhhgihghjhgg").unwrap();
        let cfg = SolverConfig::default();
        let and = candidates_and::<WhiteTurn>(&board, 4, &cfg, true);
        assert_eq!(and.moves.len(), 220);
        assert_eq!(and.moves[0], Move::Pass);
    }

    #[test]
    fn test_and_against_open_three() {
        // White to move against black's open three hh ih jh
        let board = Board::from_moves_str("hhaaihoajhao").unwrap();
        let cfg = SolverConfig::default();
        let and = candidates_and::<BlackTurn>(&board, 4, &cfg, true);
        assert!(and.implicit_loss);
        let moves: Vec<String> = and.moves.iter().map(|m| m.to_string()).collect();
        assert!(moves.contains(&"gh".to_string()));
        assert!(moves.contains(&"kh".to_string()));
        assert!(!moves.contains(&"pp".to_string()));
        // Far away cells are pruned
        assert!(!moves.contains(&"hb".to_string()));
    }
}
