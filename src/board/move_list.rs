//! Move sequences in the two-letter text notation (`hhhgih...`)

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;
use thiserror::Error;

use super::{Move, Pos, BOARD_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("move string has odd length {0}")]
    OddLength(usize),
    #[error("move '{0}' must be two characters")]
    BadLength(String),
    #[error("invalid coordinate character '{0}'")]
    InvalidChar(char),
    #[error("coordinate '{0}' is off the board")]
    OffBoard(String),
}

/// An ordered sequence of moves, black first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MoveList {
    moves: SmallVec<[Move; 32]>,
}

impl MoveList {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<Move> {
        self.moves.pop()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> {
        self.moves.iter()
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    /// True when black is the next to move.
    #[inline]
    pub fn is_black_turn(&self) -> bool {
        self.moves.len() % 2 == 0
    }
}

fn parse_coord(c: char) -> Result<u8, MoveParseError> {
    if !c.is_ascii_lowercase() {
        return Err(MoveParseError::InvalidChar(c));
    }
    Ok(c as u8 - b'a')
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 2 {
            return Err(MoveParseError::BadLength(s.to_string()));
        }
        if s == "pp" {
            return Ok(Move::Pass);
        }
        let col = parse_coord(chars[0])?;
        let row = parse_coord(chars[1])?;
        if col as usize >= BOARD_SIZE || row as usize >= BOARD_SIZE {
            return Err(MoveParseError::OffBoard(s.to_string()));
        }
        Ok(Move::Place(Pos::new(row, col)))
    }
}

impl FromStr for MoveList {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let chars: Vec<char> = s.chars().collect();
        if chars.len() % 2 != 0 {
            return Err(MoveParseError::OddLength(chars.len()));
        }
        let mut list = MoveList::new();
        for pair in chars.chunks(2) {
            let token: String = pair.iter().collect();
            list.push(token.parse()?);
        }
        Ok(list)
    }
}

impl fmt::Display for MoveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mv in &self.moves {
            write!(f, "{mv}")?;
        }
        Ok(())
    }
}

impl FromIterator<Move> for MoveList {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        Self {
            moves: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_center_and_pass() {
        let list: MoveList = "hhpphg".parse().unwrap();
        assert_eq!(
            list.as_slice(),
            &[
                Move::Place(Pos::new(7, 7)),
                Move::Pass,
                Move::Place(Pos::new(6, 7)),
            ]
        );
        assert!(!list.is_black_turn());
        assert_eq!(list.to_string(), "hhpphg");
    }

    #[test]
    fn test_column_comes_first() {
        let mv: Move = "ab".parse().unwrap();
        assert_eq!(mv, Move::Place(Pos::new(1, 0)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("hhh".parse::<MoveList>(), Err(MoveParseError::OddLength(3)));
        assert_eq!(
            "hz".parse::<MoveList>(),
            Err(MoveParseError::OffBoard("hz".to_string()))
        );
        assert_eq!("h1".parse::<MoveList>(), Err(MoveParseError::InvalidChar('1')));
    }

    #[test]
    fn test_single_move_must_be_two_characters() {
        for token in ["", "h", "hhh", "hhhg"] {
            assert_eq!(
                token.parse::<Move>(),
                Err(MoveParseError::BadLength(token.to_string()))
            );
        }
        // A multibyte character counts once
        assert_eq!("é".parse::<Move>(), Err(MoveParseError::BadLength("é".to_string())));
        assert_eq!("pp".parse::<Move>(), Ok(Move::Pass));
    }

    #[test]
    fn test_empty_string() {
        let list: MoveList = "".parse().unwrap();
        assert!(list.is_empty());
        assert!(list.is_black_turn());
    }
}
