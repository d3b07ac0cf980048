//! Search outcome encoding
//!
//! A [`SearchValue`] packs three disjoint ranges into one ordered `i16`:
//!
//! ```text
//! i16::MIN              StrongDisproved   the defender has a forced counter-win
//! MIN + 1 ..= MIN + M   Weak(1..=M)       nothing found within d plies
//! ProvedLB ..= ProvedUB Proved(M..=1)     forced win in d plies, shorter is larger
//! ```
//!
//! with `M = TOTAL_CELLS`. Plain integer comparison orders the outcomes, so
//! OR nodes combine children with `max` and AND nodes with `min`.

use std::fmt;

use crate::board::TOTAL_CELLS;

/// Largest ply distance a value can carry.
pub const MAX_PLY: i16 = TOTAL_CELLS as i16;

const STRONG: i16 = i16::MIN;
const WEAK_LB: i16 = STRONG + 1;
const WEAK_UB: i16 = STRONG + MAX_PLY;
const PROVED_LB: i16 = WEAK_UB + 1;
const PROVED_UB: i16 = PROVED_LB + MAX_PLY - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchValue(i16);

impl SearchValue {
    pub const STRONG_DISPROVED: SearchValue = SearchValue(STRONG);

    /// Returned by a node that noticed termination. Never stored.
    pub const ABORTED: SearchValue = SearchValue(WEAK_UB);

    /// Weak disproof after exhausting `depth` plies.
    #[inline]
    pub const fn weak(depth: i16) -> Self {
        assert!(1 <= depth && depth <= MAX_PLY);
        SearchValue(STRONG + depth)
    }

    /// Forced win in `distance` plies.
    #[inline]
    pub const fn proved(distance: i16) -> Self {
        assert!(1 <= distance && distance <= MAX_PLY);
        SearchValue(PROVED_UB - (distance - 1))
    }

    #[inline]
    pub const fn is_proved(self) -> bool {
        PROVED_LB <= self.0 && self.0 <= PROVED_UB
    }

    #[inline]
    pub const fn is_strong_disproved(self) -> bool {
        self.0 == STRONG
    }

    #[inline]
    pub const fn is_weak_disproved(self) -> bool {
        WEAK_LB <= self.0 && self.0 <= WEAK_UB
    }

    /// Plies to the win. Panics on a value that is not a proof.
    #[inline]
    pub fn distance(self) -> i16 {
        assert!(self.is_proved(), "distance() on non-proved value {self}");
        PROVED_UB - self.0 + 1
    }

    /// Plies exhausted by a weak disproof. Panics otherwise.
    #[inline]
    pub fn weak_depth(self) -> i16 {
        assert!(
            self.is_weak_disproved(),
            "weak_depth() on non-weak value {self}"
        );
        self.0 - STRONG
    }

    /// View a child's value from its parent: a win one ply further away.
    /// Disproofs pass through unchanged.
    #[inline]
    pub fn step_up(self) -> Self {
        if self.is_proved() {
            SearchValue::proved((self.distance() + 1).min(MAX_PLY))
        } else {
            self
        }
    }

    /// Normalize a combined value before storing it: anything that is not
    /// a proof or a strong disproof becomes `Weak(remain)`.
    #[inline]
    pub fn settle(self, remain: i16) -> Self {
        if self.is_proved() || self.is_strong_disproved() {
            self
        } else {
            SearchValue::weak(remain.clamp(1, MAX_PLY))
        }
    }

    /// Whether a stored value answers a query with `remain` plies left.
    #[inline]
    pub fn is_reusable(self, remain: i16) -> bool {
        !self.is_weak_disproved() || self.weak_depth() >= remain
    }

    #[inline]
    pub const fn raw(self) -> i16 {
        self.0
    }
}

impl fmt::Display for SearchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_strong_disproved() {
            write!(f, "StrongDisproved")
        } else if self.is_proved() {
            write!(f, "Proved({})", PROVED_UB - self.0 + 1)
        } else {
            write!(f, "Weak({})", self.0 - STRONG)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds() {
        assert_eq!(SearchValue::proved(1).raw(), PROVED_UB);
        assert_eq!(SearchValue::proved(MAX_PLY).raw(), PROVED_LB);
        assert_eq!(SearchValue::weak(1).raw(), WEAK_LB);
        assert_eq!(SearchValue::weak(MAX_PLY).raw(), WEAK_UB);
        assert!(SearchValue::proved(1).is_proved());
        assert!(SearchValue::proved(MAX_PLY).is_proved());
        assert!(!SearchValue::weak(MAX_PLY).is_proved());
        assert!(SearchValue::STRONG_DISPROVED.is_strong_disproved());
        assert!(!SearchValue::weak(1).is_strong_disproved());
    }

    #[test]
    fn test_distance_roundtrip() {
        for d in 1..=MAX_PLY {
            assert_eq!(SearchValue::proved(d).distance(), d);
            assert_eq!(SearchValue::weak(d).weak_depth(), d);
        }
    }

    #[test]
    fn test_ranges_ordered() {
        let strong = SearchValue::STRONG_DISPROVED;
        assert!(strong < SearchValue::weak(1));
        assert!(SearchValue::weak(MAX_PLY) < SearchValue::proved(MAX_PLY));
        assert!(SearchValue::proved(3) < SearchValue::proved(1));
        assert!(SearchValue::weak(1) < SearchValue::weak(3));
    }

    #[test]
    fn test_step_up() {
        assert_eq!(SearchValue::proved(1).step_up(), SearchValue::proved(2));
        assert_eq!(SearchValue::weak(3).step_up(), SearchValue::weak(3));
        assert_eq!(
            SearchValue::STRONG_DISPROVED.step_up(),
            SearchValue::STRONG_DISPROVED
        );
    }

    #[test]
    fn test_settle() {
        assert_eq!(SearchValue::ABORTED.settle(5), SearchValue::weak(5));
        assert_eq!(SearchValue::proved(3).settle(5), SearchValue::proved(3));
        assert_eq!(
            SearchValue::STRONG_DISPROVED.settle(5),
            SearchValue::STRONG_DISPROVED
        );
    }

    #[test]
    fn test_reusable() {
        assert!(SearchValue::weak(5).is_reusable(3));
        assert!(!SearchValue::weak(3).is_reusable(5));
        assert!(SearchValue::proved(7).is_reusable(3));
        assert!(SearchValue::STRONG_DISPROVED.is_reusable(99));
    }

    #[test]
    #[should_panic]
    fn test_distance_of_weak_panics() {
        SearchValue::weak(2).distance();
    }

    #[test]
    fn test_display() {
        assert_eq!(SearchValue::proved(3).to_string(), "Proved(3)");
        assert_eq!(SearchValue::weak(2).to_string(), "Weak(2)");
        assert_eq!(SearchValue::STRONG_DISPROVED.to_string(), "StrongDisproved");
    }
}
