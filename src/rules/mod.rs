//! Game rules for Renju
//!
//! This module implements the rule set including:
//! - Win conditions (exact five for black, five or more for white)
//! - Forbidden moves for black (overline, double-four, double-three)
//! - Tactical pattern points used by the solver's move generators

pub mod forbidden;
pub mod threat;
pub mod win;
mod window;

// Re-exports for convenient access
pub use forbidden::{forbidden_points, is_forbidden, is_legal, legal_points};
pub use threat::{open_four_points, open_four_points_from, ThreatMap};
pub use win::{five_points, has_five, makes_five};
