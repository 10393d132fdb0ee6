//! Loose/FO/tight classification tables
//!
//! One submodule per object kind. Every predicate is a pure function of
//! the object's stored attributes and the identification context
//! stamped on it at construction; there is no global "active ID" state.
//!
//! The tiers are layered so that tight ⊆ FO ⊆ loose by construction:
//! each tier starts by requiring the previous one.

use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub mod electron;
pub mod jet;
pub mod muon;
pub mod tau;

/// Lepton identification tier
#[derive(
    Deserialize,
    Serialize,
    Display,
    EnumString,
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
#[strum(ascii_case_insensitive)]
pub enum SelectionTier {
    Loose,
    #[strum(serialize = "FO")]
    FO,
    Tight,
}

/// Linear interpolation between two (x, cut) anchor points
///
/// Clamped flat outside the anchor range: `x ≤ x_min` gives the left
/// cut, `x ≥ x_max` the right cut.
pub fn slide_cut(x: N64, low: (N64, N64), high: (N64, N64)) -> N64 {
    let (x_min, left) = low;
    let (x_max, right) = high;
    if x <= x_min {
        left
    } else if x >= x_max {
        right
    } else {
        left + (x - x_min) / (x_max - x_min) * (right - left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_cut_clamps_and_interpolates() {
        let low = (n64(20.), n64(0.3));
        let high = (n64(45.), n64(0.05));
        assert_eq!(slide_cut(n64(10.), low, high), n64(0.3));
        assert_eq!(slide_cut(n64(20.), low, high), n64(0.3));
        assert_eq!(slide_cut(n64(45.), low, high), n64(0.05));
        assert_eq!(slide_cut(n64(100.), low, high), n64(0.05));
        let mid = slide_cut(n64(32.5), low, high);
        assert!((mid - n64(0.175)).abs() < 1e-12);
        // monotone in between
        assert!(slide_cut(n64(25.), low, high) > mid);
        assert!(slide_cut(n64(40.), low, high) < mid);
    }
}
