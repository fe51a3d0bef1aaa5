//! Column rescaling to a 0–100 score.

use serde::{Deserialize, Serialize};

/// Whether a larger raw value is a better score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// `v / max * 100` (strength, service temperature).
    HigherIsBetter,
    /// `(1 - v / max) * 100` (density, cost).
    LowerIsBetter,
}

/// Rescale `values` against their maximum.
///
/// An empty column or one whose maximum is 0 divides by 1 instead, so an
/// all-zero column normalizes to all zeros (direct) rather than NaN. The
/// output is within [0, 100] for non-negative input.
pub fn normalize(values: &[f64], direction: Direction) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let max = if values.is_empty() || max == 0.0 { 1.0 } else { max };

    values
        .iter()
        .map(|v| match direction {
            Direction::HigherIsBetter => v / max * 100.0,
            Direction::LowerIsBetter => (1.0 - v / max) * 100.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_scaling() {
        assert_eq!(normalize(&[50.0, 100.0], Direction::HigherIsBetter), vec![50.0, 100.0]);
    }

    #[test]
    fn inverse_scaling() {
        assert_eq!(normalize(&[50.0, 100.0], Direction::LowerIsBetter), vec![50.0, 0.0]);
    }

    #[test]
    fn all_zero_column_stays_zero() {
        let out = normalize(&[0.0, 0.0, 0.0], Direction::HigherIsBetter);
        assert_eq!(out, vec![0.0, 0.0, 0.0]);
        assert!(out.iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn all_zero_column_inverse_is_full_score() {
        // Nothing reported means nothing to penalise.
        assert_eq!(
            normalize(&[0.0, 0.0], Direction::LowerIsBetter),
            vec![100.0, 100.0]
        );
    }

    #[test]
    fn empty_column() {
        assert!(normalize(&[], Direction::HigherIsBetter).is_empty());
        assert!(normalize(&[], Direction::LowerIsBetter).is_empty());
    }

    #[test]
    fn output_stays_in_range() {
        let raw = [0.0, 3.3, 7.8, 2.7, 11.2];
        for direction in [Direction::HigherIsBetter, Direction::LowerIsBetter] {
            let out = normalize(&raw, direction);
            assert_eq!(out.len(), raw.len());
            assert!(out.iter().all(|v| (0.0..=100.0).contains(v)), "{out:?}");
        }
    }
}
