//! Descriptive statistics behind the charts.
//!
//! Everything here works on plain `f64` slices (or row-aligned
//! `Option<f64>` slices where pairs must be matched), so the UI layer only
//! has to pull columns out of the [`Dataset`](crate::data::model::Dataset).

pub mod binning;
pub mod correlation;
pub mod density;
pub mod regression;
pub mod summary;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StatsError {
    #[error("need at least {needed} overlapping values, found {found}")]
    NotEnoughData { needed: usize, found: usize },
    #[error("input is constant, the statistic is undefined")]
    ConstantInput,
}

/// Keep only the positions where both sides are present.
pub fn complete_pairs(xs: &[Option<f64>], ys: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    xs.iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_pairs_drops_either_side_missing() {
        let (x, y) = complete_pairs(
            &[Some(1.0), None, Some(3.0), Some(4.0)],
            &[Some(10.0), Some(20.0), None, Some(40.0)],
        );
        assert_eq!(x, vec![1.0, 4.0]);
        assert_eq!(y, vec![10.0, 40.0]);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }
}
