//! Pearson correlation with a two-sided p-value.
//!
//! The p-value uses the Student-t distribution via `statrs`.

use statrs::distribution::{ContinuousCDF, StudentsT};

use super::{StatsError, complete_pairs};
use crate::data::model::Dataset;

/// Result of a Pearson test on the pairwise-complete rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    /// Coefficient, always within [-1, 1].
    pub r: f64,
    /// Two-sided p-value, always within [0, 1].
    pub p_value: f64,
    /// Number of overlapping pairs used.
    pub n: usize,
}

/// Pearson correlation between two row-aligned columns.
///
/// Pairs where either side is missing are dropped first.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Result<Correlation, StatsError> {
    let (x, y) = complete_pairs(xs, ys);
    pearson_complete(&x, &y)
}

/// Pearson correlation on already-paired values.
pub fn pearson_complete(x: &[f64], y: &[f64]) -> Result<Correlation, StatsError> {
    let n = x.len().min(y.len());
    if n < 2 {
        return Err(StatsError::NotEnoughData { needed: 2, found: n });
    }
    let (x, y) = (&x[..n], &y[..n]);

    let n_f = n as f64;
    let mx = x.iter().sum::<f64>() / n_f;
    let my = y.iter().sum::<f64>() / n_f;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mx;
        let dy = yi - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 || !sxx.is_finite() || !syy.is_finite() {
        return Err(StatsError::ConstantInput);
    }

    let r = (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0);
    Ok(Correlation {
        r,
        p_value: two_sided_p(r, n),
        n,
    })
}

/// p-value of `t = r * sqrt((n - 2) / (1 - r²))` under H0: rho = 0.
fn two_sided_p(r: f64, n: usize) -> f64 {
    // Two points always lie on a line.
    if n <= 2 {
        return 1.0;
    }
    let df = (n - 2) as f64;
    let one_minus_r2 = 1.0 - r * r;
    if one_minus_r2 <= 0.0 {
        return 0.0;
    }
    let t = r.abs() * (df / one_minus_r2).sqrt();

    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => {
            // Lower tail keeps precision where `1 - cdf(t)` cancels to zero.
            let p = 2.0 * dist.cdf(-t);
            if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 }
        }
        Err(_) => 1.0,
    }
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Precision at which thresholds are compared against (rounded) cells.
pub const THRESHOLD_DECIMALS: i32 = 2;

fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}

/// Rectangular matrix of pairwise-complete Pearson coefficients.
/// Cells that cannot be computed hold `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub rows: Vec<String>,
    pub cols: Vec<String>,
    /// Row-major, `values[i][j]` = r(rows[i], cols[j]).
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlate each `rows` column with each `cols` column of the dataset.
    /// Names absent from the dataset are skipped.
    pub fn compute(dataset: &Dataset, rows: &[String], cols: &[String]) -> Self {
        let fetch = |names: &[String]| -> Vec<(String, Vec<Option<f64>>)> {
            names
                .iter()
                .filter_map(|n| dataset.column(n).map(|c| (n.clone(), c.numeric())))
                .collect()
        };
        let row_data = fetch(rows);
        let col_data = fetch(cols);

        let values = row_data
            .iter()
            .map(|(rn, rv)| {
                col_data
                    .iter()
                    .map(|(cn, cv)| {
                        if rn == cn {
                            // Matches the dataframe convention for a column with variance.
                            return pearson(rv, cv).map(|_| 1.0).unwrap_or(f64::NAN);
                        }
                        pearson(rv, cv).map(|c| c.r).unwrap_or(f64::NAN)
                    })
                    .collect()
            })
            .collect();

        CorrelationMatrix {
            rows: row_data.into_iter().map(|(n, _)| n).collect(),
            cols: col_data.into_iter().map(|(n, _)| n).collect(),
            values,
        }
    }

    /// Square matrix over every numeric column of the dataset.
    pub fn numeric(dataset: &Dataset) -> Self {
        let names = dataset.numeric_column_names();
        Self::compute(dataset, &names, &names)
    }

    pub fn rounded(&self, decimals: i32) -> Self {
        CorrelationMatrix {
            rows: self.rows.clone(),
            cols: self.cols.clone(),
            values: self
                .values
                .iter()
                .map(|row| row.iter().map(|&v| round_to(v, decimals)).collect())
                .collect(),
        }
    }

    /// Blank (`NaN`) every cell with `|r| < threshold` and the `r = 1` cells.
    ///
    /// The threshold is compared at [`THRESHOLD_DECIMALS`] decimals, so slider
    /// steps like `0.35000000000000003` keep a cell of `0.35`.
    pub fn threshold_mask(&self, threshold: f64) -> Self {
        let threshold = round_to(threshold, THRESHOLD_DECIMALS);
        CorrelationMatrix {
            rows: self.rows.clone(),
            cols: self.cols.clone(),
            values: self
                .values
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|&v| {
                            if v.abs() >= threshold && v != 1.0 {
                                v
                            } else {
                                f64::NAN
                            }
                        })
                        .collect()
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::{CellValue, Column};

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn perfect_positive_and_negative() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let up = pearson_complete(&x, &[2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
        assert!(close(up.r, 1.0, 1e-12));
        assert!(up.p_value < 1e-6);

        let down = pearson_complete(&x, &[5.0, 4.0, 3.0, 2.0, 1.0]).unwrap();
        assert!(close(down.r, -1.0, 1e-12));
    }

    #[test]
    fn known_value_and_p() {
        // r = 0.8 with n = 5 gives t = 2.3094, p = 0.1041 (two-sided, df 3).
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 1.0, 4.0, 3.0, 5.0];
        let c = pearson_complete(&x, &y).unwrap();
        assert!(close(c.r, 0.8, 1e-12), "r = {}", c.r);
        assert!(close(c.p_value, 0.1041, 1e-3), "p = {}", c.p_value);
        assert_eq!(c.n, 5);
    }

    #[test]
    fn tiny_p_values_do_not_collapse_to_zero() {
        // r ≈ 0.45 over 1500 rows: t ≈ 19, p far below f64 epsilon.
        let x: Vec<f64> = (0..1500).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|&v| v + 1200.0 * v.sin()).collect();
        let c = pearson_complete(&x, &y).unwrap();
        assert!(c.r > 0.3 && c.r < 0.6, "r = {}", c.r);
        assert!(c.p_value > 0.0, "p = {}", c.p_value);
        assert!(c.p_value < 1e-20, "p = {}", c.p_value);
    }

    #[test]
    fn two_points_have_p_of_one() {
        let c = pearson_complete(&[1.0, 2.0], &[3.0, 1.0]).unwrap();
        assert!(close(c.r, -1.0, 1e-12));
        assert_eq!(c.p_value, 1.0);
    }

    #[test]
    fn missing_pairs_are_dropped() {
        let c = pearson(
            &[Some(1.0), None, Some(2.0), Some(3.0)],
            &[Some(1.0), Some(100.0), None, Some(3.0)],
        )
        .unwrap();
        assert_eq!(c.n, 2);
    }

    #[test]
    fn too_little_or_constant_data_is_an_error() {
        assert_eq!(
            pearson(&[Some(1.0), None], &[Some(1.0), Some(2.0)]),
            Err(StatsError::NotEnoughData { needed: 2, found: 1 })
        );
        assert_eq!(
            pearson_complete(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]),
            Err(StatsError::ConstantInput)
        );
    }

    fn dataset() -> Dataset {
        let col = |name: &str, v: &[f64]| {
            Column::new(name, v.iter().map(|&x| CellValue::Float(x)).collect())
        };
        Dataset::from_columns(vec![
            col("testosterone", &[1.0, 2.0, 3.0, 4.0]),
            col("lead_µg/dL", &[2.0, 5.0, 5.5, 8.0]),
            col("constant", &[5.0, 5.0, 5.0, 5.0]),
        ])
        .unwrap()
    }

    #[test]
    fn matrix_skips_absent_columns_and_marks_undefined() {
        let ds = dataset();
        let m = CorrelationMatrix::compute(
            &ds,
            &["testosterone".into(), "estradiol".into()],
            &["lead_µg/dL".into(), "constant".into()],
        );
        assert_eq!(m.rows, vec!["testosterone"]);
        assert_eq!(m.cols, vec!["lead_µg/dL", "constant"]);
        assert!(close(m.values[0][0], 0.970, 1e-3));
        assert!(m.values[0][1].is_nan());
    }

    #[test]
    fn threshold_blanks_weak_and_diagonal_cells() {
        let m = CorrelationMatrix::numeric(&dataset()).rounded(2);
        assert_eq!(m.values[0][0], 1.0);
        let masked = m.threshold_mask(0.3);
        assert!(masked.values[0][0].is_nan());
        assert!(!masked.values[0][1].is_nan());
        assert!(masked.values[2][2].is_nan());
    }

    #[test]
    fn threshold_ignores_slider_float_drift() {
        let m = CorrelationMatrix {
            rows: vec!["a".into(), "b".into()],
            cols: vec!["a".into(), "b".into()],
            values: vec![vec![1.0, 0.35], vec![-0.35, 1.0]],
        };
        let step = 0.35000000000000003;
        assert_ne!(step, 0.35);
        let masked = m.threshold_mask(step);
        assert_eq!(masked.values[0][1], 0.35);
        assert_eq!(masked.values[1][0], -0.35);
        assert!(m.threshold_mask(0.36).values[0][1].is_nan());
    }

    proptest! {
        #[test]
        fn r_and_p_stay_in_range(
            pairs in prop::collection::vec(
                (prop::option::of(-1e3f64..1e3), prop::option::of(-1e3f64..1e3)),
                0..60,
            )
        ) {
            let (xs, ys): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
            match pearson(&xs, &ys) {
                Ok(c) => {
                    prop_assert!(c.n >= 2);
                    prop_assert!((-1.0..=1.0).contains(&c.r));
                    prop_assert!((0.0..=1.0).contains(&c.p_value));
                }
                Err(StatsError::NotEnoughData { found, .. }) => prop_assert!(found < 2),
                Err(StatsError::ConstantInput) => {}
            }
        }
    }
}
