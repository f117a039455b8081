//! Quantiles, `describe()`-style summaries and box-plot statistics.

use serde::Serialize;

use super::mean;
use crate::data::model::Column;

/// Quantile of already-sorted values, linear interpolation between ranks.
/// Returns `NaN` for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
        }
    }
}

/// Sample standard deviation (n - 1 denominator); `NaN` below two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    v.sort_by(f64::total_cmp);
    v
}

// ---------------------------------------------------------------------------
// describe()
// ---------------------------------------------------------------------------

/// Summary statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    pub const HEADERS: [&'static str; 9] =
        ["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    /// Statistic values in [`Self::HEADERS`] order, excluding the name and count.
    pub fn stats(&self) -> [f64; 7] {
        [
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

pub fn describe(column: &Column) -> ColumnSummary {
    let sorted = sorted_copy(&column.non_missing_f64());
    ColumnSummary {
        column: column.name.clone(),
        count: sorted.len(),
        mean: mean(&sorted).unwrap_or(f64::NAN),
        std: std_dev(&sorted),
        min: sorted.first().copied().unwrap_or(f64::NAN),
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted.last().copied().unwrap_or(f64::NAN),
    }
}

/// Summaries of every numeric column, in table order.
pub fn describe_numeric(columns: &[Column]) -> Vec<ColumnSummary> {
    columns
        .iter()
        .filter(|c| c.is_numeric())
        .map(describe)
        .collect()
}

// ---------------------------------------------------------------------------
// Box-plot statistics
// ---------------------------------------------------------------------------

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub mean: f64,
    /// Points beyond 1.5 IQR from the box.
    pub outliers: Vec<f64>,
    pub n: usize,
}

/// Whiskers reach the furthest data point within 1.5 IQR of the box.
/// `None` for an empty input.
pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    let sorted = sorted_copy(values);
    if sorted.is_empty() {
        return None;
    }
    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let lower_whisker = sorted
        .iter()
        .copied()
        .find(|&v| v >= lo_fence)
        .unwrap_or(q1);
    let upper_whisker = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= hi_fence)
        .unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|&v| v < lo_fence || v > hi_fence)
        .collect();

    Some(BoxSummary {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        mean: mean(&sorted).unwrap_or(f64::NAN),
        outliers,
        n: sorted.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    #[test]
    fn quantile_interpolates_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.0), 1.0);
        assert_eq!(quantile(&v, 0.25), 1.75);
        assert_eq!(quantile(&v, 0.5), 2.5);
        assert_eq!(quantile(&v, 1.0), 4.0);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn describe_matches_dataframe_output() {
        let col = Column::new(
            "estradiol",
            vec![
                CellValue::Integer(1),
                CellValue::Integer(2),
                CellValue::Missing,
                CellValue::Integer(3),
                CellValue::Integer(4),
            ],
        );
        let s = describe(&col);
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, 2.5);
        assert!((s.std - 1.2909944487358056).abs() < 1e-12);
        assert_eq!((s.min, s.q25, s.median, s.q75, s.max), (1.0, 1.75, 2.5, 3.25, 4.0));
    }

    #[test]
    fn describe_of_empty_column_is_nan() {
        let s = describe(&Column::new("x", vec![CellValue::Missing]));
        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan() && s.max.is_nan() && s.std.is_nan());
    }

    #[test]
    fn describe_numeric_skips_categorical() {
        let cols = vec![
            Column::new("a", vec![CellValue::Float(1.0)]),
            Column::new("b", vec![CellValue::Text("x".into())]),
        ];
        let out = describe_numeric(&cols);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].column, "a");
    }

    #[test]
    fn box_whiskers_stop_at_fences() {
        let mut v: Vec<f64> = (1..=9).map(f64::from).collect();
        v.push(100.0);
        let b = box_summary(&v).unwrap();
        assert_eq!(b.q1, 3.25);
        assert_eq!(b.median, 5.5);
        assert_eq!(b.q3, 7.75);
        assert_eq!(b.lower_whisker, 1.0);
        assert_eq!(b.upper_whisker, 9.0);
        assert_eq!(b.outliers, vec![100.0]);
        assert_eq!(b.n, 10);
    }

    #[test]
    fn box_of_nothing_is_none() {
        assert!(box_summary(&[]).is_none());
        let single = box_summary(&[4.0]).unwrap();
        assert_eq!((single.lower_whisker, single.upper_whisker), (4.0, 4.0));
    }
}
