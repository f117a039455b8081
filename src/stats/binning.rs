/// One equal-width histogram bin, `[start, end)` (the last bin is closed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Equal-width histogram over `[min, max]` of the finite values.
///
/// A constant input yields a single bin of width 1 centred on the value;
/// no finite values yields no bins.
pub fn histogram(values: &[f64], nbins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || nbins == 0 {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            start: min - 0.5,
            end: min + 0.5,
            count: finite.len(),
        }];
    }

    let width = (max - min) / nbins as f64;
    let mut counts = vec![0usize; nbins];
    for v in finite {
        let idx = (((v - min) / width).floor() as usize).min(nbins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count,
        })
        .collect()
}

/// Index `i` such that `edges[i] <= value < edges[i + 1]`.
pub fn bin_right_open(value: f64, edges: &[f64]) -> Option<usize> {
    edges
        .windows(2)
        .position(|w| value >= w[0] && value < w[1])
}

/// Share of rows in one labelled bin that satisfy the predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRate {
    pub label: String,
    /// Percentage in [0, 100].
    pub rate_pct: f64,
    pub n: usize,
}

/// Bin `(value, flag)` observations by `edges` and report the percentage of
/// flagged rows per bin. Bins with no observations are omitted.
pub fn group_rate(observations: &[(f64, bool)], edges: &[f64], labels: &[&str]) -> Vec<GroupRate> {
    let n_bins = edges.len().saturating_sub(1).min(labels.len());
    let mut totals = vec![0usize; n_bins];
    let mut hits = vec![0usize; n_bins];
    for &(value, flag) in observations {
        if let Some(i) = bin_right_open(value, edges).filter(|&i| i < n_bins) {
            totals[i] += 1;
            if flag {
                hits[i] += 1;
            }
        }
    }
    (0..n_bins)
        .filter(|&i| totals[i] > 0)
        .map(|i| GroupRate {
            label: labels[i].to_string(),
            rate_pct: hits[i] as f64 / totals[i] as f64 * 100.0,
            n: totals[i],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_every_value_once() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let bins = histogram(&values, 40);
        assert_eq!(bins.len(), 40);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert_eq!(bins[0].start, 0.0);
        assert!((bins[39].end - 99.0).abs() < 1e-9);
        // max lands in the closed last bin
        assert!(bins[39].count >= 1);
    }

    #[test]
    fn histogram_ignores_non_finite_and_handles_constant() {
        let bins = histogram(&[3.0, 3.0, f64::NAN], 40);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[0].center(), 3.0);
        assert!(histogram(&[f64::NAN], 10).is_empty());
    }

    #[test]
    fn right_open_bins() {
        let edges = [18.0, 25.0, 30.0];
        assert_eq!(bin_right_open(18.0, &edges), Some(0));
        assert_eq!(bin_right_open(24.99, &edges), Some(0));
        assert_eq!(bin_right_open(25.0, &edges), Some(1));
        assert_eq!(bin_right_open(30.0, &edges), None);
        assert_eq!(bin_right_open(17.0, &edges), None);
    }

    #[test]
    fn group_rate_is_percentage_and_skips_empty_bins() {
        let obs = [(19.0, true), (20.0, false), (22.0, false), (41.0, true)];
        let rates = group_rate(&obs, &[18.0, 25.0, 30.0, 45.0], &["18-24", "25-29", "30-44"]);
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].label, "18-24");
        assert!((rates[0].rate_pct - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(rates[1].label, "30-44");
        assert_eq!(rates[1].rate_pct, 100.0);
    }
}
