use std::f64::consts::PI;

use super::summary::std_dev;

/// Gaussian kernel density estimate, Scott's-rule bandwidth.
#[derive(Debug, Clone)]
pub struct Kde {
    samples: Vec<f64>,
    pub bandwidth: f64,
}

impl Kde {
    /// `None` when fewer than two finite samples or zero spread.
    pub fn new(values: &[f64]) -> Option<Self> {
        let samples: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if samples.len() < 2 {
            return None;
        }
        let sigma = std_dev(&samples);
        if !(sigma > 0.0) {
            return None;
        }
        let bandwidth = sigma * (samples.len() as f64).powf(-0.2);
        Some(Kde { samples, bandwidth })
    }

    pub fn density(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let norm = 1.0 / (self.samples.len() as f64 * h * (2.0 * PI).sqrt());
        norm * self
            .samples
            .iter()
            .map(|&s| {
                let z = (x - s) / h;
                (-0.5 * z * z).exp()
            })
            .sum::<f64>()
    }

    /// Density sampled on `points` evenly spaced positions spanning the data
    /// plus two bandwidths on either side.
    pub fn curve(&self, points: usize) -> Vec<[f64; 2]> {
        let min = self.samples.iter().copied().fold(f64::INFINITY, f64::min) - 2.0 * self.bandwidth;
        let max =
            self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 2.0 * self.bandwidth;
        let points = points.max(2);
        let step = (max - min) / (points - 1) as f64;
        (0..points)
            .map(|i| {
                let x = min + i as f64 * step;
                [x, self.density(x)]
            })
            .collect()
    }
}
