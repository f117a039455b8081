use super::{StatsError, complete_pairs};

/// Ordinary-least-squares fit `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trendline {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub n: usize,
}

impl Trendline {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Two end points of the fitted line over `[x_min, x_max]`.
    pub fn segment(&self, x_min: f64, x_max: f64) -> [[f64; 2]; 2] {
        [[x_min, self.predict(x_min)], [x_max, self.predict(x_max)]]
    }
}

/// Fit a trendline through the pairwise-complete points.
pub fn ols(xs: &[Option<f64>], ys: &[Option<f64>]) -> Result<Trendline, StatsError> {
    let (x, y) = complete_pairs(xs, ys);
    ols_complete(&x, &y)
}

pub fn ols_complete(x: &[f64], y: &[f64]) -> Result<Trendline, StatsError> {
    let n = x.len().min(y.len());
    if n < 2 {
        return Err(StatsError::NotEnoughData { needed: 2, found: n });
    }
    let n_f = n as f64;
    let mx = x[..n].iter().sum::<f64>() / n_f;
    let my = y[..n].iter().sum::<f64>() / n_f;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x[..n].iter().zip(&y[..n]) {
        sxx += (xi - mx) * (xi - mx);
        sxy += (xi - mx) * (yi - my);
        syy += (yi - my) * (yi - my);
    }
    if sxx <= 0.0 || !sxx.is_finite() {
        return Err(StatsError::ConstantInput);
    }

    let slope = sxy / sxx;
    // A flat response is fitted exactly by the horizontal line.
    let r_squared = if syy > 0.0 {
        (sxy * sxy / (sxx * syy)).clamp(0.0, 1.0)
    } else {
        1.0
    };
    Ok(Trendline {
        slope,
        intercept: my - slope * mx,
        r_squared,
        n,
    })
}
