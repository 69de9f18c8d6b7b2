/// Mean and spread of a pool of rating values.
///
/// `average` is `None` exactly when the pool is empty; zero is a measurement,
/// not a placeholder. `variance` and `std_dev` are also `None` when the
/// spread of finite inputs exceeds what an `f64` can hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: usize,
    pub variance: Option<f64>,
    pub std_dev: Option<f64>,
}

impl RatingSummary {
    pub const EMPTY: RatingSummary = RatingSummary {
        average: None,
        count: 0,
        variance: None,
        std_dev: None,
    };

    /// Population statistics (divisor `n`, not `n - 1`).
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::EMPTY;
        }
        let n = values.len() as f64;
        let mean = mean(values, n);
        let variance = population_variance(values, mean, n);
        Self {
            average: Some(mean),
            count: values.len(),
            variance,
            std_dev: variance.map(f64::sqrt),
        }
    }
}

fn mean(values: &[f64], n: f64) -> f64 {
    let sum = values.iter().sum::<f64>();
    if sum.is_finite() {
        return sum / n;
    }
    // Dividing first keeps every partial sum within range.
    values.iter().map(|v| v / n).sum()
}

fn population_variance(values: &[f64], mean: f64, n: f64) -> Option<f64> {
    let direct = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    if direct.is_finite() {
        return Some(direct);
    }
    // The sum of squares overflowed; rescale by the largest deviation.
    let scale = values
        .iter()
        .map(|v| (v - mean).abs())
        .fold(0.0_f64, f64::max);
    if !scale.is_finite() {
        return None;
    }
    let scaled = values
        .iter()
        .map(|v| ((v - mean) / scale).powi(2))
        .sum::<f64>()
        / n;
    Some(scaled * scale * scale).filter(|v| v.is_finite())
}
