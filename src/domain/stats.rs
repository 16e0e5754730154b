//! Statistical primitives shared by every calculator.
//!
//! All functions are total: degenerate input (empty slices, zero weights,
//! zero variance, mismatched parallel slices) yields a documented fallback
//! instead of NaN or a panic.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::warn;

/// Result of an ordinary least squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// Arithmetic mean. Empty input yields 0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().mean()
}

/// Weighted arithmetic mean.
///
/// Returns 0 when the slices differ in length or the total weight is 0.
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
    if values.len() != weights.len() {
        warn!(
            "weighted_mean: length mismatch ({} values, {} weights)",
            values.len(),
            weights.len()
        );
        return 0.0;
    }
    let total_weight: f64 = weights.iter().sum();
    if total_weight == 0.0 {
        return 0.0;
    }
    values
        .iter()
        .zip(weights.iter())
        .map(|(v, w)| v * w)
        .sum::<f64>()
        / total_weight
}

/// Weighted harmonic mean `Σw / Σ(w/x)`.
///
/// Zero-valued entries are skipped. Returns 0 when the slices differ in length
/// or the denominator sum is 0.
pub fn weighted_harmonic_mean(values: &[f64], weights: &[f64]) -> f64 {
    if values.len() != weights.len() {
        warn!(
            "weighted_harmonic_mean: length mismatch ({} values, {} weights)",
            values.len(),
            weights.len()
        );
        return 0.0;
    }
    let mut weight_sum = 0.0;
    let mut denominator = 0.0;
    for (&v, &w) in values.iter().zip(weights.iter()) {
        if v == 0.0 {
            continue;
        }
        weight_sum += w;
        denominator += w / v;
    }
    if denominator == 0.0 {
        return 0.0;
    }
    weight_sum / denominator
}

/// Population variance. Fewer than two samples yields 0.
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    values.iter().population_variance()
}

/// Population standard deviation. Fewer than two samples yields 0.
pub fn standard_deviation(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Sample variance with Bessel's correction (n - 1).
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    values.iter().variance()
}

/// Sample standard deviation with Bessel's correction (n - 1).
pub fn sample_std_dev(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Standard score of `x`. Returns 0 when `std_dev` is 0.
pub fn z_score(x: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        return 0.0;
    }
    (x - mean) / std_dev
}

/// Standard logistic function, `sigmoid(0) == 0.5`.
pub fn sigmoid(x: f64) -> f64 {
    sigmoid_with(x, 1.0, 0.0)
}

/// Logistic function with steepness `k` and midpoint `x0`.
pub fn sigmoid_with(x: f64, k: f64, x0: f64) -> f64 {
    1.0 / (1.0 + (-k * (x - x0)).exp())
}

/// Logistic function rescaled onto `[min, max]`.
pub fn bounded_sigmoid(x: f64, min: f64, max: f64, k: f64, x0: f64) -> f64 {
    min + (max - min) * sigmoid_with(x, k, x0)
}

/// Pearson product-moment correlation.
///
/// Returns 0 for mismatched or short (< 2) input, or when either series has
/// zero variance.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() {
        warn!(
            "pearson_correlation: length mismatch ({} vs {})",
            x.len(),
            y.len()
        );
        return 0.0;
    }
    if x.len() < 2 {
        return 0.0;
    }
    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Simple linear regression of `y` on `x`.
///
/// All fields are 0 for fewer than two points or mismatched input.
/// `r_squared` is 0 when `y` has no variance.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Regression {
    if x.len() != y.len() {
        warn!(
            "linear_regression: length mismatch ({} vs {})",
            x.len(),
            y.len()
        );
        return Regression::default();
    }
    if x.len() < 2 {
        return Regression::default();
    }

    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y.iter()).map(|(xi, yi)| xi * yi).sum();
    let sum_x2: f64 = x.iter().map(|xi| xi * xi).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return Regression::default();
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;

    let mean_y = sum_y / n;
    let ss_tot: f64 = y.iter().map(|yi| (yi - mean_y).powi(2)).sum();
    let ss_res: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| (yi - (slope * xi + intercept)).powi(2))
        .sum();
    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Regression {
        slope,
        intercept,
        r_squared,
    }
}

/// Regression over `values` against their indices `0..n`.
pub fn trend(values: &[f64]) -> Regression {
    let x: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    linear_regression(&x, values)
}

/// Exponentially weighted moving average, seeded with the first value.
///
/// `EWMA_t = alpha * x_t + (1 - alpha) * EWMA_{t-1}`. Empty input yields 0.
pub fn ewma(values: &[f64], alpha: f64) -> f64 {
    let Some((&first, rest)) = values.split_first() else {
        return 0.0;
    };
    rest.iter()
        .fold(first, |acc, &x| alpha * x + (1.0 - alpha) * acc)
}

/// Shannon entropy normalized to `[0, 1]` (H / log2(n)).
///
/// Returns 0 for one bucket or fewer, or when the distribution sums to 0.
pub fn shannon_entropy(distribution: &[f64]) -> f64 {
    if distribution.len() <= 1 {
        return 0.0;
    }
    let total: f64 = distribution.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let h: f64 = distribution
        .iter()
        .filter(|&&c| c > 0.0)
        .map(|&c| {
            let p = c / total;
            -p * p.log2()
        })
        .sum();
    (h / (distribution.len() as f64).log2()).clamp(0.0, 1.0)
}

/// Percentile rank `(below + 0.5 * equal) / N * 100`. Empty population yields 50.
pub fn percentile_rank(value: f64, population: &[f64]) -> f64 {
    if population.is_empty() {
        return 50.0;
    }
    let below = population.iter().filter(|&&p| p < value).count() as f64;
    let equal = population.iter().filter(|&&p| p == value).count() as f64;
    (below + 0.5 * equal) / population.len() as f64 * 100.0
}

/// Bayesian point estimate shrinking `observed_mean` toward `prior_mean`.
///
/// With zero total weight the observed mean is returned unchanged.
pub fn bayesian_estimate(
    observed_mean: f64,
    observed_count: f64,
    prior_mean: f64,
    prior_weight: f64,
) -> f64 {
    let total = prior_weight + observed_count;
    if total == 0.0 {
        return observed_mean;
    }
    (prior_mean * prior_weight + observed_mean * observed_count) / total
}

/// Gini coefficient of inequality, 0 for perfect equality.
///
/// Returns 0 for empty input or a zero sum.
pub fn gini_coefficient(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().sum();
    if sum == 0.0 {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len() as f64;
    let weighted_sum: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| (i as f64 + 1.0) * x)
        .sum();

    (2.0 * weighted_sum) / (n * sum) - (n + 1.0) / n
}

/// Clamp a ratio-based percentage to `[0, 100]`.
///
/// Not for growth percentages, which are unbounded.
pub fn clamp_pct(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
