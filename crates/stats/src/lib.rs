//! Statistical helper functions for naiad standardization.
//!
//! All standard deviations here use the population (1/N) denominator,
//! matching the statistics the training pipeline stores alongside its
//! prepared arrays. The weighted variants take a per-value weight mask;
//! zero-weight values do not participate at all.

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Population standard deviation (1/N denominator). Returns 0.0 if empty.
pub fn std_pop(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let n = data.len() as f64;
    let m = mean(data);
    let ss: f64 = data.iter().map(|&x| (x - m) * (x - m)).sum();
    (ss / n).sqrt()
}

/// Weighted arithmetic mean. Returns 0.0 if the total weight is zero.
///
/// # Panics
///
/// Panics if `data` and `weights` differ in length.
pub fn weighted_mean(data: &[f64], weights: &[f64]) -> f64 {
    assert_eq!(
        data.len(),
        weights.len(),
        "weighted_mean: data and weights must have equal length"
    );
    let total: f64 = weights.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    let sum: f64 = data.iter().zip(weights).map(|(&x, &w)| w * x).sum();
    sum / total
}

/// Weighted population standard deviation. Returns 0.0 if the total
/// weight is zero.
///
/// # Panics
///
/// Panics if `data` and `weights` differ in length.
pub fn weighted_std_pop(data: &[f64], weights: &[f64]) -> f64 {
    assert_eq!(
        data.len(),
        weights.len(),
        "weighted_std_pop: data and weights must have equal length"
    );
    let total: f64 = weights.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    let m = weighted_mean(data, weights);
    let ss: f64 = data
        .iter()
        .zip(weights)
        .map(|(&x, &w)| w * (x - m) * (x - m))
        .sum();
    (ss / total).sqrt()
}
