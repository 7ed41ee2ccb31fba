//! Small descriptive-statistics helpers shared by the return-based metrics.

/// Simple period-over-period returns: `close[i] / close[i - 1] - 1`.
///
/// The undefined return for the first close is not emitted, so the result has one
/// element fewer than the input.
pub fn simple_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample covariance (n - 1 denominator). `None` for fewer than two pairs or unequal lengths.
pub fn sample_covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mean_x = mean(x)?;
    let mean_y = mean(y)?;

    let sum: f64 = x
        .iter()
        .zip(y)
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum();

    Some(sum / (x.len() - 1) as f64)
}

/// Sample variance (n - 1 denominator).
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    sample_covariance(values, values)
}

pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Rounds half away from zero to `decimals` fractional digits.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_drop_the_leading_period() {
        let returns = simple_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.1).abs() < 1e-12);
        assert!((returns[1] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn variance_uses_sample_denominator() {
        // Population variance would be 1.25; the sample estimate divides by 3.
        let var = sample_variance(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((var - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn single_observation_has_no_sample_variance() {
        assert_eq!(sample_variance(&[1.0]), None);
        assert_eq!(sample_covariance(&[1.0, 2.0], &[1.0]), None);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(-1.23456, 3), -1.235);
        assert_eq!(round_to(2.0, 3), 2.0);
    }
}
