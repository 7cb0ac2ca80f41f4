//! # Weight Distribution
//!
//! Splits a horizontal block's content width among its children in
//! proportion to their weights. Each share is rounded to a whole point on
//! its own, so the shares may sum to slightly more or less than the
//! available width. The remainder is not redistributed.

/// Widths for the given weights, or `None` when the weights sum to zero or
/// less and there is nothing to divide by.
pub fn apportion(weights: &[f64], content_width: f64) -> Option<Vec<f64>> {
    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        return None;
    }
    Some(
        weights
            .iter()
            .map(|w| (w / total_weight * content_width).round())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_weights() {
        let widths = apportion(&[1.0, 1.0], 504.0).unwrap();
        assert_eq!(widths, vec![252.0, 252.0]);
    }

    #[test]
    fn test_proportional_weights() {
        let widths = apportion(&[1.0, 2.0, 1.0], 400.0).unwrap();
        assert_eq!(widths, vec![100.0, 200.0, 100.0]);
    }

    #[test]
    fn test_rounding_is_per_child() {
        // 100 / 3 = 33.33 each, rounded down, one point is lost
        let widths = apportion(&[1.0, 1.0, 1.0], 100.0).unwrap();
        assert_eq!(widths, vec![33.0, 33.0, 33.0]);
        // 101 / 2 = 50.5 each, rounded up, one point over
        let widths = apportion(&[1.0, 1.0], 101.0).unwrap();
        assert_eq!(widths, vec![51.0, 51.0]);
    }

    #[test]
    fn test_drift_bound() {
        for n in 1..=12 {
            for width in [97.0, 100.0, 333.3, 504.0, 1000.0] {
                let weights: Vec<f64> = (1..=n).map(|i| i as f64 * 0.7).collect();
                let widths = apportion(&weights, width).unwrap();
                let total: f64 = widths.iter().sum();
                assert!(
                    (total - width).abs() <= n as f64 * 0.5,
                    "{n} children in {width}: {total}"
                );
            }
        }
    }

    #[test]
    fn test_zero_total_weight() {
        assert!(apportion(&[0.0, 0.0], 100.0).is_none());
        assert!(apportion(&[1.0, -1.0], 100.0).is_none());
        assert!(apportion(&[], 100.0).is_none());
    }

    #[test]
    fn test_zero_weight_child_gets_nothing() {
        let widths = apportion(&[0.0, 1.0], 100.0).unwrap();
        assert_eq!(widths, vec![0.0, 100.0]);
    }
}
