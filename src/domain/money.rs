/// Round `value` to `places` decimal digits.
///
/// The value is scaled by `10^places`; if the fractional remainder of the
/// scaled value is at least `threshold` it is rounded up, otherwise down.
/// A `threshold` of `0.0` therefore rounds up on any non-zero remainder.
pub fn round(value: f64, threshold: f64, places: i32) -> f64 {
    let pow = 10f64.powi(places);
    let scaled = value * pow;
    let rounded = if scaled.fract() >= threshold {
        scaled.ceil()
    } else {
        scaled.floor()
    };
    rounded / pow
}

/// Rounding applied to every reported balance: two places, ceiling on any remainder.
pub fn round_balance(value: f64) -> f64 {
    round(value, 0.0, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_zero_threshold_rounds_up() {
        assert_eq!(round(119.6157, 0.0, 2), 119.62);
        assert_eq!(round(10.001, 0.0, 2), 10.01);
        assert_eq!(round(30.0, 0.0, 2), 30.0);
        assert_eq!(round(0.0, 0.0, 2), 0.0);
    }

    #[test]
    fn test_round_with_threshold() {
        assert_eq!(round(1.234, 0.5, 2), 1.23);
        assert_eq!(round(1.236, 0.5, 2), 1.24);
        assert_eq!(round(7.4, 0.5, 0), 7.0);
        assert_eq!(round(7.5, 0.5, 0), 8.0);
    }

    #[test]
    fn test_round_balance() {
        assert_eq!(round_balance(159.0), 159.0);
        assert_eq!(round_balance(159.0 * 0.7523), 119.62);
    }
}
