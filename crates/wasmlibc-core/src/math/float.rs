//! Floating-point utility functions.

#[inline]
pub fn trunc(x: f64) -> f64 {
    x.trunc()
}

/// Correctly rounded square root; negative non-zero input yields NaN.
#[inline]
pub fn sqrt(x: f64) -> f64 {
    x.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_sanity() {
        assert_eq!(sqrt(4.0), 2.0);
        assert_eq!(sqrt(2.25), 1.5);
        assert!(sqrt(-1.0).is_nan());
        assert_eq!(trunc(-1.7), -1.0);
        assert_eq!(trunc(2.9), 2.0);
    }

    #[test]
    fn signed_zero_and_infinities() {
        assert!(sqrt(-0.0).is_sign_negative());
        assert_eq!(sqrt(-0.0), 0.0);
        assert_eq!(sqrt(f64::INFINITY), f64::INFINITY);
        assert!(trunc(-0.5).is_sign_negative());
        assert_eq!(trunc(f64::NEG_INFINITY), f64::NEG_INFINITY);
        assert!(trunc(f64::NAN).is_nan());
    }
}
