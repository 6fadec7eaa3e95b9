//! Inverse hyperbolic functions.

#[inline]
pub fn acosh(x: f64) -> f64 {
    x.acosh()
}

#[inline]
pub fn asinh(x: f64) -> f64 {
    x.asinh()
}

#[inline]
pub fn atanh(x: f64) -> f64 {
    x.atanh()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 4.0 * f64::EPSILON * b.abs().max(1.0)
    }

    #[test]
    fn known_values() {
        assert_eq!(acosh(1.0), 0.0);
        assert!(close(acosh(2.0), 1.316_957_896_924_816_6));
        assert!(close(asinh(1.0), 0.881_373_587_019_543));
        assert!(close(atanh(0.5), 0.549_306_144_334_054_8));
    }

    #[test]
    fn odd_symmetry() {
        for x in [0.25, 1.0, 3.5, 1.0e6] {
            assert_eq!(asinh(-x), -asinh(x));
        }
        assert!(asinh(-0.0).is_sign_negative());
        assert!(atanh(-0.0).is_sign_negative());
    }

    #[test]
    fn domain_edges() {
        assert!(acosh(0.5).is_nan());
        assert!(atanh(1.5).is_nan());
        assert_eq!(atanh(1.0), f64::INFINITY);
        assert_eq!(atanh(-1.0), f64::NEG_INFINITY);
        assert_eq!(asinh(f64::INFINITY), f64::INFINITY);
    }
}
