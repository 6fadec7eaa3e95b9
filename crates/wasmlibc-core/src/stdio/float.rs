//! Floating-point conversions: `%f`, `%e`, `%g`, `%a` and their uppercase forms.
//!
//! Decimal digits come from Rust's exact float formatting, which rounds the
//! binary value correctly the same way glibc does; this module only reshapes
//! them into C's layout (signed two-digit exponents, `%g` style selection,
//! trailing-zero removal). `%a` is built directly from the IEEE-754 bits.

use std::fmt::Write as _;

use super::printf::{FormatSpec, Precision, emit_padded};

const DEFAULT_PRECISION: usize = 6;
const MANTISSA_BITS: u32 = 52;
const MANTISSA_HEX_DIGITS: usize = 13;

/// Render a double for any float conversion in `spec`.
pub fn format_float(value: f64, spec: &FormatSpec, buf: &mut Vec<u8>) {
    let upper = spec.conversion.is_ascii_uppercase();
    let precision = match spec.precision {
        Precision::Fixed(p) => Some(p),
        _ => None,
    };
    let alt = spec.flags.alt_form;

    let mut prefix = Vec::with_capacity(3);
    if value.is_sign_negative() {
        prefix.push(b'-');
    } else if spec.flags.force_sign {
        prefix.push(b'+');
    } else if spec.flags.space_sign {
        prefix.push(b' ');
    }

    if !value.is_finite() {
        let body: &[u8] = match (value.is_nan(), upper) {
            (true, false) => b"nan",
            (true, true) => b"NAN",
            (false, false) => b"inf",
            (false, true) => b"INF",
        };
        emit_padded(buf, &prefix, 0, body, spec, false);
        return;
    }

    let abs = value.abs();
    let body = match spec.conversion.to_ascii_lowercase() {
        b'f' => fixed(abs, precision.unwrap_or(DEFAULT_PRECISION), alt),
        b'e' => exponential(abs, precision.unwrap_or(DEFAULT_PRECISION), upper, alt),
        b'g' => general(abs, precision, upper, alt),
        _ => {
            prefix.extend_from_slice(if upper { b"0X" } else { b"0x" });
            hex(abs, precision, upper, alt)
        }
    };
    emit_padded(buf, &prefix, 0, body.as_bytes(), spec, true);
}

/// `%f` digits for a non-negative finite value.
fn fixed(value: f64, precision: usize, alt: bool) -> String {
    let mut s = format!("{value:.precision$}");
    if alt && precision == 0 {
        s.push('.');
    }
    s
}

/// `%e` digits for a non-negative finite value: `d.ddde±XX`.
fn exponential(value: f64, precision: usize, upper: bool, alt: bool) -> String {
    let raw = format!("{value:.precision$e}");
    let (mantissa, exponent) = split_exponent(&raw);

    let mut s = String::with_capacity(mantissa.len() + 6);
    s.push_str(mantissa);
    if alt && precision == 0 {
        s.push('.');
    }
    s.push(if upper { 'E' } else { 'e' });
    s.push(if exponent < 0 { '-' } else { '+' });
    let _ = write!(s, "{:02}", exponent.unsigned_abs());
    s
}

/// Decimal exponent `value` has once rounded to `precision` digits after the point.
fn decimal_exponent(value: f64, precision: usize) -> i32 {
    if value == 0.0 {
        return 0;
    }
    split_exponent(&format!("{value:.precision$e}")).1
}

fn split_exponent(raw: &str) -> (&str, i32) {
    match raw.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse().unwrap_or(0)),
        None => (raw, 0),
    }
}

/// `%g`: `%e` when the exponent is below -4 or at least the precision,
/// `%f` otherwise, then trailing zeros removed unless `#` is set.
fn general(value: f64, precision: Option<usize>, upper: bool, alt: bool) -> String {
    let p = match precision.unwrap_or(DEFAULT_PRECISION) {
        0 => 1,
        p => p,
    };
    let x = decimal_exponent(value, p - 1);
    let p_signed = i32::try_from(p).unwrap_or(i32::MAX);

    let mut s = if x < p_signed && x >= -4 {
        fixed(value, (p_signed - 1 - x) as usize, alt)
    } else {
        exponential(value, p - 1, upper, alt)
    };
    if !alt {
        strip_trailing_zeros(&mut s);
    }
    s
}

fn strip_trailing_zeros(s: &mut String) {
    let exp_at = s.find(['e', 'E']).unwrap_or(s.len());
    let (mantissa, exponent) = s.split_at(exp_at);
    if !mantissa.contains('.') {
        return;
    }
    let trimmed = mantissa.trim_end_matches('0').trim_end_matches('.');
    *s = format!("{trimmed}{exponent}");
}

/// `%a` digits (without the `0x` prefix) for a non-negative finite value.
///
/// Normal numbers print as `1.hhhp±d`, subnormals as `0.hhhp-1022`. A
/// precision shorter than the 13 mantissa digits rounds half to even.
fn hex(value: f64, precision: Option<usize>, upper: bool, alt: bool) -> String {
    let bits = value.to_bits();
    let biased = ((bits >> MANTISSA_BITS) & 0x7ff) as i32;
    let mut mantissa = bits & ((1u64 << MANTISSA_BITS) - 1);
    let (mut lead, exponent) = match (biased, mantissa) {
        (0, 0) => (0u64, 0),
        (0, _) => (0, -1022),
        _ => (1, biased - 1023),
    };

    let mut digits = match precision {
        Some(p) if p < MANTISSA_HEX_DIGITS => {
            let shift = 4 * (MANTISSA_HEX_DIGITS - p) as u32;
            let rem = mantissa & ((1u64 << shift) - 1);
            let half = 1u64 << (shift - 1);
            mantissa >>= shift;
            if rem > half || (rem == half && mantissa & 1 == 1) {
                mantissa += 1;
                let limit = 1u64 << (4 * p as u32);
                if mantissa >= limit {
                    mantissa -= limit;
                    lead += 1;
                }
            }
            if p == 0 {
                String::new()
            } else {
                format!("{mantissa:0p$x}")
            }
        }
        Some(p) => {
            let mut s = format!("{mantissa:013x}");
            s.extend(std::iter::repeat_n('0', p - MANTISSA_HEX_DIGITS));
            s
        }
        None => {
            let s = format!("{mantissa:013x}");
            s.trim_end_matches('0').to_owned()
        }
    };
    if upper {
        digits.make_ascii_uppercase();
    }

    let mut s = String::with_capacity(digits.len() + 8);
    let _ = write!(s, "{lead}");
    if !digits.is_empty() || alt {
        s.push('.');
    }
    s.push_str(&digits);
    s.push(if upper { 'P' } else { 'p' });
    let _ = write!(s, "{exponent:+}");
    s
}
