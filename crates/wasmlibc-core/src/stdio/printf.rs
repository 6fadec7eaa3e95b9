//! printf formatting engine.
//!
//! Parses C format strings into segments, derives the C type every directive
//! pulls from the variadic argument list, and renders typed arguments into a
//! byte buffer with width/precision/flag handling per ISO C 7.21.6.1.
//!
//! The engine never touches raw memory: `%s` arguments arrive as slices and
//! `%n` requests are returned to the caller as [`CountWrite`] records.

use std::ffi::{c_int, c_long};
use std::fmt;

use super::float::format_float;

// ---------------------------------------------------------------------------
// Format spec types
// ---------------------------------------------------------------------------

/// Flags parsed from a printf format directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags {
    pub left_justify: bool, // '-'
    pub force_sign: bool,   // '+'
    pub space_sign: bool,   // ' '
    pub alt_form: bool,     // '#'
    pub zero_pad: bool,     // '0'
}

/// Width specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    None,
    Fixed(usize),
    FromArg, // '*'
}

/// Precision specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    None,
    Fixed(usize),
    FromArg, // '.*'
}

/// Length modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthMod {
    None,
    Hh,   // 'hh'
    H,    // 'h'
    L,    // 'l'
    Ll,   // 'll'
    Z,    // 'z'
    T,    // 't'
    J,    // 'j'
    BigL, // 'L'
}

impl LengthMod {
    /// Width in bits of the integer type this modifier selects on the build target.
    #[must_use]
    pub const fn int_bits(self) -> u32 {
        match self {
            Self::None => c_int::BITS,
            Self::Hh => 8,
            Self::H => 16,
            Self::L => c_long::BITS,
            Self::Ll | Self::J | Self::BigL => 64,
            Self::Z => usize::BITS,
            Self::T => isize::BITS,
        }
    }
}

/// A parsed printf format specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    pub flags: FormatFlags,
    pub width: Width,
    pub precision: Precision,
    pub length: LengthMod,
    pub conversion: u8,
}

/// A segment of a parsed format string.
#[derive(Debug, Clone)]
pub enum FormatSegment<'a> {
    /// Literal bytes to emit verbatim.
    Literal(&'a [u8]),
    /// A `%%` escape (emit a single '%').
    Percent,
    /// A conversion specifier requiring an argument.
    Spec(FormatSpec),
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// C type a directive consumes from the variadic argument list.
///
/// The ABI layer reads exactly this type with `va_arg`, which keeps the list
/// aligned on targets where `int` and `long long` occupy different slot sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgClass {
    Int,
    Long,
    LongLong,
    Size,
    Ptrdiff,
    IntMax,
    Double,
    Pointer,
    /// `const char *` for `%s`; the bound limits how far the string may be read.
    CStr(StrBound),
}

/// How many bytes of a `%s` argument may be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrBound {
    /// Read to the terminator.
    Unbounded,
    /// `%.Ns`.
    Fixed(usize),
    /// `%.*s`: the `int` at this index of the argument plan. A negative value
    /// means no precision.
    Arg(usize),
}

/// Typed argument value handed to [`render`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormatArg<'a> {
    /// Any integer class, as read from the list. Re-narrowed per length modifier.
    Int(i64),
    Float(f64),
    Pointer(usize),
    /// String bytes without terminator; `None` for a NULL pointer.
    Str(Option<&'a [u8]>),
}

/// A `%n` directive: store `count` at `addr` using the integer type of `length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountWrite {
    pub addr: usize,
    pub count: usize,
    pub length: LengthMod,
}

/// Output of [`render`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub counts: Vec<CountWrite>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// Conversion/length combination whose argument type cannot be decoded
    /// (`%Lf`, `%ls`, `%lc`).
    Unsupported(u8),
    MissingArgument,
    ArgumentMismatch,
    /// Output longer than `INT_MAX` bytes.
    Overflow,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(c) => write!(f, "unsupported conversion '%{}'", *c as char),
            Self::MissingArgument => f.write_str("missing argument"),
            Self::ArgumentMismatch => f.write_str("argument type does not match directive"),
            Self::Overflow => f.write_str("output exceeds INT_MAX bytes"),
        }
    }
}

impl std::error::Error for FormatError {}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a single format specifier starting after the '%' character.
///
/// Returns `(spec, bytes_consumed)` counted from `fmt[0]`, or `None` if the
/// directive is malformed or positional (`%1$d`).
pub fn parse_format_spec(fmt: &[u8]) -> Option<(FormatSpec, usize)> {
    let mut pos = 0;
    let len = fmt.len();

    let mut flags = FormatFlags::default();
    while pos < len {
        match fmt[pos] {
            b'-' => flags.left_justify = true,
            b'+' => flags.force_sign = true,
            b' ' => flags.space_sign = true,
            b'#' => flags.alt_form = true,
            b'0' => flags.zero_pad = true,
            _ => break,
        }
        pos += 1;
    }
    // '+' overrides ' '; '-' overrides '0'.
    if flags.force_sign {
        flags.space_sign = false;
    }
    if flags.left_justify {
        flags.zero_pad = false;
    }

    let width = if pos < len && fmt[pos] == b'*' {
        pos += 1;
        Width::FromArg
    } else {
        let start = pos;
        while pos < len && fmt[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos < len && fmt[pos] == b'$' {
            return None;
        }
        if pos > start {
            Width::Fixed(parse_decimal(&fmt[start..pos]))
        } else {
            Width::None
        }
    };

    let precision = if pos < len && fmt[pos] == b'.' {
        pos += 1;
        if pos < len && fmt[pos] == b'*' {
            pos += 1;
            Precision::FromArg
        } else {
            let start = pos;
            while pos < len && fmt[pos].is_ascii_digit() {
                pos += 1;
            }
            Precision::Fixed(parse_decimal(&fmt[start..pos]))
        }
    } else {
        Precision::None
    };

    let (length, consumed) = match (fmt.get(pos), fmt.get(pos + 1)) {
        (Some(b'h'), Some(b'h')) => (LengthMod::Hh, 2),
        (Some(b'h'), _) => (LengthMod::H, 1),
        (Some(b'l'), Some(b'l')) => (LengthMod::Ll, 2),
        (Some(b'l'), _) => (LengthMod::L, 1),
        (Some(b'q'), _) => (LengthMod::Ll, 1),
        (Some(b'z'), _) => (LengthMod::Z, 1),
        (Some(b't'), _) => (LengthMod::T, 1),
        (Some(b'j'), _) => (LengthMod::J, 1),
        (Some(b'L'), _) => (LengthMod::BigL, 1),
        _ => (LengthMod::None, 0),
    };
    pos += consumed;

    let conversion = *fmt.get(pos)?;
    pos += 1;

    match conversion {
        b'd' | b'i' | b'u' | b'x' | b'X' | b'o' | b's' | b'c' | b'p' | b'n' | b'f' | b'F'
        | b'e' | b'E' | b'g' | b'G' | b'a' | b'A' => {}
        _ => return None,
    }

    Some((
        FormatSpec {
            flags,
            width,
            precision,
            length,
            conversion,
        },
        pos,
    ))
}

/// Split a printf format string into segments.
///
/// Parsing stops at the first NUL. Malformed directives are emitted as a
/// literal `%` followed by the rest of the text, the way glibc prints them.
pub fn parse_format_string(fmt: &[u8]) -> Vec<FormatSegment<'_>> {
    let fmt = &fmt[..crate::string::strlen(fmt)];
    let mut segments = Vec::new();
    let mut pos = 0;
    let len = fmt.len();

    while pos < len {
        let start = pos;
        while pos < len && fmt[pos] != b'%' {
            pos += 1;
        }
        if pos > start {
            segments.push(FormatSegment::Literal(&fmt[start..pos]));
        }
        if pos >= len {
            break;
        }
        pos += 1;
        if pos >= len {
            segments.push(FormatSegment::Literal(&fmt[pos - 1..pos]));
            break;
        }
        if fmt[pos] == b'%' {
            segments.push(FormatSegment::Percent);
            pos += 1;
            continue;
        }
        if let Some((spec, consumed)) = parse_format_spec(&fmt[pos..]) {
            pos += consumed;
            segments.push(FormatSegment::Spec(spec));
        } else {
            segments.push(FormatSegment::Literal(&fmt[pos - 1..pos]));
        }
    }
    segments
}

/// The C argument type a directive consumes (excluding `*` width/precision).
///
/// `precision_slot` is the plan index of the directive's `*` precision
/// argument, if it has one.
pub fn arg_class(spec: &FormatSpec, precision_slot: Option<usize>) -> Result<ArgClass, FormatError> {
    let int_class = match spec.length {
        LengthMod::None | LengthMod::Hh | LengthMod::H => ArgClass::Int,
        LengthMod::L => ArgClass::Long,
        LengthMod::Ll | LengthMod::BigL => ArgClass::LongLong,
        LengthMod::Z => ArgClass::Size,
        LengthMod::T => ArgClass::Ptrdiff,
        LengthMod::J => ArgClass::IntMax,
    };
    match spec.conversion {
        b'd' | b'i' | b'u' | b'o' | b'x' | b'X' => Ok(int_class),
        b'c' if spec.length == LengthMod::None => Ok(ArgClass::Int),
        b's' if spec.length == LengthMod::None => Ok(ArgClass::CStr(match (spec.precision, precision_slot) {
            (Precision::Fixed(n), _) => StrBound::Fixed(n),
            (Precision::FromArg, Some(slot)) => StrBound::Arg(slot),
            _ => StrBound::Unbounded,
        })),
        b'p' | b'n' => Ok(ArgClass::Pointer),
        b'f' | b'F' | b'e' | b'E' | b'g' | b'G' | b'a' | b'A' => {
            if spec.length == LengthMod::BigL {
                Err(FormatError::Unsupported(spec.conversion))
            } else {
                Ok(ArgClass::Double)
            }
        }
        other => Err(FormatError::Unsupported(other)),
    }
}

/// Every argument the format consumes, in `va_arg` order.
pub fn arg_plan(segments: &[FormatSegment<'_>]) -> Result<Vec<ArgClass>, FormatError> {
    let mut plan = Vec::new();
    for segment in segments {
        let FormatSegment::Spec(spec) = segment else {
            continue;
        };
        if spec.width == Width::FromArg {
            plan.push(ArgClass::Int);
        }
        let precision_slot = (spec.precision == Precision::FromArg).then(|| {
            plan.push(ArgClass::Int);
            plan.len() - 1
        });
        plan.push(arg_class(spec, precision_slot)?);
    }
    Ok(plan)
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Render parsed segments with their arguments.
pub fn render(segments: &[FormatSegment<'_>], args: &[FormatArg<'_>]) -> Result<Rendered, FormatError> {
    let mut out = Rendered::default();
    let mut args = args.iter().copied();

    for segment in segments {
        match segment {
            FormatSegment::Literal(bytes) => out.bytes.extend_from_slice(bytes),
            FormatSegment::Percent => out.bytes.push(b'%'),
            FormatSegment::Spec(spec) => {
                let spec = resolve_stars(*spec, &mut args)?;
                render_one(&spec, &mut args, &mut out)?;
            }
        }
    }

    if out.bytes.len() > c_int::MAX as usize {
        return Err(FormatError::Overflow);
    }
    Ok(out)
}

/// Parse and render in one step.
pub fn format_bytes(fmt: &[u8], args: &[FormatArg<'_>]) -> Result<Rendered, FormatError> {
    render(&parse_format_string(fmt), args)
}

fn next_int<'a>(args: &mut impl Iterator<Item = FormatArg<'a>>) -> Result<i64, FormatError> {
    match args.next() {
        Some(FormatArg::Int(v)) => Ok(v),
        Some(_) => Err(FormatError::ArgumentMismatch),
        None => Err(FormatError::MissingArgument),
    }
}

fn resolve_stars<'a>(
    mut spec: FormatSpec,
    args: &mut impl Iterator<Item = FormatArg<'a>>,
) -> Result<FormatSpec, FormatError> {
    if spec.width == Width::FromArg {
        // A negative `*` width is a '-' flag plus a positive width.
        let w = sign_extend(next_int(args)?, c_int::BITS);
        if w < 0 {
            spec.flags.left_justify = true;
            spec.flags.zero_pad = false;
        }
        spec.width = Width::Fixed(w.unsigned_abs() as usize);
    }
    if spec.precision == Precision::FromArg {
        let p = sign_extend(next_int(args)?, c_int::BITS);
        spec.precision = if p < 0 {
            Precision::None
        } else {
            Precision::Fixed(p as usize)
        };
    }
    Ok(spec)
}

fn render_one<'a>(
    spec: &FormatSpec,
    args: &mut impl Iterator<Item = FormatArg<'a>>,
    out: &mut Rendered,
) -> Result<(), FormatError> {
    let bits = spec.length.int_bits();
    match spec.conversion {
        b'd' | b'i' => {
            let v = sign_extend(next_int(args)?, bits);
            format_signed(v, spec, &mut out.bytes);
        }
        b'u' | b'o' | b'x' | b'X' => {
            let v = truncate_unsigned(next_int(args)?, bits);
            format_unsigned(v, spec, &mut out.bytes);
        }
        b'c' => {
            let v = next_int(args)?;
            format_char(v as u8, spec, &mut out.bytes);
        }
        b's' => match args.next() {
            Some(FormatArg::Str(Some(s))) => format_str(s, spec, &mut out.bytes),
            Some(FormatArg::Str(None)) => format_null_str(spec, &mut out.bytes),
            Some(_) => return Err(FormatError::ArgumentMismatch),
            None => return Err(FormatError::MissingArgument),
        },
        b'p' | b'n' => {
            let addr = match args.next() {
                Some(FormatArg::Pointer(p)) => p,
                Some(_) => return Err(FormatError::ArgumentMismatch),
                None => return Err(FormatError::MissingArgument),
            };
            if spec.conversion == b'p' {
                format_pointer(addr, spec, &mut out.bytes);
            } else if addr != 0 {
                out.counts.push(CountWrite {
                    addr,
                    count: out.bytes.len(),
                    length: spec.length,
                });
            }
        }
        b'f' | b'F' | b'e' | b'E' | b'g' | b'G' | b'a' | b'A' => match args.next() {
            Some(FormatArg::Float(v)) => format_float(v, spec, &mut out.bytes),
            Some(_) => return Err(FormatError::ArgumentMismatch),
            None => return Err(FormatError::MissingArgument),
        },
        other => return Err(FormatError::Unsupported(other)),
    }
    Ok(())
}

/// Reinterpret the low `bits` of `v` as a signed integer.
#[must_use]
pub fn sign_extend(v: i64, bits: u32) -> i64 {
    if bits >= 64 {
        return v;
    }
    let shift = 64 - bits;
    (v << shift) >> shift
}

/// Keep only the low `bits` of `v`, as an unsigned integer.
#[must_use]
pub fn truncate_unsigned(v: i64, bits: u32) -> u64 {
    if bits >= 64 {
        return v as u64;
    }
    (v as u64) & ((1u64 << bits) - 1)
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

/// Render a signed integer to `buf` according to `spec`.
pub fn format_signed(value: i64, spec: &FormatSpec, buf: &mut Vec<u8>) {
    let sign: &[u8] = if value < 0 {
        b"-"
    } else if spec.flags.force_sign {
        b"+"
    } else if spec.flags.space_sign {
        b" "
    } else {
        b""
    };
    format_integer(value.unsigned_abs(), sign, spec, buf);
}

/// Render an unsigned integer (`%u`, `%o`, `%x`, `%X`) to `buf`.
pub fn format_unsigned(value: u64, spec: &FormatSpec, buf: &mut Vec<u8>) {
    let prefix: &[u8] = match (spec.flags.alt_form && value != 0, spec.conversion) {
        (true, b'x') => b"0x",
        (true, b'X') => b"0X",
        _ => b"",
    };
    format_integer(value, prefix, spec, buf);
}

fn format_integer(abs: u64, prefix: &[u8], spec: &FormatSpec, buf: &mut Vec<u8>) {
    let (base, uppercase) = int_base(spec.conversion);
    let mut digits = [0u8; 64];
    let mut digit_count = render_digits(abs, base, uppercase, &mut digits);
    // Precision 0 with value 0 prints no digits.
    if abs == 0 && spec.precision == Precision::Fixed(0) {
        digit_count = 0;
    }
    let digit_slice = &digits[64 - digit_count..];

    let min_digits = match spec.precision {
        Precision::Fixed(p) => p,
        _ => 1,
    };
    let mut zeros = min_digits.saturating_sub(digit_count);
    // '#' with 'o' forces a leading zero digit.
    if spec.conversion == b'o'
        && spec.flags.alt_form
        && zeros == 0
        && digit_slice.first() != Some(&b'0')
    {
        zeros = 1;
    }

    // An explicit precision disables the '0' flag for integers.
    let zero_pad_ok = spec.precision == Precision::None;
    emit_padded(buf, prefix, zeros, digit_slice, spec, zero_pad_ok);
}

/// Render a string argument to `buf` according to `spec`.
///
/// `s` is the raw byte content; precision truncates it.
pub fn format_str(s: &[u8], spec: &FormatSpec, buf: &mut Vec<u8>) {
    let s = &s[..crate::string::strlen(s)];
    let effective = match spec.precision {
        Precision::Fixed(p) => &s[..s.len().min(p)],
        _ => s,
    };
    emit_padded(buf, b"", 0, effective, spec, false);
}

/// `%s` with a NULL pointer: glibc prints `(null)` unless the precision is too
/// small to hold it, in which case nothing is printed.
fn format_null_str(spec: &FormatSpec, buf: &mut Vec<u8>) {
    const NULL_TEXT: &[u8] = b"(null)";
    let text = match spec.precision {
        Precision::Fixed(p) if p < NULL_TEXT.len() => b"" as &[u8],
        _ => NULL_TEXT,
    };
    emit_padded(buf, b"", 0, text, spec, false);
}

/// Render a character to `buf` according to `spec`.
pub fn format_char(c: u8, spec: &FormatSpec, buf: &mut Vec<u8>) {
    emit_padded(buf, b"", 0, &[c], spec, false);
}

/// Render a pointer to `buf` as `0x...` hex, or `(nil)` for null.
pub fn format_pointer(addr: usize, spec: &FormatSpec, buf: &mut Vec<u8>) {
    if addr == 0 {
        emit_padded(buf, b"", 0, b"(nil)", spec, false);
        return;
    }
    let mut digits = [0u8; 64];
    let count = render_digits(addr as u64, 16, false, &mut digits);
    emit_padded(buf, b"0x", 0, &digits[64 - count..], spec, false);
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Emit `prefix`, `zeros` zero digits and `body`, padded to the field width.
///
/// With `zero_pad_ok` and the '0' flag, padding goes between prefix and body
/// as zeros; otherwise it is spaces on the left (or right for '-').
pub(crate) fn emit_padded(
    buf: &mut Vec<u8>,
    prefix: &[u8],
    zeros: usize,
    body: &[u8],
    spec: &FormatSpec,
    zero_pad_ok: bool,
) {
    let content = prefix.len() + zeros + body.len();
    let pad_total = resolve_width(spec).saturating_sub(content);

    if spec.flags.left_justify {
        buf.extend_from_slice(prefix);
        pad(buf, b'0', zeros);
        buf.extend_from_slice(body);
        pad(buf, b' ', pad_total);
    } else if zero_pad_ok && spec.flags.zero_pad {
        buf.extend_from_slice(prefix);
        pad(buf, b'0', zeros + pad_total);
        buf.extend_from_slice(body);
    } else {
        pad(buf, b' ', pad_total);
        buf.extend_from_slice(prefix);
        pad(buf, b'0', zeros);
        buf.extend_from_slice(body);
    }
}

fn parse_decimal(digits: &[u8]) -> usize {
    let mut result = 0_usize;
    for &d in digits {
        result = result
            .saturating_mul(10)
            .saturating_add(usize::from(d - b'0'));
    }
    // C caps field widths at INT_MAX.
    result.min(c_int::MAX as usize)
}

fn resolve_width(spec: &FormatSpec) -> usize {
    match spec.width {
        Width::Fixed(w) => w,
        _ => 0,
    }
}

fn int_base(conversion: u8) -> (u64, bool) {
    match conversion {
        b'o' => (8, false),
        b'x' => (16, false),
        b'X' => (16, true),
        _ => (10, false),
    }
}

/// Render `value` in the given `base` into the END of `buf`.
/// Returns the number of digits written.
fn render_digits(mut value: u64, base: u64, uppercase: bool, buf: &mut [u8; 64]) -> usize {
    if value == 0 {
        buf[63] = b'0';
        return 1;
    }
    let alpha = if uppercase { b'A' } else { b'a' };
    let mut pos = 64;
    while value > 0 && pos > 0 {
        pos -= 1;
        let digit = (value % base) as u8;
        buf[pos] = if digit < 10 {
            b'0' + digit
        } else {
            alpha + (digit - 10)
        };
        value /= base;
    }
    64 - pos
}

fn pad(buf: &mut Vec<u8>, byte: u8, count: usize) {
    buf.resize(buf.len() + count, byte);
}
