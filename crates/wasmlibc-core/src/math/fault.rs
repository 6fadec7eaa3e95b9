//! errno classification for the math family.
//!
//! C reports domain errors as NaN plus `EDOM` and pole errors as an infinity
//! plus `ERANGE`. A NaN argument is not an error.

use crate::errno::{EDOM, ERANGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathFault {
    /// Argument outside the function's domain.
    Domain,
    /// Exact infinite result from a finite argument.
    Pole,
}

impl MathFault {
    #[must_use]
    pub const fn errno(self) -> i32 {
        match self {
            Self::Domain => EDOM,
            Self::Pole => ERANGE,
        }
    }
}

/// The exported unary math functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathFn {
    Acosh,
    Asinh,
    Atanh,
    Trunc,
    Sqrt,
}

impl MathFn {
    pub const ALL: [Self; 5] = [Self::Acosh, Self::Asinh, Self::Atanh, Self::Trunc, Self::Sqrt];

    /// C name without prefix.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Acosh => "acosh",
            Self::Asinh => "asinh",
            Self::Atanh => "atanh",
            Self::Trunc => "trunc",
            Self::Sqrt => "sqrt",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// The function's value, without any fault reporting.
    #[must_use]
    pub fn eval(self, x: f64) -> f64 {
        match self {
            Self::Acosh => super::acosh(x),
            Self::Asinh => super::asinh(x),
            Self::Atanh => super::atanh(x),
            Self::Trunc => super::trunc(x),
            Self::Sqrt => super::sqrt(x),
        }
    }
}

/// The fault `func(x)` must report, if any.
#[must_use]
pub fn check(func: MathFn, x: f64) -> Option<MathFault> {
    if x.is_nan() {
        return None;
    }
    match func {
        MathFn::Sqrt if x < 0.0 => Some(MathFault::Domain),
        MathFn::Acosh if x < 1.0 => Some(MathFault::Domain),
        MathFn::Atanh if x.abs() > 1.0 => Some(MathFault::Domain),
        MathFn::Atanh if x.abs() == 1.0 => Some(MathFault::Pole),
        MathFn::Sqrt | MathFn::Acosh | MathFn::Atanh | MathFn::Asinh | MathFn::Trunc => None,
    }
}
