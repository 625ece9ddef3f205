//! Scalar cells.
//!
//! A [`Cell`] is one element of a value's ravel. Numeric, character and
//! nested elements share one closed enum; the scalar primitives are methods
//! on `Cell` grouped by concern:
//!
//! - `arith`: `+ - × ÷ * ⍟ | !` and their monadic forms, `⌈ ⌊` monadic
//! - `circle`: `○` monadic and dyadic
//! - `compare`: `< ≤ = ≥ > ≠` and `⌈ ⌊` dyadic
//! - `logic`: `~ ∧ ∨ ⍲ ⍱` and the bitwise integer functions
//!
//! # Receiver Convention
//!
//! Dyadic methods compute `Z ← A f B` with `B` as the receiver:
//! `b.bif_subtract(a, qct)` is `A - B`. Every method takes the comparison
//! tolerance so that all primitives fit one function-pointer type.
//!
//! # Promotion
//!
//! Operands are promoted along Integer < Float < Complex before an operation
//! (see [`NumPair`]). Integer overflow falls back to Float; a non-finite
//! Float or Complex result is a DOMAIN error.

mod arith;
mod circle;
mod compare;
mod logic;

pub use compare::tolerant_eq;

use std::fmt;

use crate::complex::Complex;
use crate::errors::{CellResult, ErrorCode};
use crate::limits::{INTEGER_TOLERANCE, LARGE_INT};
use crate::value::{LvalRef, ValueP};

/// Monadic scalar primitive: `Z ← f B`.
pub type MonadicCellFn = fn(&Cell, f64) -> CellResult;

/// Dyadic scalar primitive: `Z ← A f B`, called as `f(B, A, qct)`.
pub type DyadicCellFn = fn(&Cell, &Cell, f64) -> CellResult;

/// One ravel element.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Complex(Complex),
    Char(char),
    /// A nested value.
    Pointer(ValueP),
    /// Target of a selective assignment.
    Lval(LvalRef),
}

impl Cell {
    /// A float cell, or DOMAIN if `v` is not finite.
    #[inline]
    pub fn float(v: f64) -> CellResult {
        if v.is_finite() {
            Ok(Cell::Float(v))
        } else {
            Err(ErrorCode::Domain)
        }
    }

    /// A complex cell, or DOMAIN if either part is not finite.
    #[inline]
    pub fn complex(c: Complex) -> CellResult {
        if c.is_finite() {
            Ok(Cell::Complex(c))
        } else {
            Err(ErrorCode::Domain)
        }
    }

    /// An integer cell for an integral float when it fits, else a float cell.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "range checked against LARGE_INT"
    )]
    pub fn integral(v: f64) -> CellResult {
        if !v.is_finite() {
            return Err(ErrorCode::Domain);
        }
        if v.abs() < LARGE_INT {
            Ok(Cell::Int(v as i64))
        } else {
            Ok(Cell::Float(v))
        }
    }

    /// A complex result, demoted to a real cell when its imaginary part is
    /// within `qct` of zero.
    pub fn complex_or_real(c: Complex, qct: f64) -> CellResult {
        if c.is_near_real(qct) {
            Cell::float(c.re)
        } else {
            Cell::complex(c)
        }
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Int(_) | Cell::Float(_) | Cell::Complex(_))
    }

    #[inline]
    pub fn is_real(&self) -> bool {
        matches!(self, Cell::Int(_) | Cell::Float(_))
    }

    #[inline]
    pub fn is_character(&self) -> bool {
        matches!(self, Cell::Char(_))
    }

    #[inline]
    pub fn is_pointer(&self) -> bool {
        matches!(self, Cell::Pointer(_))
    }

    #[inline]
    pub fn is_lval(&self) -> bool {
        matches!(self, Cell::Lval(_))
    }

    /// The nested value of a pointer cell.
    #[inline]
    pub fn pointer_value(&self) -> Option<&ValueP> {
        match self {
            Cell::Pointer(v) => Some(v),
            _ => None,
        }
    }

    /// Real value of an integer or float cell.
    #[inline]
    pub fn real(&self) -> Option<f64> {
        match *self {
            Cell::Int(i) => Some(i as f64),
            Cell::Float(f) => Some(f),
            _ => None,
        }
    }

    /// Value of any numeric cell as a complex number.
    #[inline]
    pub fn as_complex(&self) -> Option<Complex> {
        match *self {
            Cell::Complex(c) => Some(c),
            _ => self.real().map(Complex::from_real),
        }
    }

    /// The integer this cell is within `tolerance` of, if any.
    ///
    /// Complex cells qualify when they are near-real.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "range checked against LARGE_INT"
    )]
    pub fn near_int(&self, tolerance: f64) -> Option<i64> {
        let v = match *self {
            Cell::Int(i) => return Some(i),
            Cell::Float(f) => f,
            Cell::Complex(c) if c.is_near_real(tolerance) => c.re,
            _ => return None,
        };
        let r = v.round();
        if r.abs() < LARGE_INT && (v - r).abs() < tolerance {
            Some(r as i64)
        } else {
            None
        }
    }

    /// Whether this cell is an integer within [`INTEGER_TOLERANCE`].
    #[inline]
    pub fn is_near_int(&self) -> bool {
        self.near_int(INTEGER_TOLERANCE).is_some()
    }

    /// The boolean this cell is within `qct` of, if any.
    pub fn near_bool(&self, qct: f64) -> Option<bool> {
        match self.near_int(qct)? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }

    /// Whether this cell is numeric and within `qct` of zero.
    pub fn is_near_zero(&self, qct: f64) -> bool {
        match *self {
            Cell::Int(i) => i == 0,
            Cell::Float(f) => f.abs() < qct,
            Cell::Complex(c) => c.is_near_zero(qct),
            _ => false,
        }
    }

    /// The prototype of this cell: 0 for numbers, space for characters, and
    /// the prototype of the nested value for pointers.
    pub fn to_proto(&self) -> Cell {
        match self {
            Cell::Char(_) => Cell::Char(' '),
            Cell::Pointer(v) => Cell::Pointer(v.proto()),
            _ => Cell::Int(0),
        }
    }

    /// Exact identity, comparing floats by bit pattern and nested values
    /// element by element.
    pub fn identical(&self, other: &Cell) -> bool {
        match (self, other) {
            (Cell::Int(a), Cell::Int(b)) => a == b,
            (Cell::Float(a), Cell::Float(b)) => a.to_bits() == b.to_bits(),
            (Cell::Complex(a), Cell::Complex(b)) => {
                a.re.to_bits() == b.re.to_bits() && a.im.to_bits() == b.im.to_bits()
            }
            (Cell::Char(a), Cell::Char(b)) => a == b,
            (Cell::Pointer(a), Cell::Pointer(b)) => a.identical(b),
            (Cell::Lval(a), Cell::Lval(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<char> for Cell {
    fn from(v: char) -> Self {
        Cell::Char(v)
    }
}

impl From<Complex> for Cell {
    fn from(v: Complex) -> Self {
        Cell::Complex(v)
    }
}

impl From<ValueP> for Cell {
    fn from(v: ValueP) -> Self {
        Cell::Pointer(v)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(i) if *i < 0 => write!(f, "¯{}", i.unsigned_abs()),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Complex(c) => write!(f, "{c}"),
            Cell::Char(c) => write!(f, "{c}"),
            Cell::Pointer(v) => write!(f, "⊂{}", v.shape()),
            Cell::Lval(r) => write!(f, "{r}"),
        }
    }
}

/// Two numeric operands promoted to a common representation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum NumPair {
    Int(i64, i64),
    Float(f64, f64),
    Complex(Complex, Complex),
}

/// Promote `a` and `b` along Integer < Float < Complex.
///
/// Non-numeric operands are a DOMAIN error.
pub(crate) fn numeric_pair(a: &Cell, b: &Cell) -> Result<NumPair, ErrorCode> {
    Ok(match (a, b) {
        (&Cell::Int(a), &Cell::Int(b)) => NumPair::Int(a, b),
        (Cell::Complex(_), _) | (_, Cell::Complex(_)) => {
            let a = a.as_complex().ok_or(ErrorCode::Domain)?;
            let b = b.as_complex().ok_or(ErrorCode::Domain)?;
            NumPair::Complex(a, b)
        }
        _ => {
            let a = a.real().ok_or(ErrorCode::Domain)?;
            let b = b.real().ok_or(ErrorCode::Domain)?;
            NumPair::Float(a, b)
        }
    })
}

/// Numeric value of a single operand, keeping its rank in the lattice.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Num {
    Int(i64),
    Float(f64),
    Complex(Complex),
}

pub(crate) fn numeric(b: &Cell) -> Result<Num, ErrorCode> {
    match *b {
        Cell::Int(i) => Ok(Num::Int(i)),
        Cell::Float(f) => Ok(Num::Float(f)),
        Cell::Complex(c) => Ok(Num::Complex(c)),
        _ => Err(ErrorCode::Domain),
    }
}
