//! Comparison, maximum and minimum.

use std::cmp::Ordering;

use super::{numeric_pair, Cell, NumPair};
use crate::complex::Complex;
use crate::errors::{CellResult, ErrorCode};

/// Tolerant equality of two reals.
///
/// Values of different sign are never equal. The tolerance is relative to
/// the larger magnitude once that exceeds 1.
pub fn tolerant_eq(a: f64, b: f64, qct: f64) -> bool {
    if a == b {
        return true;
    }
    if (a < 0.0) != (b < 0.0) {
        return false;
    }
    let scale = a.abs().max(b.abs());
    let tol = if scale > 1.0 { qct * scale } else { qct };
    (a.abs() - b.abs()).abs() < tol
}

impl Cell {
    /// Tolerant equality with another simple cell.
    ///
    /// A character never equals a number. Nested and lvalue cells are a
    /// DOMAIN error.
    pub fn equal(&self, other: &Cell, qct: f64) -> Result<bool, ErrorCode> {
        match (self, other) {
            (Cell::Char(a), Cell::Char(b)) => Ok(a == b),
            (Cell::Char(_), o) | (o, Cell::Char(_)) if o.is_numeric() => Ok(false),
            _ => Ok(match numeric_pair(self, other)? {
                NumPair::Int(a, b) => a == b,
                NumPair::Float(a, b) => tolerant_eq(a, b, qct),
                NumPair::Complex(a, b) => a.near_equal(b, qct),
            }),
        }
    }

    /// Tolerant ordering of A relative to B. Characters and complex values
    /// that are not near-real are a DOMAIN error.
    pub fn compare_real(a: &Cell, b: &Cell, qct: f64) -> Result<Ordering, ErrorCode> {
        let (a, b) = match numeric_pair(a, b)? {
            NumPair::Int(a, b) => return Ok(a.cmp(&b)),
            NumPair::Float(a, b) => (a, b),
            NumPair::Complex(a, b) => (near_real(a, qct)?, near_real(b, qct)?),
        };
        if tolerant_eq(a, b, qct) {
            Ok(Ordering::Equal)
        } else if a < b {
            Ok(Ordering::Less)
        } else {
            Ok(Ordering::Greater)
        }
    }

    /// `A = B`
    pub fn bif_equal(&self, a: &Cell, qct: f64) -> CellResult {
        Ok(bool_cell(a.equal(self, qct)?))
    }

    /// `A ≠ B`
    pub fn bif_not_equal(&self, a: &Cell, qct: f64) -> CellResult {
        Ok(bool_cell(!a.equal(self, qct)?))
    }

    /// `A < B`
    pub fn bif_less_than(&self, a: &Cell, qct: f64) -> CellResult {
        Ok(bool_cell(Cell::compare_real(a, self, qct)?.is_lt()))
    }

    /// `A ≤ B`
    pub fn bif_less_eq(&self, a: &Cell, qct: f64) -> CellResult {
        Ok(bool_cell(Cell::compare_real(a, self, qct)?.is_le()))
    }

    /// `A > B`
    pub fn bif_greater_than(&self, a: &Cell, qct: f64) -> CellResult {
        Ok(bool_cell(Cell::compare_real(a, self, qct)?.is_gt()))
    }

    /// `A ≥ B`
    pub fn bif_greater_eq(&self, a: &Cell, qct: f64) -> CellResult {
        Ok(bool_cell(Cell::compare_real(a, self, qct)?.is_ge()))
    }

    /// `A ⌈ B`: the larger operand, keeping its own type.
    pub fn bif_maximum(&self, a: &Cell, qct: f64) -> CellResult {
        pick(a, self, qct, true)
    }

    /// `A ⌊ B`: the smaller operand, keeping its own type.
    pub fn bif_minimum(&self, a: &Cell, qct: f64) -> CellResult {
        pick(a, self, qct, false)
    }
}

#[inline]
fn bool_cell(b: bool) -> Cell {
    Cell::Int(i64::from(b))
}

#[inline]
fn near_real(c: Complex, qct: f64) -> Result<f64, ErrorCode> {
    if c.is_near_real(qct) {
        Ok(c.re)
    } else {
        Err(ErrorCode::Domain)
    }
}

/// The larger (`max`) or smaller operand. Ties go to A. Integer winners
/// stay integers; near-real complex operands compete by their real part.
fn pick(a: &Cell, b: &Cell, qct: f64, max: bool) -> CellResult {
    if let (&Cell::Int(x), &Cell::Int(y)) = (a, b) {
        let take_a = if max { x >= y } else { x <= y };
        return Ok(Cell::Int(if take_a { x } else { y }));
    }
    let ra = real_part(a, qct)?;
    let rb = real_part(b, qct)?;
    let take_a = if max { ra >= rb } else { ra <= rb };
    match if take_a { a } else { b } {
        Cell::Complex(c) => Cell::float(c.re),
        winner => Ok(winner.clone()),
    }
}

fn real_part(c: &Cell, qct: f64) -> Result<f64, ErrorCode> {
    match *c {
        Cell::Int(i) => Ok(i as f64),
        Cell::Float(f) => Ok(f),
        Cell::Complex(z) => near_real(z, qct),
        _ => Err(ErrorCode::Domain),
    }
}
