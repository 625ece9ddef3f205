//! Boolean and bitwise primitives.
//!
//! `∧` and `∨` are the boolean functions on booleans and extend to least
//! common multiple and greatest common divisor on other integers and reals.

use super::Cell;
use crate::errors::{CellResult, ErrorCode};

impl Cell {
    /// `~B`
    pub fn bif_not(&self, qct: f64) -> CellResult {
        let b = self.near_bool(qct).ok_or(ErrorCode::Domain)?;
        Ok(Cell::Int(i64::from(!b)))
    }

    /// `A ∧ B`: and, or least common multiple.
    pub fn bif_and(&self, a: &Cell, qct: f64) -> CellResult {
        if let (Some(x), Some(y)) = (a.near_bool(qct), self.near_bool(qct)) {
            return Ok(Cell::Int(i64::from(x && y)));
        }
        if let (Some(x), Some(y)) = (a.near_int(qct), self.near_int(qct)) {
            return int_lcm(x, y);
        }
        let (x, y) = reals(a, self)?;
        let g = real_gcd(x, y, qct);
        if g == 0.0 {
            return Ok(Cell::Int(0));
        }
        Cell::float(x * (y / g))
    }

    /// `A ∨ B`: or, or greatest common divisor.
    pub fn bif_or(&self, a: &Cell, qct: f64) -> CellResult {
        if let (Some(x), Some(y)) = (a.near_bool(qct), self.near_bool(qct)) {
            return Ok(Cell::Int(i64::from(x || y)));
        }
        if let (Some(x), Some(y)) = (a.near_int(qct), self.near_int(qct)) {
            return int_gcd(x, y);
        }
        let (x, y) = reals(a, self)?;
        Cell::float(real_gcd(x, y, qct))
    }

    /// `A ⍲ B`
    pub fn bif_nand(&self, a: &Cell, qct: f64) -> CellResult {
        let (x, y) = bools(a, self, qct)?;
        Ok(Cell::Int(i64::from(!(x && y))))
    }

    /// `A ⍱ B`
    pub fn bif_nor(&self, a: &Cell, qct: f64) -> CellResult {
        let (x, y) = bools(a, self, qct)?;
        Ok(Cell::Int(i64::from(!(x || y))))
    }

    /// Bitwise complement of an integer.
    pub fn bif_bit_not(&self, qct: f64) -> CellResult {
        let b = self.near_int(qct).ok_or(ErrorCode::Domain)?;
        Ok(Cell::Int(!b))
    }

    /// Bitwise and of two integers.
    pub fn bif_bit_and(&self, a: &Cell, qct: f64) -> CellResult {
        let (x, y) = ints(a, self, qct)?;
        Ok(Cell::Int(x & y))
    }

    /// Bitwise or of two integers.
    pub fn bif_bit_or(&self, a: &Cell, qct: f64) -> CellResult {
        let (x, y) = ints(a, self, qct)?;
        Ok(Cell::Int(x | y))
    }

    /// Bitwise exclusive or of two integers.
    pub fn bif_bit_xor(&self, a: &Cell, qct: f64) -> CellResult {
        let (x, y) = ints(a, self, qct)?;
        Ok(Cell::Int(x ^ y))
    }
}

fn bools(a: &Cell, b: &Cell, qct: f64) -> Result<(bool, bool), ErrorCode> {
    match (a.near_bool(qct), b.near_bool(qct)) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(ErrorCode::Domain),
    }
}

fn ints(a: &Cell, b: &Cell, qct: f64) -> Result<(i64, i64), ErrorCode> {
    if !a.is_numeric() || !b.is_numeric() {
        return Err(ErrorCode::Domain);
    }
    match (a.near_int(qct), b.near_int(qct)) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(ErrorCode::Domain),
    }
}

fn reals(a: &Cell, b: &Cell) -> Result<(f64, f64), ErrorCode> {
    match (a.real(), b.real()) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(ErrorCode::Domain),
    }
}

fn int_gcd(a: i64, b: i64) -> CellResult {
    let mut x = a.unsigned_abs();
    let mut y = b.unsigned_abs();
    while y != 0 {
        (x, y) = (y, x % y);
    }
    match i64::try_from(x) {
        Ok(g) => Ok(Cell::Int(g)),
        Err(_) => Cell::float(x as f64),
    }
}

fn int_lcm(a: i64, b: i64) -> CellResult {
    if a == 0 || b == 0 {
        return Ok(Cell::Int(0));
    }
    let Cell::Int(g) = int_gcd(a, b)? else {
        return Err(ErrorCode::Domain);
    };
    match (a / g).checked_mul(b) {
        Some(z) => Ok(Cell::Int(z)),
        None => Cell::float((a / g) as f64 * b as f64),
    }
}

/// Euclid on reals, stopping once the remainder is within tolerance of 0.
fn real_gcd(a: f64, b: f64, qct: f64) -> f64 {
    let mut x = a.abs();
    let mut y = b.abs();
    let tol = qct.max(f64::EPSILON) * x.max(y).max(1.0);
    while y > tol {
        (x, y) = (y, x % y);
    }
    x
}
