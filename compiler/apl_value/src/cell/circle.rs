//! Circle functions.
//!
//! `A ○ B` selects one of 25 functions by the integer A in `¯12..12`:
//!
//! | A  | function         | A   | function        |
//! |----|------------------|-----|-----------------|
//! | 0  | `(1-B*2)*0.5`    |     |                 |
//! | 1  | `sin`            | ¯1  | `arcsin`        |
//! | 2  | `cos`            | ¯2  | `arccos`        |
//! | 3  | `tan`            | ¯3  | `arctan`        |
//! | 4  | `(1+B*2)*0.5`    | ¯4  | `(¯1+B*2)*0.5`  |
//! | 5  | `sinh`           | ¯5  | `arcsinh`       |
//! | 6  | `cosh`           | ¯6  | `arccosh`       |
//! | 7  | `tanh`           | ¯7  | `arctanh`       |
//! | 8  | `(¯1-B*2)*0.5`   | ¯8  | `-(¯1-B*2)*0.5` |
//! | 9  | real part        | ¯9  | `B`             |
//! | 10 | magnitude        | ¯10 | conjugate       |
//! | 11 | imaginary part   | ¯11 | `0J1×B`         |
//! | 12 | phase            | ¯12 | `*0J1×B`        |
//!
//! Real arguments outside a function's real domain continue on the complex
//! path; results that come back near-real are demoted.

use std::f64::consts::PI;

use super::{numeric, Cell, Num};
use crate::complex::Complex;
use crate::errors::{CellResult, ErrorCode};
use crate::limits::INTEGER_TOLERANCE;

impl Cell {
    /// `A ○ B`
    pub fn bif_circle(&self, a: &Cell, qct: f64) -> CellResult {
        if !a.is_numeric() {
            return Err(ErrorCode::Domain);
        }
        let fun = a.near_int(INTEGER_TOLERANCE).ok_or(ErrorCode::Domain)?;
        match numeric(self)? {
            Num::Int(b) => real_circle(fun, b as f64, qct),
            Num::Float(b) => real_circle(fun, b, qct),
            Num::Complex(b) => complex_circle(fun, b, qct),
        }
    }
}

fn real_circle(fun: i64, b: f64, qct: f64) -> CellResult {
    let z = match fun {
        -12 => return Cell::complex(Complex::new(0.0, b).exp()),
        -11 => return Cell::complex(Complex::new(0.0, b)),
        -10 | -9 | 9 => b,
        -8 => {
            let sq = (b * b + 1.0).sqrt();
            return Cell::complex(Complex::new(0.0, if b < 0.0 { -sq } else { sq }));
        }
        -7 if b > -1.0 && b < 1.0 => b.atanh(),
        -7 if b == -1.0 || b == 1.0 => return Err(ErrorCode::Domain),
        -6 if b >= 1.0 => b.acosh(),
        -5 => b.asinh(),
        -4 if b >= 1.0 || b <= -1.0 => (b * b - 1.0).sqrt(),
        -3 => b.atan(),
        -2 if (-1.0..=1.0).contains(&b) => b.acos(),
        -1 if (-1.0..=1.0).contains(&b) => b.asin(),
        0 if b * b <= 1.0 => (1.0 - b * b).sqrt(),
        1 => b.sin(),
        2 => b.cos(),
        3 => b.tan(),
        4 => (1.0 + b * b).sqrt(),
        5 => b.sinh(),
        6 => b.cosh(),
        7 => b.tanh(),
        8 => {
            let sq = (b * b + 1.0).sqrt();
            return Cell::complex(Complex::new(0.0, if b < 0.0 { sq } else { -sq }));
        }
        10 => b.abs(),
        11 => 0.0,
        12 => {
            if b < 0.0 {
                PI
            } else {
                0.0
            }
        }
        -7..=0 => return complex_circle(fun, Complex::from_real(b), qct),
        _ => return Err(ErrorCode::Domain),
    };
    Cell::float(z)
}

fn complex_circle(fun: i64, b: Complex, qct: f64) -> CellResult {
    let one = Complex::ONE;
    let z = match fun {
        -12 => Complex::new(-b.im, b.re).exp(),
        -11 => Complex::new(-b.im, b.re),
        -10 => b.conj(),
        -9 => b,
        -8 | 8 => {
            let pos = if b.re > 0.0 {
                b.im > 0.0
            } else if b.re == 0.0 {
                b.im > 1.0
            } else {
                b.im >= 0.0
            };
            let sq = (-(one + b * b)).sqrt();
            if pos == (fun == 8) {
                sq
            } else {
                -sq
            }
        }
        -7 => b.atanh(),
        -6 => b.acosh(),
        -5 => b.asinh(),
        -4 => (b * b - one).sqrt(),
        -3 => b.atan(),
        -2 => b.acos(),
        -1 => b.asin(),
        0 => (one - b * b).sqrt(),
        1 => b.sin(),
        2 => b.cos(),
        3 => b.tan(),
        4 => (one + b * b).sqrt(),
        5 => b.sinh(),
        6 => b.cosh(),
        7 => b.tanh(),
        9 => return Cell::float(b.re),
        10 => return Cell::float(b.abs()),
        11 => return Cell::float(b.im),
        12 if b.is_near_zero(qct) => return Ok(Cell::Float(0.0)),
        12 => return Cell::float(b.arg()),
        _ => return Err(ErrorCode::Domain),
    };
    Cell::complex_or_real(z, qct)
}
