//! Arithmetic primitives.

use std::f64::consts::PI;

use super::{numeric, numeric_pair, Cell, Num, NumPair};
use crate::complex::Complex;
use crate::errors::{CellResult, ErrorCode};
use crate::limits::{INTEGER_TOLERANCE, MAX_FACTORIAL_ARG};

/// Largest `n` for which `n!` fits in an `i64`.
const MAX_INT_FACTORIAL: i64 = 20;

#[inline]
fn int_or_float(z: Option<i64>, fallback: impl FnOnce() -> f64) -> CellResult {
    match z {
        Some(z) => Ok(Cell::Int(z)),
        None => Cell::float(fallback()),
    }
}

// Monadic

impl Cell {
    /// `+B`: complex conjugate; near-integral floats become integers.
    pub fn bif_conjugate(&self, qct: f64) -> CellResult {
        match numeric(self)? {
            Num::Int(b) => Ok(Cell::Int(b)),
            Num::Float(b) => match self.near_int(qct) {
                Some(i) => Ok(Cell::Int(i)),
                None => Ok(Cell::Float(b)),
            },
            Num::Complex(b) => Cell::complex(b.conj()),
        }
    }

    /// `-B`
    pub fn bif_negative(&self, _qct: f64) -> CellResult {
        match numeric(self)? {
            Num::Int(b) => int_or_float(b.checked_neg(), || -(b as f64)),
            Num::Float(b) => Ok(Cell::Float(-b)),
            Num::Complex(b) => Ok(Cell::Complex(-b)),
        }
    }

    /// `×B`: signum. Exact, without tolerance.
    pub fn bif_direction(&self, _qct: f64) -> CellResult {
        match numeric(self)? {
            Num::Int(b) => Ok(Cell::Int(b.signum())),
            Num::Float(b) if b == 0.0 => Ok(Cell::Int(0)),
            Num::Float(b) => Ok(Cell::Int(if b < 0.0 { -1 } else { 1 })),
            Num::Complex(b) if b.is_zero() => Ok(Cell::Int(0)),
            Num::Complex(b) => {
                let m = b.abs();
                Cell::complex(Complex::new(b.re / m, b.im / m))
            }
        }
    }

    /// `÷B`
    pub fn bif_reciprocal(&self, qct: f64) -> CellResult {
        if self.is_near_zero(qct) {
            return Err(ErrorCode::Domain);
        }
        match numeric(self)? {
            Num::Int(b @ (1 | -1)) => Ok(Cell::Int(b)),
            Num::Int(b) => Cell::float(1.0 / b as f64),
            Num::Float(b) => Cell::float(1.0 / b),
            Num::Complex(b) => Cell::complex_or_real(Complex::ONE / b, qct),
        }
    }

    /// `*B`: e to the power B.
    pub fn bif_exponential(&self, _qct: f64) -> CellResult {
        match numeric(self)? {
            Num::Int(b) => Cell::float((b as f64).exp()),
            Num::Float(b) => Cell::float(b.exp()),
            Num::Complex(b) => Cell::complex(b.exp()),
        }
    }

    /// `⍟B`: natural logarithm; negative reals give a complex result.
    pub fn bif_nat_log(&self, qct: f64) -> CellResult {
        match numeric(self)? {
            Num::Int(_) | Num::Float(_) => {
                let b = self.real().ok_or(ErrorCode::Domain)?;
                if b > 0.0 {
                    Cell::float(b.ln())
                } else if b < 0.0 {
                    Cell::complex(Complex::new((-b).ln(), PI))
                } else {
                    Err(ErrorCode::Domain)
                }
            }
            Num::Complex(b) if b.is_zero() => Err(ErrorCode::Domain),
            Num::Complex(b) => Cell::complex_or_real(b.ln(), qct),
        }
    }

    /// `|B`
    pub fn bif_magnitude(&self, _qct: f64) -> CellResult {
        match numeric(self)? {
            Num::Int(b) => int_or_float(b.checked_abs(), || (b as f64).abs()),
            Num::Float(b) => Ok(Cell::Float(b.abs())),
            Num::Complex(b) => Cell::float(b.abs()),
        }
    }

    /// `⌈B`: tolerant ceiling.
    pub fn bif_ceiling(&self, qct: f64) -> CellResult {
        match numeric(self)? {
            Num::Int(b) => Ok(Cell::Int(b)),
            Num::Float(b) => Cell::integral((b - qct).ceil()),
            Num::Complex(b) => Cell::complex(complex_ceiling(b)),
        }
    }

    /// `⌊B`: tolerant floor.
    pub fn bif_floor(&self, qct: f64) -> CellResult {
        match numeric(self)? {
            Num::Int(b) => Ok(Cell::Int(b)),
            Num::Float(b) => Cell::integral((b + qct).floor()),
            Num::Complex(b) => Cell::complex(complex_floor(b)),
        }
    }

    /// `○B`: π times B.
    pub fn bif_pi_times(&self, _qct: f64) -> CellResult {
        match numeric(self)? {
            Num::Int(b) => Cell::float(PI * b as f64),
            Num::Float(b) => Cell::float(PI * b),
            Num::Complex(b) => Cell::complex(Complex::from_real(PI) * b),
        }
    }

    /// `!B`: factorial, generalised through the gamma function.
    pub fn bif_factorial(&self, qct: f64) -> CellResult {
        if let Some(n) = self.near_int(qct) {
            return int_factorial(n);
        }
        let b = match numeric(self)? {
            Num::Float(b) => b,
            Num::Complex(c) if c.is_near_real(qct) => c.re,
            _ => return Err(ErrorCode::Domain),
        };
        if b > MAX_FACTORIAL_ARG {
            return Err(ErrorCode::Domain);
        }
        Cell::float(gamma(b + 1.0))
    }
}

fn int_factorial(n: i64) -> CellResult {
    if n < 0 {
        return Err(ErrorCode::Domain);
    }
    if n <= MAX_INT_FACTORIAL {
        return Ok(Cell::Int((2..=n).product()));
    }
    if n as f64 > MAX_FACTORIAL_ARG {
        return Err(ErrorCode::Domain);
    }
    Cell::float((2..=n).fold(1.0, |acc, k| acc * k as f64))
}

/// Complex ceiling (McDonnell). Ties on the fractional parts round the
/// imaginary part up.
pub(crate) fn complex_ceiling(b: Complex) -> Complex {
    let dr = b.re - b.re.floor();
    let di = b.im - b.im.floor();
    if dr + di > 1.0 {
        Complex::new(b.re.ceil(), b.im.ceil())
    } else if di >= dr {
        Complex::new(b.re.floor(), b.im.ceil())
    } else {
        Complex::new(b.re.ceil(), b.im.floor())
    }
}

/// Complex floor (McDonnell). Ties on the fractional parts round the real
/// part up.
pub(crate) fn complex_floor(b: Complex) -> Complex {
    let dr = b.re - b.re.floor();
    let di = b.im - b.im.floor();
    if dr + di < 1.0 {
        Complex::new(b.re.floor(), b.im.floor())
    } else if di > dr {
        Complex::new(b.re.floor(), b.im.ceil())
    } else {
        Complex::new(b.re.ceil(), b.im.floor())
    }
}

/// Gamma function (Lanczos approximation, g = 7).
pub(crate) fn gamma(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEF: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x <= 0.0 && x.fract() == 0.0 {
        return f64::INFINITY;
    }
    if x < 0.5 {
        // Reflection: Γ(x) Γ(1-x) = π / sin(πx)
        return PI / ((PI * x).sin() * gamma(1.0 - x));
    }
    let x = x - 1.0;
    let mut a = COEF[0];
    let mut k = 1.0;
    for c in &COEF[1..] {
        a += c / (x + k);
        k += 1.0;
    }
    let t = x + G + 0.5;
    // t^(x+0.5) split in two halves so that large arguments do not overflow
    // before the exp(-t) factor is applied.
    let half = t.powf(0.5 * (x + 0.5));
    (2.0 * PI).sqrt() * half * ((-t).exp() * half) * a
}

// Dyadic

impl Cell {
    /// `A + B`
    pub fn bif_add(&self, a: &Cell, _qct: f64) -> CellResult {
        match numeric_pair(a, self)? {
            NumPair::Int(a, b) => int_or_float(a.checked_add(b), || a as f64 + b as f64),
            NumPair::Float(a, b) => Cell::float(a + b),
            NumPair::Complex(a, b) => Cell::complex(a + b),
        }
    }

    /// `A - B`
    pub fn bif_subtract(&self, a: &Cell, _qct: f64) -> CellResult {
        match numeric_pair(a, self)? {
            NumPair::Int(a, b) => int_or_float(a.checked_sub(b), || a as f64 - b as f64),
            NumPair::Float(a, b) => Cell::float(a - b),
            NumPair::Complex(a, b) => Cell::complex(a - b),
        }
    }

    /// `A × B`
    pub fn bif_multiply(&self, a: &Cell, _qct: f64) -> CellResult {
        match numeric_pair(a, self)? {
            NumPair::Int(a, b) => int_or_float(a.checked_mul(b), || a as f64 * b as f64),
            NumPair::Float(a, b) => Cell::float(a * b),
            NumPair::Complex(a, b) => Cell::complex(a * b),
        }
    }

    /// `A ÷ B`. `0÷0` is 1; any other division by zero is DOMAIN.
    pub fn bif_divide(&self, a: &Cell, _qct: f64) -> CellResult {
        match numeric_pair(a, self)? {
            NumPair::Int(a, 0) => zero_divisor(a == 0),
            NumPair::Int(a, b) => match a.checked_rem(b) {
                Some(0) => int_or_float(a.checked_div(b), || a as f64 / b as f64),
                _ => Cell::float(a as f64 / b as f64),
            },
            NumPair::Float(a, b) if b == 0.0 => zero_divisor(a == 0.0),
            NumPair::Float(a, b) => Cell::float(a / b),
            NumPair::Complex(a, b) if b.is_zero() => zero_divisor(a.is_zero()),
            NumPair::Complex(a, b) => Cell::complex(a / b),
        }
    }

    /// `A * B`: A to the power B.
    pub fn bif_power(&self, a: &Cell, qct: f64) -> CellResult {
        match numeric_pair(a, self)? {
            NumPair::Int(a, b) if b >= 0 => {
                let z = u32::try_from(b).ok().and_then(|e| a.checked_pow(e));
                int_or_float(z, || (a as f64).powf(b as f64))
            }
            NumPair::Int(0, _) => Err(ErrorCode::Domain),
            NumPair::Int(a, b) => Cell::float((a as f64).powf(b as f64)),
            NumPair::Float(a, b) => real_power(a, b, qct),
            NumPair::Complex(a, b) => complex_power(a, b, qct),
        }
    }

    /// `A ⍟ B`: logarithm of B to base A.
    pub fn bif_logarithm(&self, a: &Cell, qct: f64) -> CellResult {
        let (a, b) = match numeric_pair(a, self)? {
            NumPair::Int(a, b) => (Complex::from_real(a as f64), Complex::from_real(b as f64)),
            NumPair::Float(a, b) => (Complex::from_real(a), Complex::from_real(b)),
            NumPair::Complex(a, b) => (a, b),
        };
        if a == b {
            return Ok(Cell::Int(1));
        }
        if b.is_zero() || (a - Complex::ONE).is_near_zero(qct) {
            return Err(ErrorCode::Domain);
        }
        if a.im == 0.0 && b.im == 0.0 && a.re > 0.0 && b.re > 0.0 {
            return Cell::float(b.re.ln() / a.re.ln());
        }
        Cell::complex_or_real(b.ln() / a.ln(), qct)
    }

    /// `A | B`: residue of B modulo A, taking the sign of A.
    pub fn bif_residue(&self, a: &Cell, qct: f64) -> CellResult {
        match numeric_pair(a, self)? {
            NumPair::Int(0, _) => Ok(self.clone()),
            NumPair::Int(a, b) => {
                let r = b.checked_rem(a).unwrap_or(0);
                if r != 0 && (r < 0) != (a < 0) {
                    int_or_float(r.checked_add(a), || r as f64 + a as f64)
                } else {
                    Ok(Cell::Int(r))
                }
            }
            NumPair::Float(a, _) if a == 0.0 => Ok(self.clone()),
            NumPair::Float(a, b) => {
                let mut r = b % a;
                if r != 0.0 && (r < 0.0) != (a < 0.0) {
                    r += a;
                }
                if qct != 0.0 && (r.abs() < qct || (a - r).abs() < qct) {
                    Ok(Cell::Int(0))
                } else {
                    Cell::float(r)
                }
            }
            NumPair::Complex(a, _) if a.is_near_zero(qct) => Ok(self.clone()),
            NumPair::Complex(_, b) if b.is_near_zero(qct) => Ok(Cell::Int(0)),
            NumPair::Complex(a, b) => {
                let q = complex_floor(b / a);
                Cell::complex(b - a * q)
            }
        }
    }

    /// `A ! B`: binomial coefficient, B things taken A at a time.
    pub fn bif_binomial(&self, a: &Cell, qct: f64) -> CellResult {
        let (Some(_), Some(_)) = (a.as_complex(), self.as_complex()) else {
            return Err(ErrorCode::Domain);
        };
        if let (Some(k), Some(n)) = (a.near_int(INTEGER_TOLERANCE), self.near_int(INTEGER_TOLERANCE)) {
            return int_binomial(k, n);
        }
        let (k, n) = match numeric_pair(a, self)? {
            NumPair::Int(k, n) => (k as f64, n as f64),
            NumPair::Float(k, n) => (k, n),
            NumPair::Complex(k, n) if k.is_near_real(qct) && n.is_near_real(qct) => (k.re, n.re),
            NumPair::Complex(..) => return Err(ErrorCode::Domain),
        };
        let num = gamma(n + 1.0);
        let den_k = gamma(k + 1.0);
        let den_d = gamma(n - k + 1.0);
        if !den_k.is_finite() || !den_d.is_finite() {
            // A pole in the denominator.
            return Ok(Cell::Int(0));
        }
        Cell::float(num / (den_k * den_d))
    }
}

#[inline]
fn zero_divisor(dividend_is_zero: bool) -> CellResult {
    if dividend_is_zero {
        Ok(Cell::Int(1))
    } else {
        Err(ErrorCode::Domain)
    }
}

fn real_power(a: f64, b: f64, qct: f64) -> CellResult {
    if a == 0.0 {
        return if b == 0.0 {
            Ok(Cell::Int(1))
        } else if b > 0.0 {
            Ok(Cell::Float(0.0))
        } else {
            Err(ErrorCode::Domain)
        };
    }
    if a < 0.0 && b.fract() != 0.0 {
        let z = Complex::from_real(a).powc(Complex::from_real(b));
        return Cell::complex_or_real(z, qct);
    }
    Cell::float(a.powf(b))
}

fn complex_power(a: Complex, b: Complex, qct: f64) -> CellResult {
    if a.is_zero() {
        return if b.is_zero() {
            Ok(Cell::Int(1))
        } else if b.re > 0.0 {
            Ok(Cell::Int(0))
        } else {
            Err(ErrorCode::Domain)
        };
    }
    Cell::complex_or_real(a.powc(b), qct)
}

/// Binomial of integers, extended to negative arguments by the sign rules
/// of the ISO standard.
fn int_binomial(k: i64, n: i64) -> CellResult {
    let d = i128::from(n) - i128::from(k);
    match (k < 0, n < 0, d < 0) {
        (false, false, false) => choose(n, k),
        (false, true, _) => {
            // (¯1*A) × A ! A-B+1
            let m = i64::try_from(i128::from(k) - i128::from(n) - 1).map_err(|_| ErrorCode::Domain)?;
            signed(k, choose(m, k)?)
        }
        (true, true, false) => {
            // (¯1*B-A) × (|B+1) ! (|A+1)
            let top = i64::try_from(-(i128::from(k) + 1)).map_err(|_| ErrorCode::Domain)?;
            let bottom = i64::try_from(-(i128::from(n) + 1)).map_err(|_| ErrorCode::Domain)?;
            let parity = i64::try_from(d.rem_euclid(2)).map_err(|_| ErrorCode::Domain)?;
            signed(parity, choose(top, bottom)?)
        }
        _ => Ok(Cell::Int(0)),
    }
}

/// `cell` negated when `parity` is odd.
fn signed(parity: i64, cell: Cell) -> CellResult {
    if parity.rem_euclid(2) == 0 {
        Ok(cell)
    } else {
        cell.bif_negative(0.0)
    }
}

/// `n` choose `k` for `0 ≤ k ≤ n`; falls back to Float past `i64`.
fn choose(n: i64, k: i64) -> CellResult {
    let k = k.min(n - k);
    let mut exact: Option<i128> = Some(1);
    let mut approx = 1.0_f64;
    for i in 0..k {
        let num = i128::from(n - i);
        let den = i128::from(i + 1);
        // The running product of i+1 consecutive terms is always divisible
        // by (i+1)!, so the division is exact.
        exact = exact.and_then(|z| z.checked_mul(num)).map(|z| z / den);
        approx *= (n - i) as f64 / (i + 1) as f64;
    }
    match exact.and_then(|z| i64::try_from(z).ok()) {
        Some(z) => Ok(Cell::Int(z)),
        None => Cell::float(approx.round()),
    }
}
