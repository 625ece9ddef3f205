//! Complex numbers for complex cells.
//!
//! Only what the scalar primitives need: field arithmetic, the elementary
//! functions behind `*`, `⍟` and `○`, and tolerant helpers that decide when a
//! complex result may be demoted to a real one.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A complex number with `f64` parts.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };
    pub const ONE: Complex = Complex { re: 1.0, im: 0.0 };
    pub const I: Complex = Complex { re: 0.0, im: 1.0 };

    #[inline]
    pub const fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }

    #[inline]
    pub const fn from_real(re: f64) -> Self {
        Complex { re, im: 0.0 }
    }

    /// Magnitude, computed without intermediate overflow.
    #[inline]
    pub fn abs(self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Principal argument in `(-π, π]`.
    #[inline]
    pub fn arg(self) -> f64 {
        self.im.atan2(self.re)
    }

    #[inline]
    pub fn conj(self) -> Self {
        Complex::new(self.re, -self.im)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.re == 0.0 && self.im == 0.0
    }

    /// Whether the imaginary part is negligible relative to `qct`.
    #[inline]
    pub fn is_near_real(self, qct: f64) -> bool {
        self.im.abs() <= qct
    }

    /// Whether both parts are within `qct` of zero.
    #[inline]
    pub fn is_near_zero(self, qct: f64) -> bool {
        self.re.abs() < qct && self.im.abs() < qct
    }

    pub fn exp(self) -> Self {
        let r = self.re.exp();
        Complex::new(r * self.im.cos(), r * self.im.sin())
    }

    /// Principal natural logarithm.
    pub fn ln(self) -> Self {
        Complex::new(self.abs().ln(), self.arg())
    }

    /// Principal square root.
    pub fn sqrt(self) -> Self {
        let r = self.abs();
        let re = ((r + self.re) / 2.0).sqrt();
        let im = ((r - self.re) / 2.0).sqrt();
        Complex::new(re, if self.im < 0.0 { -im } else { im })
    }

    /// `self` raised to `w` via the principal logarithm. The caller handles a
    /// zero base.
    pub fn powc(self, w: Complex) -> Self {
        (w * self.ln()).exp()
    }

    pub fn sin(self) -> Self {
        Complex::new(
            self.re.sin() * self.im.cosh(),
            self.re.cos() * self.im.sinh(),
        )
    }

    pub fn cos(self) -> Self {
        Complex::new(
            self.re.cos() * self.im.cosh(),
            -(self.re.sin() * self.im.sinh()),
        )
    }

    pub fn tan(self) -> Self {
        self.sin() / self.cos()
    }

    pub fn sinh(self) -> Self {
        Complex::new(
            self.re.sinh() * self.im.cos(),
            self.re.cosh() * self.im.sin(),
        )
    }

    pub fn cosh(self) -> Self {
        Complex::new(
            self.re.cosh() * self.im.cos(),
            self.re.sinh() * self.im.sin(),
        )
    }

    pub fn tanh(self) -> Self {
        self.sinh() / self.cosh()
    }

    pub fn asin(self) -> Self {
        // -i ln(iz + sqrt(1 - z²))
        let w = (Complex::ONE - self * self).sqrt();
        -(Complex::I * (Complex::I * self + w).ln())
    }

    pub fn acos(self) -> Self {
        // -i ln(z + i sqrt(1 - z²))
        let w = (Complex::ONE - self * self).sqrt();
        -(Complex::I * (self + Complex::I * w).ln())
    }

    pub fn atan(self) -> Self {
        // (i/2) (ln(1 - iz) - ln(1 + iz))
        let iz = Complex::I * self;
        let d = (Complex::ONE - iz).ln() - (Complex::ONE + iz).ln();
        Complex::new(0.0, 0.5) * d
    }

    pub fn asinh(self) -> Self {
        (self + (self * self + Complex::ONE).sqrt()).ln()
    }

    pub fn acosh(self) -> Self {
        (self + (self + Complex::ONE).sqrt() * (self - Complex::ONE).sqrt()).ln()
    }

    pub fn atanh(self) -> Self {
        let d = (Complex::ONE + self).ln() - (Complex::ONE - self).ln();
        Complex::new(0.5 * d.re, 0.5 * d.im)
    }

    /// Tolerant equality: `|A-B| ≤ qct × max(|A|,|B|)`.
    pub fn near_equal(self, other: Complex, qct: f64) -> bool {
        if self == other {
            return true;
        }
        let scale = self.abs().max(other.abs());
        (self - other).abs() <= qct * scale
    }
}

impl Add for Complex {
    type Output = Complex;
    #[inline]
    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Complex;
    #[inline]
    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Complex;
    #[inline]
    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Div for Complex {
    type Output = Complex;
    fn div(self, rhs: Complex) -> Complex {
        let d = rhs.re * rhs.re + rhs.im * rhs.im;
        Complex::new(
            (self.re * rhs.re + self.im * rhs.im) / d,
            (self.im * rhs.re - self.re * rhs.im) / d,
        )
    }
}

impl Neg for Complex {
    type Output = Complex;
    #[inline]
    fn neg(self) -> Complex {
        Complex::new(-self.re, -self.im)
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}J{}", self.re, self.im)
    }
}
