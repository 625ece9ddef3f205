//! The scalar primitive functions.
//!
//! A [`ScalarFn`] names one primitive and resolves to the cell-level
//! implementation of its monadic and dyadic forms. Dispatch is a plain
//! match on the function, done once per evaluation rather than per cell.

use std::fmt;

use apl_value::{Cell, DyadicCellFn, MonadicCellFn};

/// A scalar primitive function.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScalarFn {
    /// `+` conjugate / add
    Plus,
    /// `-` negative / subtract
    Minus,
    /// `×` direction / multiply
    Times,
    /// `÷` reciprocal / divide
    Divide,
    /// `*` exponential / power
    Star,
    /// `⍟` natural log / logarithm
    Log,
    /// `|` magnitude / residue
    Stile,
    /// `⌈` ceiling / maximum
    UpStile,
    /// `⌊` floor / minimum
    DownStile,
    /// `○` pi times / circle functions
    Circle,
    /// `!` factorial / binomial
    Quote,
    /// `~` not
    Tilde,
    And,
    Or,
    Nand,
    Nor,
    Less,
    LessEq,
    Equal,
    GreaterEq,
    Greater,
    NotEqual,
    /// `⊤∧` bitwise and
    BitAnd,
    /// `⊤∨` bitwise or
    BitOr,
    /// `⊤≠` bitwise xor
    BitXor,
    /// `⊤∼` bitwise not
    BitNot,
}

impl ScalarFn {
    /// Every scalar primitive.
    pub const ALL: [ScalarFn; 26] = [
        ScalarFn::Plus,
        ScalarFn::Minus,
        ScalarFn::Times,
        ScalarFn::Divide,
        ScalarFn::Star,
        ScalarFn::Log,
        ScalarFn::Stile,
        ScalarFn::UpStile,
        ScalarFn::DownStile,
        ScalarFn::Circle,
        ScalarFn::Quote,
        ScalarFn::Tilde,
        ScalarFn::And,
        ScalarFn::Or,
        ScalarFn::Nand,
        ScalarFn::Nor,
        ScalarFn::Less,
        ScalarFn::LessEq,
        ScalarFn::Equal,
        ScalarFn::GreaterEq,
        ScalarFn::Greater,
        ScalarFn::NotEqual,
        ScalarFn::BitAnd,
        ScalarFn::BitOr,
        ScalarFn::BitXor,
        ScalarFn::BitNot,
    ];

    /// The APL glyph(s) of this function.
    pub fn symbol(self) -> &'static str {
        match self {
            ScalarFn::Plus => "+",
            ScalarFn::Minus => "-",
            ScalarFn::Times => "×",
            ScalarFn::Divide => "÷",
            ScalarFn::Star => "*",
            ScalarFn::Log => "⍟",
            ScalarFn::Stile => "|",
            ScalarFn::UpStile => "⌈",
            ScalarFn::DownStile => "⌊",
            ScalarFn::Circle => "○",
            ScalarFn::Quote => "!",
            ScalarFn::Tilde => "~",
            ScalarFn::And => "∧",
            ScalarFn::Or => "∨",
            ScalarFn::Nand => "⍲",
            ScalarFn::Nor => "⍱",
            ScalarFn::Less => "<",
            ScalarFn::LessEq => "≤",
            ScalarFn::Equal => "=",
            ScalarFn::GreaterEq => "≥",
            ScalarFn::Greater => ">",
            ScalarFn::NotEqual => "≠",
            ScalarFn::BitAnd => "⊤∧",
            ScalarFn::BitOr => "⊤∨",
            ScalarFn::BitXor => "⊤≠",
            ScalarFn::BitNot => "⊤∼",
        }
    }

    /// Look a function up by its glyph(s).
    pub fn from_symbol(symbol: &str) -> Option<ScalarFn> {
        ScalarFn::ALL.into_iter().find(|f| f.symbol() == symbol)
    }

    /// The cell implementation of `f B`, if the function has a monadic form.
    pub fn monadic(self) -> Option<MonadicCellFn> {
        let f: MonadicCellFn = match self {
            ScalarFn::Plus => Cell::bif_conjugate,
            ScalarFn::Minus => Cell::bif_negative,
            ScalarFn::Times => Cell::bif_direction,
            ScalarFn::Divide => Cell::bif_reciprocal,
            ScalarFn::Star => Cell::bif_exponential,
            ScalarFn::Log => Cell::bif_nat_log,
            ScalarFn::Stile => Cell::bif_magnitude,
            ScalarFn::UpStile => Cell::bif_ceiling,
            ScalarFn::DownStile => Cell::bif_floor,
            ScalarFn::Circle => Cell::bif_pi_times,
            ScalarFn::Quote => Cell::bif_factorial,
            ScalarFn::Tilde => Cell::bif_not,
            ScalarFn::BitNot => Cell::bif_bit_not,
            _ => return None,
        };
        Some(f)
    }

    /// The cell implementation of `A f B`, if the function has a dyadic form.
    ///
    /// The returned function is called with `B` first: `f(B, A, qct)`.
    pub fn dyadic(self) -> Option<DyadicCellFn> {
        let f: DyadicCellFn = match self {
            ScalarFn::Plus => Cell::bif_add,
            ScalarFn::Minus => Cell::bif_subtract,
            ScalarFn::Times => Cell::bif_multiply,
            ScalarFn::Divide => Cell::bif_divide,
            ScalarFn::Star => Cell::bif_power,
            ScalarFn::Log => Cell::bif_logarithm,
            ScalarFn::Stile => Cell::bif_residue,
            ScalarFn::UpStile => Cell::bif_maximum,
            ScalarFn::DownStile => Cell::bif_minimum,
            ScalarFn::Circle => Cell::bif_circle,
            ScalarFn::Quote => Cell::bif_binomial,
            ScalarFn::And => Cell::bif_and,
            ScalarFn::Or => Cell::bif_or,
            ScalarFn::Nand => Cell::bif_nand,
            ScalarFn::Nor => Cell::bif_nor,
            ScalarFn::Less => Cell::bif_less_than,
            ScalarFn::LessEq => Cell::bif_less_eq,
            ScalarFn::Equal => Cell::bif_equal,
            ScalarFn::GreaterEq => Cell::bif_greater_eq,
            ScalarFn::Greater => Cell::bif_greater_than,
            ScalarFn::NotEqual => Cell::bif_not_equal,
            ScalarFn::BitAnd => Cell::bif_bit_and,
            ScalarFn::BitOr => Cell::bif_bit_or,
            ScalarFn::BitXor => Cell::bif_bit_xor,
            ScalarFn::Tilde | ScalarFn::BitNot => return None,
        };
        Some(f)
    }

    /// The identity element of the dyadic form: the `I` with `I f B ≡ B`,
    /// which reducing an empty array along an axis yields.
    pub fn identity(self) -> Option<Cell> {
        match self {
            ScalarFn::Plus
            | ScalarFn::Minus
            | ScalarFn::Stile
            | ScalarFn::Or
            | ScalarFn::NotEqual
            | ScalarFn::Less
            | ScalarFn::Greater
            | ScalarFn::BitOr
            | ScalarFn::BitXor => Some(Cell::Int(0)),
            ScalarFn::Times
            | ScalarFn::Divide
            | ScalarFn::Star
            | ScalarFn::Quote
            | ScalarFn::And
            | ScalarFn::Equal
            | ScalarFn::LessEq
            | ScalarFn::GreaterEq => Some(Cell::Int(1)),
            ScalarFn::DownStile => Some(Cell::Float(f64::MAX)),
            ScalarFn::UpStile => Some(Cell::Float(-f64::MAX)),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests;
