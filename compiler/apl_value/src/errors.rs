//! Error codes for array operations.
//!
//! Cell-level primitives and value construction report failures as a plain
//! [`ErrorCode`]. The evaluation engine wraps a code into an [`AplError`]
//! together with optional detail text for the caller to render.

use std::fmt;

use thiserror::Error;

use crate::cell::Cell;

/// APL error class.
///
/// The `Display` text is the message an APL session would print on the first
/// line of the error report.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
pub enum ErrorCode {
    /// Illegal operand combination, non-finite result, or a disallowed
    /// divide/log/power case.
    #[error("DOMAIN ERROR")]
    Domain,
    /// Non-scalar operands of equal rank with different extents.
    #[error("LENGTH ERROR")]
    Length,
    /// Incompatible ranks, or a rank above the supported maximum.
    #[error("RANK ERROR")]
    Rank,
    /// Index outside the extent of its axis.
    #[error("INDEX ERROR")]
    Index,
    /// Malformed axis specification.
    #[error("AXIS ERROR")]
    Axis,
    /// Volume overflow or configured ravel limit exceeded.
    #[error("WS FULL")]
    WsFull,
    /// Reference to a value that no longer exists.
    #[error("VALUE ERROR")]
    NoValue,
}

/// Result of a cell-level primitive.
pub type CellResult = Result<Cell, ErrorCode>;

/// Error raised to callers of the array core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AplError {
    /// Error class.
    pub code: ErrorCode,
    /// Additional context (shown as `)MORE` information in a session).
    pub detail: Option<String>,
}

impl AplError {
    /// Create an error with no detail text.
    #[cold]
    pub fn new(code: ErrorCode) -> Self {
        AplError { code, detail: None }
    }

    /// Create an error with detail text.
    #[cold]
    pub fn with_detail(code: ErrorCode, detail: impl Into<String>) -> Self {
        AplError {
            code,
            detail: Some(detail.into()),
        }
    }
}

impl fmt::Display for AplError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {detail}", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

impl std::error::Error for AplError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.code)
    }
}

impl From<ErrorCode> for AplError {
    fn from(code: ErrorCode) -> Self {
        AplError::new(code)
    }
}

/// Shapes of two operands do not agree along some axis.
#[cold]
pub fn length_error(detail: impl Into<String>) -> AplError {
    AplError::with_detail(ErrorCode::Length, detail)
}

/// Operand ranks are incompatible.
#[cold]
pub fn rank_error(detail: impl Into<String>) -> AplError {
    AplError::with_detail(ErrorCode::Rank, detail)
}

/// Axis specification is malformed.
#[cold]
pub fn axis_error(detail: impl Into<String>) -> AplError {
    AplError::with_detail(ErrorCode::Axis, detail)
}

/// A result would exceed the configured size limit.
#[cold]
pub fn ws_full(cells: usize, limit: usize) -> AplError {
    AplError::with_detail(
        ErrorCode::WsFull,
        format!("{cells} cells requested, limit is {limit}"),
    )
}

/// A selective assignment targets a value that is no longer bound.
#[cold]
pub fn stale_reference(name: &str) -> AplError {
    AplError::with_detail(
        ErrorCode::NoValue,
        format!("reference into '{name}' outlived its value"),
    )
}
