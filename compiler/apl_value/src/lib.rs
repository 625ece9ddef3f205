//! APL Value - array value model for the APL interpreter.
//!
//! This crate provides:
//! - Scalar cells (`Cell`) and every scalar primitive on them
//! - Shapes (`Shape`) and the odometer iterators over them
//! - Array values (`Value`) with shared ownership of nested sub-arrays
//! - The live-value registry and its diagnostic sweep
//! - Error codes (`ErrorCode`, `AplError`)
//!
//! # Ownership
//!
//! A `Value` is built as an owned array and becomes shareable only through
//! `ValueP`, which marks it complete. Shared values are never mutated in
//! place; `Binding::isolate` and `ValueP::make_mut` clone a shared value
//! before a write. No value can therefore contain itself.

mod cell;
mod complex;
mod errors;
pub mod iter;
pub mod limits;
mod shape;
mod stack;
mod value;

pub use cell::{tolerant_eq, Cell, DyadicCellFn, MonadicCellFn};
pub use complex::Complex;
pub use errors::{AplError, CellResult, ErrorCode};
pub use iter::{
    ArrayIterator, AxisIterator, IndexIterator, MultiIndexIterator, PermutedArrayIterator,
};
pub use shape::{AxisVec, Shape};
pub use stack::ensure_sufficient_stack;
pub use value::{
    is_live, live_count, live_entry, sweep, Binding, LiveEntry, LvalRef, SweepReport, Value,
    ValueFlags, ValueId, ValueP,
};

// Re-export error constructors for use by other crates
pub use errors::{axis_error, length_error, rank_error, stale_reference, ws_full};
