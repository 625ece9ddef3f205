//! Structural reads driven by the shape iterators.

use super::Value;
use crate::cell::Cell;
use crate::errors::ErrorCode;
use crate::iter::{MultiIndexIterator, PermutedArrayIterator};

impl Value {
    /// The array with its axes reordered: axis `r` of the result is axis
    /// `perm[r]` of `self`.
    #[track_caller]
    pub fn transposed(&self, perm: &[usize]) -> Result<Value, ErrorCode> {
        let walk = PermutedArrayIterator::new(self.shape(), perm)?;
        let shape = walk.shape().clone();
        if self.is_empty() {
            return Value::from_cells(shape, vec![self.first().clone()]);
        }
        let cells = walk.map(|offset| self.ravel[offset].clone()).collect();
        Value::from_cells(shape, cells)
    }

    /// Indexed selection `A[I;J;…]`, one entry per axis, `None` for an
    /// elided axis. Indices count from `io`.
    #[track_caller]
    pub fn select(&self, indices: &[Option<&Value>], io: i64) -> Result<Value, ErrorCode> {
        let walk = MultiIndexIterator::new(self.shape(), indices, io)?;
        let shape = walk.shape().clone();
        let mut cells: Vec<Cell> = walk.map(|offset| self.ravel[offset].clone()).collect();
        if cells.is_empty() {
            cells.push(self.first().to_proto());
        }
        Value::from_cells(shape, cells)
    }
}
