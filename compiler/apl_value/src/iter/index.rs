//! Index-list iterators for indexed selection and assignment.
//!
//! `A[I;J]` walks every combination of one index from `I` and one from `J`,
//! odometer style. An axis whose index list is elided (`A[;J]`) walks the
//! whole axis.

use super::AxisIterator;
use crate::cell::Cell;
use crate::errors::ErrorCode;
use crate::limits::{INTEGER_TOLERANCE, MAX_RANK};
use crate::shape::{AxisVec, Shape};
use crate::value::Value;

/// Walk over the indices of one axis.
#[derive(Clone, Debug)]
pub enum IndexIterator {
    /// Every index of the axis, in order.
    Elided(AxisIterator),
    /// An explicit list; `offsets` are already multiplied by the axis weight.
    True { offsets: Vec<usize>, pos: usize },
}

impl IndexIterator {
    /// Walk the whole axis.
    pub fn elided(len: usize, weight: usize) -> Self {
        IndexIterator::Elided(AxisIterator::new(len, weight))
    }

    /// Walk an explicit index list.
    ///
    /// Indices count from `io`; each must land in `0..max` after `io` is
    /// subtracted, or the list is an INDEX error.
    pub fn explicit(indices: &[i64], max: usize, io: i64, weight: usize) -> Result<Self, ErrorCode> {
        let offsets = indices
            .iter()
            .map(|&i| checked_index(i, max, io).map(|i| i * weight))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(IndexIterator::True { offsets, pos: 0 })
    }

    /// Walk the indices held in `indices`, which must be near-integers.
    pub fn from_value(indices: &Value, max: usize, io: i64, weight: usize) -> Result<Self, ErrorCode> {
        let ints = indices.ravel()[..indices.element_count()]
            .iter()
            .map(index_cell)
            .collect::<Result<Vec<_>, _>>()?;
        IndexIterator::explicit(&ints, max, io, weight)
    }

    /// Number of indices walked before the first wrap.
    pub fn len(&self) -> usize {
        match self {
            IndexIterator::Elided(axis) => axis.len(),
            IndexIterator::True { offsets, .. } => offsets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Weighted offset of the current index.
    #[inline]
    pub fn current(&self) -> usize {
        match self {
            IndexIterator::Elided(axis) => axis.offset(),
            IndexIterator::True { offsets, pos } => offsets.get(*pos).copied().unwrap_or(0),
        }
    }

    /// Step to the next index. Returns `true` if the list wrapped.
    #[inline]
    pub fn advance(&mut self) -> bool {
        match self {
            IndexIterator::Elided(axis) => axis.advance(),
            IndexIterator::True { offsets, pos } => {
                *pos += 1;
                if *pos >= offsets.len() {
                    *pos = 0;
                    return true;
                }
                false
            }
        }
    }
}

fn checked_index(i: i64, max: usize, io: i64) -> Result<usize, ErrorCode> {
    let zero_based = i.checked_sub(io).ok_or(ErrorCode::Index)?;
    let zero_based = usize::try_from(zero_based).map_err(|_| ErrorCode::Index)?;
    if zero_based >= max {
        return Err(ErrorCode::Index);
    }
    Ok(zero_based)
}

fn index_cell(cell: &Cell) -> Result<i64, ErrorCode> {
    match cell {
        Cell::Int(i) => Ok(*i),
        Cell::Float(_) | Cell::Complex(_) => cell.near_int(INTEGER_TOLERANCE).ok_or(ErrorCode::Domain),
        _ => Err(ErrorCode::Domain),
    }
}

/// Walk over one index list per axis of a target shape.
///
/// Yields target ravel offsets in row-major order of the result, whose shape
/// is the concatenation of the index shapes (the axis extent for an elided
/// axis).
#[derive(Clone, Debug)]
pub struct MultiIndexIterator {
    axes: AxisVec<IndexIterator>,
    shape: Shape,
    /// Target offset of the current combination.
    offset: usize,
    remaining: usize,
}

impl MultiIndexIterator {
    /// `indices` holds one entry per axis of `target`; `None` elides an axis.
    pub fn new(target: &Shape, indices: &[Option<&Value>], io: i64) -> Result<Self, ErrorCode> {
        if indices.len() != target.rank() {
            return Err(ErrorCode::Index);
        }
        let weights = target.weights();
        let mut axes = AxisVec::new();
        let mut extents: SmallExtents = SmallExtents::new();
        for (r, index) in indices.iter().enumerate() {
            let len = target.extents()[r];
            match index {
                None => {
                    axes.push(IndexIterator::elided(len, weights[r]));
                    extents.push(len);
                }
                Some(index) => {
                    axes.push(IndexIterator::from_value(index, len, io, weights[r])?);
                    extents.extend_from_slice(index.shape().extents());
                }
            }
        }
        if extents.len() > MAX_RANK {
            return Err(ErrorCode::Rank);
        }
        let shape = Shape::new(&extents)?;
        let offset: usize = axes.iter().map(IndexIterator::current).sum();
        Ok(MultiIndexIterator {
            remaining: shape.volume(),
            axes,
            shape,
            offset,
        })
    }

    /// Shape of the selection.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    fn step(&mut self) {
        for axis in self.axes.iter_mut().rev() {
            let before = axis.current();
            let wrapped = axis.advance();
            self.offset = self.offset - before + axis.current();
            if !wrapped {
                return;
            }
        }
    }
}

type SmallExtents = smallvec::SmallVec<[usize; 2 * MAX_RANK]>;

impl Iterator for MultiIndexIterator {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.offset;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.step();
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for MultiIndexIterator {}
