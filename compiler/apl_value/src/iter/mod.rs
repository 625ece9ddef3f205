//! Odometer traversal of array shapes.
//!
//! Every iterator here counts like a mixed-radix odometer: one
//! [`AxisIterator`] per axis, the last axis turning fastest, a wrap on one
//! axis carrying into the next slower one. Each axis carries a weight, and the
//! flat offset is kept incrementally as the sum of `position × weight` over
//! all axes, so a step costs O(1) amortized whatever the weights are.
//!
//! - [`ArrayIterator`] walks a shape in row-major order. With the shape's own
//!   weights it yields `0, 1, 2, ...`; with other weights (including 0 for
//!   axes an operand does not have) it yields offsets into another array.
//! - [`PermutedArrayIterator`] walks the axes of a shape in a chosen order.
//! - [`IndexIterator`] and [`MultiIndexIterator`] walk explicit index lists.

mod index;

use crate::errors::ErrorCode;
use crate::shape::{AxisVec, Shape};

pub use index::{IndexIterator, MultiIndexIterator};

/// Counter over `0..len` along one axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AxisIterator {
    len: usize,
    weight: usize,
    pos: usize,
}

impl AxisIterator {
    pub fn new(len: usize, weight: usize) -> Self {
        AxisIterator {
            len,
            weight,
            pos: 0,
        }
    }

    /// A degenerate axis of length 1 and weight 0.
    pub fn scalar() -> Self {
        AxisIterator::new(1, 0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn weight(&self) -> usize {
        self.weight
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Contribution of this axis to the flat offset.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos * self.weight
    }

    /// Step to the next position. Returns `true` if the axis wrapped back to 0.
    #[inline]
    pub fn advance(&mut self) -> bool {
        self.pos += 1;
        if self.pos >= self.len {
            self.pos = 0;
            return true;
        }
        false
    }
}

/// Row-major walk over a shape, yielding one weighted offset per position.
#[derive(Clone, Debug)]
pub struct ArrayIterator {
    axes: AxisVec<AxisIterator>,
    offset: usize,
    remaining: usize,
}

impl ArrayIterator {
    /// Walk `shape`, yielding its own ravel offsets `0..volume`.
    pub fn new(shape: &Shape) -> Self {
        let axes = shape
            .extents()
            .iter()
            .zip(shape.weights())
            .map(|(&len, weight)| AxisIterator::new(len, weight))
            .collect();
        ArrayIterator::from_axes(axes, shape.volume())
    }

    /// Walk `shape`, yielding offsets under the given per-axis weights.
    ///
    /// A weight of 0 repeats the same offset along that axis, which is how a
    /// lower-rank operand is spread across the axes it lacks.
    pub fn with_weights(shape: &Shape, weights: &[usize]) -> Result<Self, ErrorCode> {
        if weights.len() != shape.rank() {
            return Err(ErrorCode::Rank);
        }
        let axes = shape
            .extents()
            .iter()
            .zip(weights)
            .map(|(&len, &weight)| AxisIterator::new(len, weight))
            .collect();
        Ok(ArrayIterator::from_axes(axes, shape.volume()))
    }

    fn from_axes(axes: AxisVec<AxisIterator>, volume: usize) -> Self {
        ArrayIterator {
            axes,
            offset: 0,
            remaining: volume,
        }
    }

    /// The current position as one index per axis.
    pub fn index(&self) -> AxisVec<usize> {
        self.axes.iter().map(AxisIterator::pos).collect()
    }

    /// Whether every position has been yielded.
    #[inline]
    pub fn done(&self) -> bool {
        self.remaining == 0
    }

    fn step(&mut self) {
        for axis in self.axes.iter_mut().rev() {
            let before = axis.offset();
            let carried = axis.advance();
            self.offset = self.offset - before + axis.offset();
            if !carried {
                return;
            }
        }
    }
}

impl Iterator for ArrayIterator {
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

impl ExactSizeIterator for ArrayIterator {}

/// Walk over a shape with its axes taken in a chosen order.
///
/// Axis `r` of the walk is axis `perm[r]` of the source shape. The walk is
/// row-major in the permuted shape and yields the matching source offsets, so
/// collecting source cells in that order transposes the array.
#[derive(Clone, Debug)]
pub struct PermutedArrayIterator {
    inner: ArrayIterator,
    shape: Shape,
}

impl PermutedArrayIterator {
    /// `perm` must be a permutation of `0..rank`; otherwise RANK (wrong
    /// length) or AXIS (repeated or out-of-range axis).
    pub fn new(source: &Shape, perm: &[usize]) -> Result<Self, ErrorCode> {
        let shape = source.permuted(perm)?;
        let source_weights = source.weights();
        let weights: AxisVec<usize> = perm.iter().map(|&p| source_weights[p]).collect();
        let inner = ArrayIterator::with_weights(&shape, &weights)?;
        Ok(PermutedArrayIterator { inner, shape })
    }

    /// Shape of the permuted walk.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The current position in permuted axis order.
    pub fn index(&self) -> AxisVec<usize> {
        self.inner.index()
    }
}

impl Iterator for PermutedArrayIterator {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for PermutedArrayIterator {}
