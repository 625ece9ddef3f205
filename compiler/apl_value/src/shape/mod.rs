//! Array shapes.
//!
//! A [`Shape`] is the list of axis extents of a value, at most
//! [`MAX_RANK`] long. The volume is cached and recomputed on every change so
//! the ravel length of a value can be checked in O(1).

use std::fmt;

use smallvec::SmallVec;

use crate::errors::ErrorCode;
use crate::limits::{MAX_RANK, MAX_VOLUME};

/// Inline storage for one entry per axis.
pub type AxisVec<T> = SmallVec<[T; MAX_RANK]>;

/// Axis extents of an array value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    extents: AxisVec<usize>,
    volume: usize,
}

impl Shape {
    /// The shape of a scalar: rank 0, volume 1.
    pub fn scalar() -> Self {
        Shape {
            extents: SmallVec::new(),
            volume: 1,
        }
    }

    /// The shape of a vector of `len` elements.
    pub fn vector(len: usize) -> Self {
        let mut extents = SmallVec::new();
        extents.push(len);
        Shape {
            extents,
            volume: len,
        }
    }

    /// Build a shape from explicit extents.
    ///
    /// Fails with RANK if there are more than [`MAX_RANK`] axes and with
    /// WS FULL if the volume is not representable.
    pub fn new(extents: &[usize]) -> Result<Self, ErrorCode> {
        if extents.len() > MAX_RANK {
            return Err(ErrorCode::Rank);
        }
        let extents: AxisVec<usize> = extents.iter().copied().collect();
        let volume = volume_of(&extents)?;
        Ok(Shape { extents, volume })
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    #[inline]
    pub fn volume(&self) -> usize {
        self.volume
    }

    #[inline]
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Extent of `axis`, or `None` if the axis does not exist.
    #[inline]
    pub fn extent(&self, axis: usize) -> Option<usize> {
        self.extents.get(axis).copied()
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.extents.is_empty()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.volume == 0
    }

    /// Change the extent of one axis and recompute the volume.
    pub fn set_extent(&mut self, axis: usize, len: usize) -> Result<(), ErrorCode> {
        let slot = self.extents.get_mut(axis).ok_or(ErrorCode::Rank)?;
        let old = std::mem::replace(slot, len);
        match volume_of(&self.extents) {
            Ok(volume) => {
                self.volume = volume;
                Ok(())
            }
            Err(e) => {
                self.extents[axis] = old;
                Err(e)
            }
        }
    }

    /// Append a trailing axis.
    pub fn push_axis(&mut self, len: usize) -> Result<(), ErrorCode> {
        if self.rank() >= MAX_RANK {
            return Err(ErrorCode::Rank);
        }
        let volume = self.volume.checked_mul(len).ok_or(ErrorCode::WsFull)?;
        if volume > MAX_VOLUME {
            return Err(ErrorCode::WsFull);
        }
        self.extents.push(len);
        self.volume = volume;
        Ok(())
    }

    /// The shape with `axis` removed.
    pub fn without_axis(&self, axis: usize) -> Result<Shape, ErrorCode> {
        if axis >= self.rank() {
            return Err(ErrorCode::Axis);
        }
        let extents: AxisVec<usize> = self
            .extents
            .iter()
            .enumerate()
            .filter(|&(r, _)| r != axis)
            .map(|(_, &len)| len)
            .collect();
        Shape::new(&extents)
    }

    /// The shape whose axis `r` has the extent of axis `perm[r]` of `self`.
    ///
    /// `perm` must be a permutation of `0..rank`.
    pub fn permuted(&self, perm: &[usize]) -> Result<Shape, ErrorCode> {
        if perm.len() != self.rank() {
            return Err(ErrorCode::Rank);
        }
        let mut seen = [false; MAX_RANK];
        let mut extents = AxisVec::new();
        for &p in perm {
            let len = self.extent(p).ok_or(ErrorCode::Axis)?;
            if std::mem::replace(&mut seen[p], true) {
                return Err(ErrorCode::Axis);
            }
            extents.push(len);
        }
        Ok(Shape {
            extents,
            volume: self.volume,
        })
    }

    /// Row-major weight of every axis.
    ///
    /// The weight of axis `r` is the product of the extents after `r`, so the
    /// last axis has weight 1.
    pub fn weights(&self) -> AxisVec<usize> {
        let mut weights: AxisVec<usize> = SmallVec::from_elem(1, self.rank());
        let mut acc = 1_usize;
        for r in (0..self.rank()).rev() {
            weights[r] = acc;
            // Bounded by the volume, which has already been checked; an empty
            // axis makes every higher weight zero, which no offset uses.
            acc = acc.saturating_mul(self.extents[r]);
        }
        weights
    }

    /// Flat ravel offset of a full index, or `None` if any index is out of
    /// range or the index has the wrong rank.
    pub fn offset_of(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.rank() {
            return None;
        }
        let mut offset = 0_usize;
        for (&i, &len) in index.iter().zip(&self.extents) {
            if i >= len {
                return None;
            }
            offset = offset.checked_mul(len)?.checked_add(i)?;
        }
        Some(offset)
    }

    /// Whether the two shapes have the same rank.
    #[inline]
    pub fn same_rank(&self, other: &Shape) -> bool {
        self.rank() == other.rank()
    }
}

impl Default for Shape {
    fn default() -> Self {
        Shape::scalar()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, len) in self.extents.iter().enumerate() {
            if r > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{len}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({self})")
    }
}

fn volume_of(extents: &[usize]) -> Result<usize, ErrorCode> {
    if extents.contains(&0) {
        return Ok(0);
    }
    let mut volume = 1_usize;
    for &len in extents {
        volume = volume.checked_mul(len).ok_or(ErrorCode::WsFull)?;
    }
    if volume > MAX_VOLUME {
        return Err(ErrorCode::WsFull);
    }
    Ok(volume)
}
