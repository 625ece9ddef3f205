//! Array values.
//!
//! A [`Value`] is a shape plus a row-major ravel of [`Cell`]s. The ravel
//! always holds `max(1, volume)` cells: an empty value keeps exactly one
//! prototype cell describing the type of its absent elements.
//!
//! # Ownership
//!
//! Nested values live behind [`ValueP`] (an `Arc`), so one sub-array can be
//! shared by many pointer cells. Values are built as owned `Value`s, then
//! shared; a shared value is never written in place (see
//! [`ValueP::make_mut`] and [`Binding`]).
//!
//! # Liveness
//!
//! Every value registers itself in a process-wide table on construction and
//! leaves it on drop. [`sweep`] compares that table against the values
//! reachable from a set of bindings to find leaked or half-built values.

mod binding;
mod handle;
mod registry;
mod structural;

use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use bitflags::bitflags;

use crate::cell::Cell;
use crate::errors::ErrorCode;
use crate::shape::Shape;
use crate::stack::ensure_sufficient_stack;

pub use binding::{Binding, LvalRef};
pub use handle::ValueP;
pub use registry::{is_live, live_count, live_entry, sweep, LiveEntry, SweepReport};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a value, stable for its lifetime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(u64);

impl ValueId {
    fn fresh() -> Self {
        ValueId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

bitflags! {
    /// Lifecycle state of a value.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct ValueFlags: u8 {
        /// Every ravel cell has been written.
        const COMPLETE = 1 << 0;
        /// Bound to a name.
        const ASSIGNED = 1 << 1;
        /// Reached by the current diagnostic sweep.
        const MARKED = 1 << 2;
    }
}

/// An APL array.
pub struct Value {
    id: ValueId,
    shape: Shape,
    ravel: Vec<Cell>,
    flags: AtomicU8,
}

impl Value {
    #[track_caller]
    fn with_ravel(shape: Shape, ravel: Vec<Cell>, flags: ValueFlags) -> Value {
        debug_assert_eq!(ravel.len(), shape.volume().max(1));
        let id = ValueId::fresh();
        registry::register(
            id,
            Location::caller(),
            ravel.len(),
            flags.contains(ValueFlags::COMPLETE),
        );
        Value {
            id,
            shape,
            ravel,
            flags: AtomicU8::new(flags.bits()),
        }
    }

    /// A scalar holding `cell`.
    #[track_caller]
    pub fn scalar(cell: Cell) -> Value {
        Value::with_ravel(Shape::scalar(), vec![cell], ValueFlags::COMPLETE)
    }

    /// A complete value of the given shape filled with the prototype 0.
    #[track_caller]
    pub fn from_shape(shape: Shape) -> Value {
        let len = shape.volume().max(1);
        Value::with_ravel(shape, vec![Cell::Int(0); len], ValueFlags::COMPLETE)
    }

    /// A zero-filled value that is not yet complete.
    ///
    /// The builder writes cells with [`Value::set_cell`] and finishes with
    /// [`Value::check`]. If it is dropped or leaked before that, a
    /// [`sweep`] reports it as incomplete.
    #[track_caller]
    pub fn partial(shape: Shape) -> Value {
        let len = shape.volume().max(1);
        Value::with_ravel(shape, vec![Cell::Int(0); len], ValueFlags::empty())
    }

    /// A zero-filled numeric vector of `len` elements.
    #[track_caller]
    pub fn vector_of_len(len: usize) -> Value {
        Value::from_shape(Shape::vector(len))
    }

    /// A complete value from a shape and its ravel.
    ///
    /// `cells` must hold exactly `volume` cells, or one prototype cell when
    /// the shape is empty.
    #[track_caller]
    pub fn from_cells(shape: Shape, cells: Vec<Cell>) -> Result<Value, ErrorCode> {
        if cells.len() != shape.volume().max(1) {
            return Err(ErrorCode::Length);
        }
        Ok(Value::with_ravel(shape, cells, ValueFlags::COMPLETE))
    }

    /// A vector of `cells`; an empty list gives an empty numeric vector.
    #[track_caller]
    pub fn vector(cells: Vec<Cell>) -> Value {
        let shape = Shape::vector(cells.len());
        let cells = if cells.is_empty() {
            vec![Cell::Int(0)]
        } else {
            cells
        };
        Value::with_ravel(shape, cells, ValueFlags::COMPLETE)
    }

    /// An integer vector.
    #[track_caller]
    pub fn ints(items: &[i64]) -> Value {
        Value::vector(items.iter().copied().map(Cell::Int).collect())
    }

    /// A character vector; the empty string gives an empty vector with
    /// prototype space.
    #[track_caller]
    pub fn string(text: &str) -> Value {
        let cells: Vec<Cell> = text.chars().map(Cell::Char).collect();
        if cells.is_empty() {
            return Value::with_ravel(
                Shape::vector(0),
                vec![Cell::Char(' ')],
                ValueFlags::COMPLETE,
            );
        }
        Value::vector(cells)
    }

    /// A character vector with one character per byte.
    #[track_caller]
    pub fn from_bytes(bytes: &[u8]) -> Value {
        if bytes.is_empty() {
            return Value::string("");
        }
        Value::vector(bytes.iter().map(|&b| Cell::Char(char::from(b))).collect())
    }

    #[inline]
    pub fn id(&self) -> ValueId {
        self.id
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Number of elements (the volume of the shape).
    #[inline]
    pub fn element_count(&self) -> usize {
        self.shape.volume()
    }

    /// Number of ravel cells, counting the prototype of an empty value.
    #[inline]
    pub fn nz_element_count(&self) -> usize {
        self.ravel.len()
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.shape.is_scalar()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    /// The ravel, including the prototype cell of an empty value.
    #[inline]
    pub fn ravel(&self) -> &[Cell] {
        &self.ravel
    }

    #[inline]
    pub fn cell(&self, offset: usize) -> Option<&Cell> {
        self.ravel.get(offset)
    }

    /// The first ravel cell; the prototype of an empty value.
    #[inline]
    pub fn first(&self) -> &Cell {
        &self.ravel[0]
    }

    pub fn flags(&self) -> ValueFlags {
        ValueFlags::from_bits_truncate(self.flags.load(Ordering::Acquire))
    }

    /// Set `flag`, returning whether it was already set.
    pub(crate) fn set_flag(&self, flag: ValueFlags) -> bool {
        let old = self.flags.fetch_or(flag.bits(), Ordering::AcqRel);
        old & flag.bits() != 0
    }

    pub(crate) fn clear_flag(&self, flag: ValueFlags) {
        self.flags.fetch_and(!flag.bits(), Ordering::AcqRel);
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.flags().contains(ValueFlags::COMPLETE)
    }

    fn set_complete(&mut self) {
        if !self.set_flag(ValueFlags::COMPLETE) {
            registry::note_complete(self.id);
        }
    }

    /// Validate the ravel against the shape and mark the value complete.
    pub fn check(&mut self) -> Result<(), ErrorCode> {
        if self.ravel.len() != self.shape.volume().max(1) {
            return Err(ErrorCode::Length);
        }
        self.set_complete();
        Ok(())
    }

    /// Overwrite one ravel cell.
    pub fn set_cell(&mut self, offset: usize, cell: Cell) -> Result<(), ErrorCode> {
        let slot = self.ravel.get_mut(offset).ok_or(ErrorCode::Index)?;
        *slot = cell;
        Ok(())
    }

    /// Whether no element is a nested value.
    pub fn is_simple(&self) -> bool {
        !self.ravel.iter().any(Cell::is_pointer)
    }

    /// Whether this is a scalar holding a simple cell.
    pub fn is_simple_scalar(&self) -> bool {
        self.is_scalar() && !self.first().is_pointer()
    }

    /// Whether this is a character vector.
    pub fn is_char_string(&self) -> bool {
        self.rank() == 1
            && (self.is_empty() || self.ravel.iter().all(Cell::is_character))
            && self.first().is_character()
    }

    #[inline]
    pub fn same_shape(&self, other: &Value) -> bool {
        self.shape == other.shape
    }

    #[inline]
    pub fn same_rank(&self, other: &Value) -> bool {
        self.shape.same_rank(&other.shape)
    }

    /// Nesting depth: 0 for a simple scalar, 1 for a simple array, and one
    /// more than the deepest element otherwise.
    pub fn depth(&self) -> usize {
        ensure_sufficient_stack(|| {
            if self.is_scalar() {
                return match self.first() {
                    Cell::Pointer(v) => 1 + v.depth(),
                    _ => 0,
                };
            }
            let sub = self
                .ravel
                .iter()
                .filter_map(Cell::pointer_value)
                .map(|v| v.depth())
                .max()
                .unwrap_or(0);
            1 + sub
        })
    }

    /// The prototype of this array: the first element with every leaf
    /// replaced by 0 or space. A nested first element yields its own
    /// prototype, not an enclosure of it.
    #[track_caller]
    pub fn prototype(&self) -> Value {
        match self.first() {
            Cell::Pointer(v) => v.to_proto_value(),
            cell => Value::scalar(cell.to_proto()),
        }
    }

    /// Replace every element by its prototype, keeping the shape.
    pub fn to_proto(&mut self) {
        ensure_sufficient_stack(|| {
            for cell in &mut self.ravel {
                *cell = cell.to_proto();
            }
        });
    }

    /// A copy of this value with every element replaced by its prototype.
    #[track_caller]
    pub(crate) fn to_proto_value(&self) -> Value {
        let ravel: Vec<Cell> =
            ensure_sufficient_stack(|| self.ravel.iter().map(Cell::to_proto).collect());
        Value::with_ravel(self.shape.clone(), ravel, ValueFlags::COMPLETE)
    }

    /// A deep copy with its own identity and no shared sub-values.
    #[track_caller]
    pub fn clone_deep(&self) -> Value {
        let ravel: Vec<Cell> = ensure_sufficient_stack(|| {
            self.ravel
                .iter()
                .map(|cell| match cell {
                    Cell::Pointer(v) => Cell::Pointer(ValueP::new(v.clone_deep())),
                    other => other.clone(),
                })
                .collect()
        });
        let flags = self.flags() & ValueFlags::COMPLETE;
        Value::with_ravel(self.shape.clone(), ravel, flags)
    }

    /// Exact structural identity, comparing floats by bit pattern.
    pub fn identical(&self, other: &Value) -> bool {
        self.shape == other.shape
            && ensure_sufficient_stack(|| {
                self.ravel
                    .iter()
                    .zip(&other.ravel)
                    .all(|(a, b)| a.identical(b))
            })
    }
}

impl Clone for Value {
    /// Deep copy; see [`Value::clone_deep`].
    #[track_caller]
    fn clone(&self) -> Self {
        self.clone_deep()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && ensure_sufficient_stack(|| self.ravel == other.ravel)
    }
}

impl Drop for Value {
    /// Sub-values this value solely owns are released from a worklist, so
    /// freeing a deep chain does not recurse.
    fn drop(&mut self) {
        registry::unregister(self.id);
        let mut pending = std::mem::take(&mut self.ravel);
        while let Some(cell) = pending.pop() {
            if let Cell::Pointer(sub) = cell {
                if let Some(mut sub) = sub.into_inner() {
                    pending.append(&mut sub.ravel);
                }
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}](", self.id, self.shape)?;
        ensure_sufficient_stack(|| {
            for (i, cell) in self.ravel.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                match cell {
                    Cell::Pointer(v) => write!(f, "{v:?}")?,
                    other => write!(f, "{other}")?,
                }
            }
            Ok(())
        })?;
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests;
