//! Named bindings and selective assignment.
//!
//! A [`Binding`] is a root that owns one value, the way a workspace variable
//! does. Writes through a binding go through [`Binding::isolate`], which
//! clones the value first when anyone else shares it.
//!
//! Selective assignment (`(2↑X)←…`) works in two steps. The binding hands
//! out a value of [`LvalRef`] cells, one per element, which callers reshape
//! with structural functions. [`Binding::assign_selected`] then resolves the
//! surviving references against the value still bound and writes into it.

use std::fmt;

use super::{Value, ValueFlags, ValueId, ValueP};
use crate::cell::Cell;
use crate::errors::{rank_error, stale_reference, AplError, ErrorCode};
use crate::iter::MultiIndexIterator;

/// Non-owning reference to one element of a bound value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LvalRef {
    owner: ValueId,
    offset: usize,
}

impl LvalRef {
    /// The value this reference points into.
    #[inline]
    pub fn owner(self) -> ValueId {
        self.owner
    }

    /// Ravel offset of the referenced element.
    #[inline]
    pub fn offset(self) -> usize {
        self.offset
    }
}

impl fmt::Display for LvalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.owner, self.offset)
    }
}

/// A name owning one value.
#[derive(Debug)]
pub struct Binding {
    name: String,
    value: Option<ValueP>,
}

impl Binding {
    /// An unbound name.
    pub fn new(name: impl Into<String>) -> Self {
        Binding {
            name: name.into(),
            value: None,
        }
    }

    /// A name bound to `value`.
    pub fn bound(name: impl Into<String>, value: ValueP) -> Self {
        let mut binding = Binding::new(name);
        binding.assign(value);
        binding
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> Option<&ValueP> {
        self.value.as_ref()
    }

    /// Bind a new value, releasing the old one.
    pub fn assign(&mut self, value: ValueP) {
        value.set_flag(ValueFlags::ASSIGNED);
        self.value = Some(value);
    }

    /// Remove and return the bound value.
    pub fn unbind(&mut self) -> Option<ValueP> {
        self.value.take()
    }

    fn bound_value(&self) -> Result<&ValueP, AplError> {
        self.value
            .as_ref()
            .ok_or_else(|| AplError::with_detail(ErrorCode::NoValue, self.name.clone()))
    }

    /// Mutable access to the bound value for an in-place write.
    ///
    /// If the value is shared with any other owner it is deep-cloned first,
    /// so the other owners keep seeing the old contents.
    pub fn isolate(&mut self) -> Result<&mut Value, AplError> {
        let name = &self.name;
        let value = self
            .value
            .as_mut()
            .ok_or_else(|| AplError::with_detail(ErrorCode::NoValue, name.clone()))?;
        let value = value.make_mut();
        value.set_flag(ValueFlags::ASSIGNED);
        Ok(value)
    }

    /// A reference to element `offset` of the bound value.
    pub fn lval(&self, offset: usize) -> Result<LvalRef, AplError> {
        let value = self.bound_value()?;
        if offset >= value.element_count() {
            return Err(ErrorCode::Index.into());
        }
        Ok(LvalRef {
            owner: value.id(),
            offset,
        })
    }

    /// A value shaped like the bound value whose elements reference the
    /// corresponding bound elements.
    #[track_caller]
    pub fn lval_value(&self) -> Result<Value, AplError> {
        let value = self.bound_value()?;
        let owner = value.id();
        let cells = if value.is_empty() {
            vec![Cell::Int(0)]
        } else {
            (0..value.element_count())
                .map(|offset| Cell::Lval(LvalRef { owner, offset }))
                .collect()
        };
        Ok(Value::from_cells(value.shape().clone(), cells)?)
    }

    /// Write `values` into the elements referenced by `targets`.
    ///
    /// `values` is either a scalar, which is written to every target, or has
    /// the shape of `targets`. Every reference must point into the value
    /// currently bound; nothing is written unless all of them do.
    pub fn assign_selected(&mut self, targets: &Value, values: &Value) -> Result<(), AplError> {
        if !values.is_scalar() && !targets.same_shape(values) {
            if targets.same_rank(values) {
                return Err(ErrorCode::Length.into());
            }
            return Err(rank_error(format!(
                "cannot assign shape {} into shape {}",
                values.shape(),
                targets.shape()
            )));
        }

        let current = self.bound_value()?;
        let mut writes = Vec::with_capacity(targets.element_count());
        for i in 0..targets.element_count() {
            let Some(Cell::Lval(target)) = targets.cell(i) else {
                return Err(ErrorCode::Domain.into());
            };
            if target.owner != current.id() {
                return Err(stale_reference(&self.name));
            }
            if target.offset >= current.element_count() {
                return Err(ErrorCode::Index.into());
            }
            let source = if values.is_scalar() { 0 } else { i };
            let cell = values.cell(source).ok_or(ErrorCode::Length)?;
            if cell.is_lval() {
                return Err(ErrorCode::Domain.into());
            }
            writes.push((target.offset, cell.clone()));
        }

        let value = self.isolate()?;
        for (offset, cell) in writes {
            value.set_cell(offset, cell)?;
        }
        tracing::trace!(name = %self.name, "selective assignment");
        Ok(())
    }

    /// Indexed assignment `X[I;J;…]←values`, one entry per axis, `None` for
    /// an elided axis. Indices count from `io`.
    pub fn assign_indexed(
        &mut self,
        indices: &[Option<&Value>],
        values: &Value,
        io: i64,
    ) -> Result<(), AplError> {
        let current = self.bound_value()?;
        let walk = MultiIndexIterator::new(current.shape(), indices, io)?;
        if !values.is_scalar() && walk.shape() != values.shape() {
            return Err(if walk.shape().rank() == values.rank() {
                ErrorCode::Length.into()
            } else {
                rank_error(format!(
                    "cannot assign shape {} into selection of shape {}",
                    values.shape(),
                    walk.shape()
                ))
            });
        }
        if values.ravel().iter().any(Cell::is_lval) {
            return Err(ErrorCode::Domain.into());
        }

        let offsets: Vec<usize> = walk.collect();
        let value = self.isolate()?;
        for (i, offset) in offsets.into_iter().enumerate() {
            let source = if values.is_scalar() { 0 } else { i };
            let cell = values.cell(source).ok_or(ErrorCode::Length)?.clone();
            value.set_cell(offset, cell)?;
        }
        tracing::trace!(name = %self.name, "indexed assignment");
        Ok(())
    }
}
