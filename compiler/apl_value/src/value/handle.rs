//! Shared handle to a complete value.
//!
//! [`ValueP`] is the only way a value becomes shareable: its constructor
//! takes the value by ownership and marks it complete. A shared value is
//! immutable, and [`ValueP::make_mut`] deep-clones it before a write when it
//! has more than one owner. Because a value must be owned outright to be
//! mutated, no value can ever end up containing itself.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use super::Value;
use crate::cell::Cell;

/// Reference-counted pointer to a complete [`Value`].
#[repr(transparent)]
pub struct ValueP(Arc<Value>);

impl ValueP {
    /// Share a value, marking it complete.
    #[inline]
    pub fn new(mut value: Value) -> Self {
        value.set_complete();
        ValueP(Arc::new(value))
    }

    /// Share a scalar holding `cell`.
    #[track_caller]
    pub fn scalar(cell: Cell) -> Self {
        ValueP::new(Value::scalar(cell))
    }

    /// Number of handles sharing this value.
    #[inline]
    pub fn owners(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Whether both handles point to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &ValueP) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The value itself, if this is its only handle.
    #[inline]
    pub(crate) fn into_inner(self) -> Option<Value> {
        Arc::into_inner(self.0)
    }

    /// Mutable access for a write, cloning first if the value is shared.
    pub fn make_mut(&mut self) -> &mut Value {
        if self.owners() > 1 {
            tracing::trace!(id = %self.id(), owners = self.owners(), "isolating shared value");
        }
        Arc::make_mut(&mut self.0)
    }

    /// The prototype of this value with its shape kept: every leaf becomes
    /// 0 or space.
    #[track_caller]
    pub fn proto(&self) -> ValueP {
        ValueP::new(self.0.to_proto_value())
    }
}

impl Deref for ValueP {
    type Target = Value;

    #[inline]
    fn deref(&self) -> &Value {
        &self.0
    }
}

impl Clone for ValueP {
    #[inline]
    fn clone(&self) -> Self {
        ValueP(Arc::clone(&self.0))
    }
}

impl PartialEq for ValueP {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl fmt::Debug for ValueP {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Value> for ValueP {
    fn from(value: Value) -> Self {
        ValueP::new(value)
    }
}
