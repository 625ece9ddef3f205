//! Axis lists for `A f[X] B`.

use apl_value::limits::INTEGER_TOLERANCE;
use apl_value::{
    axis_error, length_error, rank_error, AplError, ArrayIterator, AxisVec, Cell, Value, ValueP,
};

/// Validated axis list: the set of zero-based axes of the higher-rank
/// operand, kept ascending. The lower-rank operand's axes pair with them in
/// that order, so `X` and any permutation of it are equivalent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AxisList {
    axes: AxisVec<usize>,
}

impl AxisList {
    /// Parse `X` for an operand of rank `rank`.
    ///
    /// `X` must be a scalar or vector of near-integers counted from `io`,
    /// each naming a distinct axis below `rank`.
    pub fn from_value(x: &Value, io: i64, rank: usize) -> Result<AxisList, AplError> {
        if x.rank() > 1 {
            return Err(axis_error(format!("axis list has rank {}", x.rank())));
        }
        let cells = &x.ravel()[..x.element_count()];
        let mut axes = AxisVec::new();
        for cell in cells {
            let axis = match cell {
                Cell::Int(_) | Cell::Float(_) | Cell::Complex(_) => cell.near_int(INTEGER_TOLERANCE),
                _ => None,
            }
            .ok_or_else(|| axis_error(format!("axis {cell} is not an integer")))?;
            let zero_based = axis
                .checked_sub(io)
                .and_then(|a| usize::try_from(a).ok())
                .filter(|&a| a < rank)
                .ok_or_else(|| axis_error(format!("axis {axis} is out of range")))?;
            if axes.contains(&zero_based) {
                return Err(axis_error(format!("axis {axis} is repeated")));
            }
            axes.push(zero_based);
        }
        axes.sort_unstable();
        Ok(AxisList { axes })
    }

    /// Zero-based axes, ascending.
    pub fn axes(&self) -> &[usize] {
        &self.axes
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Check that axis `i` of `low` matches axis `axes[i]` of `high`.
    pub(super) fn check(&self, high: &Value, low: &Value) -> Result<(), AplError> {
        if self.len() != low.rank() {
            return Err(rank_error(format!(
                "{} axes given for an operand of rank {}",
                self.len(),
                low.rank()
            )));
        }
        for (i, &axis) in self.axes.iter().enumerate() {
            let (high_len, low_len) = (high.shape().extents()[axis], low.shape().extents()[i]);
            if high_len != low_len {
                return Err(length_error(format!(
                    "axis {axis} has length {high_len}, operand axis {i} has length {low_len}"
                )));
            }
        }
        Ok(())
    }

    /// Spread `low` over the shape of `high`: the result holds, at each
    /// position, the cell of `low` addressed by the mapped axes alone.
    pub(super) fn spread(&self, high: &Value, low: &Value) -> Result<ValueP, AplError> {
        let low_weights = low.shape().weights();
        let mut weights: AxisVec<usize> = AxisVec::from_elem(0, high.rank());
        for (i, &axis) in self.axes.iter().enumerate() {
            weights[axis] = low_weights[i];
        }
        let cells = ArrayIterator::with_weights(high.shape(), &weights)?
            .map(|offset| low.ravel()[offset].clone())
            .collect();
        Ok(ValueP::new(Value::from_cells(high.shape().clone(), cells)?))
    }
}
