//! Units of work for the scheduler.
//!
//! A [`Job`] evaluates one array level: every cell of its shape, reading
//! each operand either from a ravel or from a single extended scalar. Jobs
//! own their operands, so they move freely into worker threads.

use apl_value::{length_error, rank_error, AplError, Cell, Shape, ValueP};

/// Source of one operand's cells.
#[derive(Clone, Debug)]
pub(super) enum Operand {
    /// One cell per position, read from the ravel.
    Ravel(ValueP),
    /// The same cell at every position.
    Scalar(Cell),
}

impl Operand {
    #[inline]
    pub(super) fn at(&self, z: usize) -> &Cell {
        match self {
            Operand::Ravel(v) => &v.ravel()[z],
            Operand::Scalar(cell) => cell,
        }
    }
}

/// One array level to evaluate.
#[derive(Debug)]
pub(super) struct Job {
    pub(super) shape: Shape,
    /// Left operand; `None` for a monadic function.
    pub(super) a: Option<Operand>,
    pub(super) b: Operand,
}

impl Job {
    pub(super) fn monadic(b: &ValueP) -> Job {
        Job {
            shape: b.shape().clone(),
            a: None,
            b: Operand::Ravel(b.clone()),
        }
    }

    #[inline]
    pub(super) fn len(&self) -> usize {
        self.shape.volume()
    }
}

/// Result of running some range of a job.
#[derive(Debug, Default)]
pub(super) struct JobOutput {
    /// One cell per position; positions with a child job hold a placeholder.
    pub(super) cells: Vec<Cell>,
    /// Nested positions, in row-major order, with the job computing each.
    pub(super) children: Vec<(usize, Job)>,
}

impl JobOutput {
    pub(super) fn with_capacity(len: usize) -> Self {
        JobOutput {
            cells: Vec::with_capacity(len),
            children: Vec::new(),
        }
    }

    /// Append the output of the following range.
    pub(super) fn append(&mut self, mut next: JobOutput) {
        self.cells.append(&mut next.cells);
        self.children.append(&mut next.children);
    }
}

/// Pair two operands for a dyadic job: equal shapes go elementwise and a
/// scalar extends to the other operand's shape.
pub(super) fn conform(a: &ValueP, b: &ValueP) -> Result<Job, AplError> {
    let (shape, a_op, b_op) = if a.is_scalar() && !b.is_scalar() {
        (
            b.shape().clone(),
            Operand::Scalar(a.first().clone()),
            Operand::Ravel(b.clone()),
        )
    } else if b.is_scalar() && !a.is_scalar() {
        (
            a.shape().clone(),
            Operand::Ravel(a.clone()),
            Operand::Scalar(b.first().clone()),
        )
    } else if a.same_shape(b) {
        (
            b.shape().clone(),
            Operand::Ravel(a.clone()),
            Operand::Ravel(b.clone()),
        )
    } else if a.same_rank(b) {
        return Err(length_error(format!(
            "shapes {} and {} do not agree",
            a.shape(),
            b.shape()
        )));
    } else {
        return Err(rank_error(format!(
            "ranks {} and {} do not agree",
            a.rank(),
            b.rank()
        )));
    };
    Ok(Job {
        shape,
        a: Some(a_op),
        b: b_op,
    })
}

/// Result of a dyadic function on conforming operands when the result is
/// empty: the prototype of the operand that gives the result its shape.
pub(super) fn fill_proto(a: &ValueP, b: &ValueP) -> ValueP {
    if b.is_scalar() {
        a.proto()
    } else {
        b.proto()
    }
}
