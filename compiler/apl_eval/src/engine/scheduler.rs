//! Breadth-first job scheduler.
//!
//! The scheduler keeps every job of one evaluation in a FIFO list. Running a
//! job computes its simple cells and appends one child job per nested cell,
//! so nesting unrolls level by level without recursion. Once the list is
//! drained, values are assembled from the last job back to the first, each
//! child value being linked into its parent's placeholder.
//!
//! A job longer than the split threshold is cut into one contiguous slice
//! per core and run on the engine's rayon pool. Slices are merged in order,
//! so cells, child jobs and the first error come out exactly as a sequential
//! run would produce them.

use std::ops::Range;

use apl_value::{AplError, Cell, DyadicCellFn, ErrorCode, MonadicCellFn, Value, ValueP};
use rayon::prelude::*;
use tracing::{debug, trace};

use super::job::{conform, fill_proto, Job, JobOutput, Operand};
use super::ScalarEngine;

/// Cell-level function applied by a scheduler run.
#[derive(Copy, Clone)]
pub(super) enum Kernel {
    Monadic(MonadicCellFn),
    Dyadic(DyadicCellFn),
}

impl Kernel {
    fn is_dyadic(self) -> bool {
        matches!(self, Kernel::Dyadic(_))
    }
}

/// A job that has run, waiting for its children to be assembled.
struct Finished {
    cells: Vec<Cell>,
    /// `(position, job index)` of every nested cell.
    links: Vec<(usize, usize)>,
}

pub(super) struct Scheduler<'e> {
    engine: &'e ScalarEngine,
    kernel: Kernel,
}

impl<'e> Scheduler<'e> {
    pub(super) fn new(engine: &'e ScalarEngine, kernel: Kernel) -> Self {
        Scheduler { engine, kernel }
    }

    /// Evaluate `root` and every job it raises, then assemble the result.
    pub(super) fn run(&self, root: Job) -> Result<ValueP, AplError> {
        let mut jobs = vec![root];
        let mut finished: Vec<Finished> = Vec::new();

        let mut next = 0;
        while next < jobs.len() {
            let job = &jobs[next];
            self.engine.check_size(job.len())?;
            let output = self.execute(job)?;
            trace!(
                job = next,
                len = output.cells.len(),
                children = output.children.len(),
                "job finished"
            );

            let mut links = Vec::with_capacity(output.children.len());
            for (pos, child) in output.children {
                links.push((pos, jobs.len()));
                jobs.push(child);
            }
            finished.push(Finished {
                cells: output.cells,
                links,
            });
            next += 1;
        }
        debug!(jobs = jobs.len(), "evaluation scheduled");

        assemble(jobs, finished)
    }

    /// Run a whole job, split across the pool if it is long enough.
    fn execute(&self, job: &Job) -> Result<JobOutput, AplError> {
        let len = job.len();
        let parallel = &self.engine.config().parallel;
        let pool = match self.engine.pool() {
            Some(pool) if parallel.should_split(len, self.kernel.is_dyadic()) => pool,
            _ => return self.run_range(job, 0..len),
        };

        let ranges = slices(len, parallel.cores);
        debug!(len, slices = ranges.len(), "splitting job across workers");
        let outputs: Vec<Result<JobOutput, AplError>> = pool.install(|| {
            ranges
                .into_par_iter()
                .map(|range| self.run_range(job, range))
                .collect()
        });

        let mut merged = JobOutput::with_capacity(len);
        for output in outputs {
            merged.append(output?);
        }
        Ok(merged)
    }

    fn run_range(&self, job: &Job, range: Range<usize>) -> Result<JobOutput, AplError> {
        match (self.kernel, &job.a) {
            (Kernel::Monadic(f), None) => self.run_monadic(f, &job.b, range),
            (Kernel::Dyadic(f), Some(a)) => self.run_dyadic(f, a, &job.b, range),
            _ => Err(AplError::with_detail(
                ErrorCode::Domain,
                "operand count does not match the function",
            )),
        }
    }

    fn run_monadic(
        &self,
        f: MonadicCellFn,
        b: &Operand,
        range: Range<usize>,
    ) -> Result<JobOutput, AplError> {
        let qct = self.engine.config().ct;
        let mut out = JobOutput::with_capacity(range.len());
        for z in range {
            let cell = match b.at(z) {
                Cell::Pointer(v) if v.is_empty() => Cell::Pointer(v.proto()),
                Cell::Pointer(v) => {
                    out.children.push((z, Job::monadic(v)));
                    Cell::Int(0)
                }
                cell => f(cell, qct)?,
            };
            out.cells.push(cell);
        }
        Ok(out)
    }

    fn run_dyadic(
        &self,
        f: DyadicCellFn,
        a: &Operand,
        b: &Operand,
        range: Range<usize>,
    ) -> Result<JobOutput, AplError> {
        let qct = self.engine.config().ct;
        let mut out = JobOutput::with_capacity(range.len());
        for z in range {
            let child = match (a.at(z), b.at(z)) {
                (Cell::Pointer(va), Cell::Pointer(vb)) => {
                    let job = conform(va, vb)?;
                    if job.len() == 0 {
                        out.cells.push(Cell::Pointer(fill_proto(va, vb)));
                        continue;
                    }
                    job
                }
                (Cell::Pointer(va), cb) => {
                    if va.is_empty() {
                        out.cells.push(Cell::Pointer(va.proto()));
                        continue;
                    }
                    Job {
                        shape: va.shape().clone(),
                        a: Some(Operand::Ravel(va.clone())),
                        b: Operand::Scalar(cb.clone()),
                    }
                }
                (ca, Cell::Pointer(vb)) => {
                    if vb.is_empty() {
                        out.cells.push(Cell::Pointer(vb.proto()));
                        continue;
                    }
                    Job {
                        shape: vb.shape().clone(),
                        a: Some(Operand::Scalar(ca.clone())),
                        b: Operand::Ravel(vb.clone()),
                    }
                }
                (ca, cb) => {
                    out.cells.push(f(cb, ca, qct)?);
                    continue;
                }
            };
            out.children.push((z, child));
            out.cells.push(Cell::Int(0));
        }
        Ok(out)
    }
}

/// Cut `0..len` into at most `parts` contiguous, non-empty, equal ranges.
pub(super) fn slices(len: usize, parts: usize) -> Vec<Range<usize>> {
    let chunk = len.div_ceil(parts.max(1)).max(1);
    (0..len)
        .step_by(chunk)
        .map(|start| start..(start + chunk).min(len))
        .collect()
}

/// Build the values of all jobs, children before parents, and return the
/// root value.
fn assemble(jobs: Vec<Job>, mut finished: Vec<Finished>) -> Result<ValueP, AplError> {
    let mut values: Vec<Option<ValueP>> = vec![None; jobs.len()];
    for (index, job) in jobs.into_iter().enumerate().rev() {
        let Some(Finished { mut cells, links }) = finished.pop() else {
            break;
        };
        for (pos, child) in links {
            let value = values[child].take().ok_or_else(missing_child)?;
            cells[pos] = Cell::Pointer(value);
        }
        values[index] = Some(ValueP::new(Value::from_cells(job.shape, cells)?));
    }
    values.swap_remove(0).ok_or_else(missing_child)
}

#[cold]
fn missing_child() -> AplError {
    AplError::with_detail(ErrorCode::Domain, "nested result was not computed")
}
