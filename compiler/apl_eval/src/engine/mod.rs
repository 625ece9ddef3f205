//! Scalar function evaluation.
//!
//! [`ScalarEngine`] applies a [`ScalarFn`] elementwise to whole arrays:
//!
//! - `eval_b`: `f B`, one result cell per cell of `B`
//! - `eval_ab`: `A f B` on equal shapes, or with a scalar extended to the
//!   other operand's shape
//! - `eval_axb`: `A f[X] B`, the lower-rank operand's axes matched in order
//!   to the axes `X` of the higher-rank one, taken ascending
//!
//! Nested cells are evaluated level by level through the scheduler; an
//! empty result never calls the primitive and is built from prototypes
//! instead (`eval_fill_b`, `eval_fill_ab`).
//!
//! Every entry point returns either a complete value or the first error in
//! row-major, level-by-level order. Partially computed results are dropped.

mod axis;
mod job;
mod scheduler;

use apl_value::{ws_full, AplError, Cell, ErrorCode, Value, ValueP};
use tracing::warn;

use crate::config::{ConfigError, EvalConfig};
use crate::scalar_fn::ScalarFn;
use job::{conform, fill_proto, Job};
use scheduler::{Kernel, Scheduler};

pub use axis::AxisList;

/// Evaluator for scalar primitive functions.
pub struct ScalarEngine {
    config: EvalConfig,
    /// Worker pool, present when parallel evaluation is enabled.
    pool: Option<rayon::ThreadPool>,
}

impl ScalarEngine {
    /// Build an engine, starting a worker pool if `config` enables parallel
    /// evaluation on more than one core.
    ///
    /// If the pool cannot be started the engine still works, sequentially.
    pub fn new(config: EvalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let parallel = &config.parallel;
        let pool = if parallel.enabled && parallel.cores > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(parallel.cores)
                .thread_name(|i| format!("apl-worker-{i}"))
                .build()
            {
                Ok(pool) => Some(pool),
                Err(err) => {
                    warn!(%err, cores = parallel.cores, "cannot start worker pool, evaluating sequentially");
                    None
                }
            }
        } else {
            None
        };
        Ok(ScalarEngine { config, pool })
    }

    #[inline]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    fn pool(&self) -> Option<&rayon::ThreadPool> {
        self.pool.as_ref()
    }

    /// WS FULL if a result of `cells` cells exceeds the configured limit.
    fn check_size(&self, cells: usize) -> Result<(), AplError> {
        match self.config.max_cells {
            Some(limit) if cells > limit => Err(ws_full(cells, limit)),
            _ => Ok(()),
        }
    }

    /// `Z ← f B`.
    #[tracing::instrument(level = "debug", skip_all, fields(f = %f, shape = %b.shape()))]
    pub fn eval_b(&self, f: ScalarFn, b: &ValueP) -> Result<ValueP, AplError> {
        let kernel = f.monadic().ok_or_else(|| no_form(f, "monadic"))?;
        if b.is_empty() {
            return Ok(self.eval_fill_b(b));
        }
        Scheduler::new(self, Kernel::Monadic(kernel)).run(Job::monadic(b))
    }

    /// `Z ← A f B`.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(f = %f, a = %a.shape(), b = %b.shape())
    )]
    pub fn eval_ab(&self, a: &ValueP, f: ScalarFn, b: &ValueP) -> Result<ValueP, AplError> {
        let kernel = f.dyadic().ok_or_else(|| no_form(f, "dyadic"))?;
        let job = conform(a, b)?;
        if job.len() == 0 {
            return Ok(fill_proto(a, b));
        }
        Scheduler::new(self, Kernel::Dyadic(kernel)).run(job)
    }

    /// `Z ← A f[X] B`.
    ///
    /// Axis `i` of the lower-rank operand pairs with the `i`-th smallest axis
    /// in `X` of the higher-rank one (for equal ranks, `B` counts as the
    /// lower). The order in which `X` lists its axes does not matter. A scalar
    /// operand, or no axis list, evaluates as `A f B`.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(f = %f, a = %a.shape(), b = %b.shape())
    )]
    pub fn eval_axb(
        &self,
        a: &ValueP,
        f: ScalarFn,
        x: Option<&Value>,
        b: &ValueP,
    ) -> Result<ValueP, AplError> {
        let x = match x {
            Some(x) if !a.is_scalar() && !b.is_scalar() => x,
            _ => return self.eval_ab(a, f, b),
        };
        let kernel = f.dyadic().ok_or_else(|| no_form(f, "dyadic"))?;

        let low_is_a = a.rank() < b.rank();
        let (high, low) = if low_is_a { (b, a) } else { (a, b) };
        let axes = AxisList::from_value(x, self.config.io, high.rank())?;
        axes.check(high, low)?;

        if high.is_empty() {
            return Ok(high.proto());
        }
        self.check_size(high.element_count())?;
        let spread = axes.spread(high, low)?;
        let (a, b) = if low_is_a {
            (&spread, b)
        } else {
            (a, &spread)
        };
        let job = conform(a, b)?;
        Scheduler::new(self, Kernel::Dyadic(kernel)).run(job)
    }

    /// Result of `f B` for an empty `B`: `B` with every leaf replaced by its
    /// prototype.
    pub fn eval_fill_b(&self, b: &ValueP) -> ValueP {
        b.proto()
    }

    /// Result of `A f B` when the result is empty: the prototype of the
    /// non-scalar operand (of `B` when both are non-scalar).
    ///
    /// Non-conforming operands are still a LENGTH or RANK error.
    pub fn eval_fill_ab(&self, a: &ValueP, b: &ValueP) -> Result<ValueP, AplError> {
        conform(a, b)?;
        Ok(fill_proto(a, b))
    }

    /// Identity element of the dyadic form of `f`.
    pub fn identity_cell(&self, f: ScalarFn) -> Result<Cell, AplError> {
        f.identity().ok_or_else(|| {
            AplError::with_detail(ErrorCode::Domain, format!("{f} has no identity element"))
        })
    }

    /// Result of reducing `B` along `axis` (zero-based) with `f` when that
    /// axis is empty: `B`'s shape without the axis, filled with the identity
    /// of `f`. If `B`'s prototype is nested, each element is a copy of that
    /// nested shape filled with the identity.
    pub fn eval_identity_fun(
        &self,
        b: &ValueP,
        axis: usize,
        f: ScalarFn,
    ) -> Result<ValueP, AplError> {
        let identity = self.identity_cell(f)?;
        let shape = b.shape().without_axis(axis)?;
        let len = shape.volume().max(1);
        self.check_size(len)?;

        let cell = match b.first() {
            Cell::Pointer(sub) => {
                let sub_shape = sub.shape().clone();
                let sub_len = sub_shape.volume().max(1);
                self.check_size(sub_len)?;
                Cell::Pointer(ValueP::new(Value::from_cells(
                    sub_shape,
                    vec![identity; sub_len],
                )?))
            }
            _ => identity,
        };
        Ok(ValueP::new(Value::from_cells(shape, vec![cell; len])?))
    }
}

#[cold]
fn no_form(f: ScalarFn, valence: &str) -> AplError {
    AplError::with_detail(ErrorCode::Domain, format!("{f} has no {valence} form"))
}

#[cfg(test)]
mod tests;
