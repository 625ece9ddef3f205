//! APL Eval - scalar function evaluation for the APL interpreter.
//!
//! This crate provides:
//! - The scalar primitive table (`ScalarFn`)
//! - The elementwise evaluation engine (`ScalarEngine`) with scalar
//!   extension, axis mapping, nested recursion and fill rules
//! - The breadth-first job scheduler with optional rayon parallelism
//! - Evaluation settings (`EvalConfig`)
//!
//! # Tracing
//!
//! Enable tracing with environment variables:
//! - `RUST_LOG=apl_eval=debug` - entry points, job splitting
//! - `RUST_LOG=apl_eval=trace` - every scheduled job
//! - `RUST_LOG=apl_value=trace` - copy-on-write isolation, assignments

mod config;
mod engine;
mod scalar_fn;

use std::sync::Once;

pub use config::{ConfigError, EvalConfig, ParallelConfig, MAX_CT};
pub use engine::{AxisList, ScalarEngine};
pub use scalar_fn::ScalarFn;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=apl_eval=debug` or `RUST_LOG=apl_eval=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
