//! Fixed limits and numeric tolerances of the array core.

/// Maximum number of axes a value may have.
pub const MAX_RANK: usize = 6;

/// Default comparison tolerance (⎕CT).
pub const DEFAULT_CT: f64 = 1e-13;

/// Tolerance used when a float must be an integer (axis numbers, circle
/// function selectors, factorial arguments).
pub const INTEGER_TOLERANCE: f64 = 1e-10;

/// Largest float whose integral part is still representable as `i64`.
pub const LARGE_INT: f64 = 9.2e18;

/// Largest argument whose factorial is finite in `f64`.
pub const MAX_FACTORIAL_ARG: f64 = 170.0;

/// Hard ceiling on the number of cells in one ravel, independent of any
/// configured limit.
pub const MAX_VOLUME: usize = 1 << 40;
