//! Evaluation settings.
//!
//! The engine reads the comparison tolerance (⎕CT) and index origin (⎕IO)
//! from an [`EvalConfig`], together with an optional ravel-size limit and the
//! parallel scheduling knobs.
//!
//! # Environment Variables
//!
//! [`EvalConfig::from_env`] starts from the defaults and overlays:
//! - `APL_CT` - comparison tolerance, `0` to `1e-9`
//! - `APL_IO` - index origin, `0` or `1`
//! - `APL_MAX_CELLS` - largest ravel a result may have
//! - `APL_PARALLEL` - `1`/`true`/`on` enables parallel evaluation
//! - `APL_CORES` - worker count
//! - `APL_PARALLEL_THRESHOLD` - minimum job length split across workers
//!
//! Example: `APL_PARALLEL=on APL_CORES=4 cargo test`

use std::num::NonZeroUsize;
use std::sync::OnceLock;

use apl_value::limits::DEFAULT_CT;
use thiserror::Error;

/// Largest accepted comparison tolerance.
pub const MAX_CT: f64 = 1e-9;

/// Invalid evaluation setting.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("{var}: cannot parse '{value}'")]
    Unparsable { var: &'static str, value: String },
    #[error("comparison tolerance {0} is outside 0 to {MAX_CT}")]
    Tolerance(f64),
    #[error("index origin must be 0 or 1, not {0}")]
    IndexOrigin(i64),
    #[error("parallel evaluation needs at least one core")]
    NoCores,
}

/// Parallel scheduling settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Whether long jobs are split across worker threads.
    pub enabled: bool,
    /// Number of worker threads, and slices per split job.
    pub cores: usize,
    /// Jobs of a monadic function longer than this are split.
    pub monadic_threshold: usize,
    /// Jobs of a dyadic function longer than this are split.
    pub dyadic_threshold: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        ParallelConfig {
            enabled: false,
            cores: std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
            monadic_threshold: 4096,
            dyadic_threshold: 2048,
        }
    }
}

impl ParallelConfig {
    /// Whether a job of `len` cells should be split.
    pub fn should_split(&self, len: usize, dyadic: bool) -> bool {
        let threshold = if dyadic {
            self.dyadic_threshold
        } else {
            self.monadic_threshold
        };
        self.enabled && self.cores > 1 && len > threshold
    }
}

/// Settings for one [`ScalarEngine`](crate::ScalarEngine).
#[derive(Clone, Debug, PartialEq)]
pub struct EvalConfig {
    /// Comparison tolerance (⎕CT).
    pub ct: f64,
    /// Index origin (⎕IO), used for axis numbers.
    pub io: i64,
    /// Largest ravel a result may have; `None` leaves only the hard limit.
    pub max_cells: Option<usize>,
    pub parallel: ParallelConfig,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            ct: DEFAULT_CT,
            io: 1,
            max_cells: None,
            parallel: ParallelConfig::default(),
        }
    }
}

impl EvalConfig {
    #[must_use]
    pub fn with_ct(mut self, ct: f64) -> Self {
        self.ct = ct;
        self
    }

    #[must_use]
    pub fn with_io(mut self, io: i64) -> Self {
        self.io = io;
        self
    }

    #[must_use]
    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = Some(max_cells);
        self
    }

    /// Enable parallel evaluation on `cores` workers, splitting jobs longer
    /// than `threshold` whatever their valence.
    #[must_use]
    pub fn with_parallel(mut self, cores: usize, threshold: usize) -> Self {
        self.parallel = ParallelConfig {
            enabled: true,
            cores,
            monadic_threshold: threshold,
            dyadic_threshold: threshold,
        };
        self
    }

    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.parallel.enabled = false;
        self
    }

    /// Check every setting is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=MAX_CT).contains(&self.ct) {
            return Err(ConfigError::Tolerance(self.ct));
        }
        if self.io != 0 && self.io != 1 {
            return Err(ConfigError::IndexOrigin(self.io));
        }
        if self.parallel.cores == 0 {
            return Err(ConfigError::NoCores);
        }
        Ok(())
    }

    /// The defaults overlaid with the `APL_*` environment variables.
    ///
    /// The environment is read once per process.
    pub fn from_env() -> Result<EvalConfig, ConfigError> {
        static FROM_ENV: OnceLock<Result<EvalConfig, ConfigError>> = OnceLock::new();
        FROM_ENV
            .get_or_init(|| EvalConfig::from_lookup(|var| std::env::var(var).ok()))
            .clone()
    }

    /// The defaults overlaid with settings looked up by variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<EvalConfig, ConfigError> {
        let mut config = EvalConfig::default();
        if let Some(ct) = parse(&lookup, "APL_CT")? {
            config.ct = ct;
        }
        if let Some(io) = parse(&lookup, "APL_IO")? {
            config.io = io;
        }
        if let Some(max_cells) = parse(&lookup, "APL_MAX_CELLS")? {
            config.max_cells = Some(max_cells);
        }
        if let Some(value) = lookup("APL_PARALLEL") {
            config.parallel.enabled = parse_flag(&value).ok_or(ConfigError::Unparsable {
                var: "APL_PARALLEL",
                value,
            })?;
        }
        if let Some(cores) = parse(&lookup, "APL_CORES")? {
            config.parallel.cores = cores;
        }
        if let Some(threshold) = parse(&lookup, "APL_PARALLEL_THRESHOLD")? {
            config.parallel.monadic_threshold = threshold;
            config.parallel.dyadic_threshold = threshold;
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Unparsable { var, value }),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
