//! Live-value registry and the diagnostic reachability sweep.
//!
//! Registration is serialized by one mutex. That lock is taken once per
//! value construction and once per drop, which also makes it the point
//! where parallel evaluation serializes its allocations.

use std::panic::Location;
use std::sync::OnceLock;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use super::{Binding, Value, ValueFlags, ValueId};
use crate::cell::Cell;

/// Registry record of one live value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LiveEntry {
    /// Where the value was constructed.
    pub created_at: &'static Location<'static>,
    /// Number of ravel cells.
    pub cells: usize,
    /// Whether construction finished.
    pub complete: bool,
}

#[derive(Default)]
struct Registry {
    live: FxHashMap<ValueId, LiveEntry>,
}

fn registry() -> &'static Mutex<Registry> {
    static REGISTRY: OnceLock<Mutex<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(Registry::default()))
}

/// Serializes sweeps, which use the `MARKED` flag on shared values.
static SWEEP_LOCK: Mutex<()> = parking_lot::const_mutex(());

pub(super) fn register(
    id: ValueId,
    created_at: &'static Location<'static>,
    cells: usize,
    complete: bool,
) {
    registry().lock().live.insert(
        id,
        LiveEntry {
            created_at,
            cells,
            complete,
        },
    );
}

pub(super) fn note_complete(id: ValueId) {
    if let Some(entry) = registry().lock().live.get_mut(&id) {
        entry.complete = true;
    }
}

pub(super) fn unregister(id: ValueId) {
    registry().lock().live.remove(&id);
}

/// Number of values currently alive in the process.
pub fn live_count() -> usize {
    registry().lock().live.len()
}

/// Whether the value with this identity is still alive.
pub fn is_live(id: ValueId) -> bool {
    registry().lock().live.contains_key(&id)
}

/// Registry record of a live value.
pub fn live_entry(id: ValueId) -> Option<LiveEntry> {
    registry().lock().live.get(&id).copied()
}

/// Findings of one [`sweep`].
#[derive(Clone, Debug, Default)]
pub struct SweepReport {
    /// Number of distinct values reachable from the roots.
    pub reachable: usize,
    /// Live values not reachable from any root.
    pub stale: Vec<(ValueId, LiveEntry)>,
    /// Live values whose construction never finished.
    pub incomplete: Vec<(ValueId, LiveEntry)>,
}

impl SweepReport {
    pub fn is_stale(&self, id: ValueId) -> bool {
        self.stale.iter().any(|(s, _)| *s == id)
    }

    pub fn is_incomplete(&self, id: ValueId) -> bool {
        self.incomplete.iter().any(|(s, _)| *s == id)
    }
}

/// Mark every value reachable from `roots`, then report the live values
/// that were not reached and those never completed.
///
/// Values owned by the current call stack but not bound to a root are
/// reported as stale too; the report is advisory.
pub fn sweep<'a>(roots: impl IntoIterator<Item = &'a Binding>) -> SweepReport {
    let _guard = SWEEP_LOCK.lock();

    // Mark. Shared sub-values are visited once thanks to the flag.
    let mut visited: Vec<&Value> = Vec::new();
    let mut pending: Vec<&Value> = roots
        .into_iter()
        .filter_map(Binding::value)
        .map(|v| &**v)
        .collect();
    while let Some(value) = pending.pop() {
        if value.set_flag(ValueFlags::MARKED) {
            continue;
        }
        visited.push(value);
        pending.extend(
            value
                .ravel()
                .iter()
                .filter_map(Cell::pointer_value)
                .map(|v| &**v),
        );
    }
    let reached: FxHashSet<ValueId> = visited.iter().map(|v| v.id()).collect();

    let mut report = SweepReport {
        reachable: reached.len(),
        ..SweepReport::default()
    };
    {
        let registry = registry().lock();
        for (&id, &entry) in &registry.live {
            if !reached.contains(&id) {
                report.stale.push((id, entry));
            }
            if !entry.complete {
                report.incomplete.push((id, entry));
            }
        }
    }
    report.stale.sort_by_key(|(id, _)| *id);
    report.incomplete.sort_by_key(|(id, _)| *id);

    // Unmark.
    for value in visited {
        value.clear_flag(ValueFlags::MARKED);
    }

    if !report.incomplete.is_empty() {
        tracing::warn!(
            count = report.incomplete.len(),
            "sweep found values whose construction never finished"
        );
    }
    tracing::debug!(
        reachable = report.reachable,
        stale = report.stale.len(),
        "value sweep finished"
    );
    report
}
