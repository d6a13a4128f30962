//! Per-world fractional tick remainders.
//!
//! When a phase duration does not divide evenly into the tick rate, each
//! pass produces a fractional adjustment. Only whole ticks can be applied
//! to a world clock, so the fraction left over is carried here between
//! passes. The scheduler keeps every stored remainder strictly inside
//! `(-1.0, 1.0)`.

use std::collections::BTreeMap;

use diel_types::WorldId;

/// Carried fractional remainders, keyed by world.
#[derive(Debug, Default)]
pub struct AccumulatorStore {
    remainders: BTreeMap<WorldId, f64>,
}

impl AccumulatorStore {
    /// An empty store.
    pub const fn new() -> Self {
        Self {
            remainders: BTreeMap::new(),
        }
    }

    /// The remainder carried for a world, initializing it to zero on
    /// first sight.
    pub fn get_or_init(&mut self, id: WorldId) -> f64 {
        *self.remainders.entry(id).or_insert(0.0)
    }

    /// The remainder carried for a world, if it has one.
    pub fn get(&self, id: WorldId) -> Option<f64> {
        self.remainders.get(&id).copied()
    }

    /// Store the remainder for a world.
    pub fn set(&mut self, id: WorldId, remainder: f64) {
        self.remainders.insert(id, remainder);
    }

    /// Drop the remainder for a world, returning the carried value.
    pub fn remove(&mut self, id: WorldId) -> Option<f64> {
        self.remainders.remove(&id)
    }

    /// Drop every carried remainder.
    pub fn clear(&mut self) {
        self.remainders.clear();
    }

    /// Number of worlds with a carried remainder.
    pub fn len(&self) -> usize {
        self.remainders.len()
    }

    /// Whether no world has a carried remainder.
    pub fn is_empty(&self) -> bool {
        self.remainders.is_empty()
    }
}
