//! Abstraction over the world host.
//!
//! The scheduler never talks to concrete world storage. It sees worlds
//! through the [`WorldHost`] trait: enumerate them, read their clocks,
//! and apply signed tick adjustments. The trait also exposes the host's
//! native per-tick advancement and its unload queue so the driver can
//! run the full tick in one place.
//!
//! [`StubWorldHost`] is an in-memory implementation for tests. It can
//! freeze a world's reported phase time while the absolute counter keeps
//! moving, which is how drift runs pin the increment to a single phase.

use std::collections::BTreeMap;

use diel_types::{WorldId, cycle};

/// Read and write access to the worlds managed by a host.
///
/// `None` returns from the read methods mean the world is not currently
/// loaded; callers treat that as a transient gap and skip the world
/// rather than failing.
pub trait WorldHost: Send {
    /// Identifiers of every currently loaded world.
    fn world_ids(&self) -> Vec<WorldId>;

    /// The world's absolute time counter, if loaded.
    fn full_time(&self, id: WorldId) -> Option<u64>;

    /// The world's position within the current cycle, if loaded.
    ///
    /// Always in `0..24_000` for a loaded world.
    fn phase_time(&self, id: WorldId) -> Option<u64>;

    /// Whether the world participates in the day/night cycle, if loaded.
    fn cycle_enabled(&self, id: WorldId) -> Option<bool>;

    /// Enable or disable cycle participation. Returns `false` if the
    /// world is not loaded.
    fn set_cycle_enabled(&mut self, id: WorldId, enabled: bool) -> bool;

    /// Apply a signed adjustment to the world's time counter.
    ///
    /// Returns `false` if the world is not loaded or the adjustment
    /// would move the counter out of range; the counter is unchanged
    /// in both cases.
    fn adjust_time(&mut self, id: WorldId, delta: i64) -> bool;

    /// Advance every cycle-enabled world's counter by one tick.
    fn advance_native(&mut self);

    /// Drain the set of worlds unloaded since the last call.
    fn take_unloaded(&mut self) -> Vec<WorldId>;
}

/// In-memory host for unit tests.
#[derive(Debug, Default)]
pub struct StubWorldHost {
    worlds: BTreeMap<WorldId, StubWorld>,
    unloaded: Vec<WorldId>,
}

#[derive(Debug)]
struct StubWorld {
    full_time: u64,
    phase_override: Option<u64>,
    cycle_enabled: bool,
}

impl StubWorldHost {
    /// An empty stub host.
    pub const fn new() -> Self {
        Self {
            worlds: BTreeMap::new(),
            unloaded: Vec::new(),
        }
    }

    /// Add a world with the given starting time, returning its id.
    pub fn add_world(&mut self, full_time: u64) -> WorldId {
        let id = WorldId::new();
        self.worlds.insert(
            id,
            StubWorld {
                full_time,
                phase_override: None,
                cycle_enabled: true,
            },
        );
        id
    }

    /// Pin the phase time this world reports, regardless of its counter.
    ///
    /// Drift tests use this to hold a world in one phase while the
    /// counter accumulates adjustments.
    pub fn freeze_phase(&mut self, id: WorldId, phase_time: u64) {
        if let Some(world) = self.worlds.get_mut(&id) {
            world.phase_override = Some(phase_time);
        }
    }

    /// Remove a world and queue it for [`WorldHost::take_unloaded`].
    pub fn unload(&mut self, id: WorldId) {
        if self.worlds.remove(&id).is_some() {
            self.unloaded.push(id);
        }
    }
}

impl WorldHost for StubWorldHost {
    fn world_ids(&self) -> Vec<WorldId> {
        self.worlds.keys().copied().collect()
    }

    fn full_time(&self, id: WorldId) -> Option<u64> {
        self.worlds.get(&id).map(|world| world.full_time)
    }

    fn phase_time(&self, id: WorldId) -> Option<u64> {
        self.worlds
            .get(&id)
            .map(|world| world.phase_override.unwrap_or_else(|| cycle::phase_time(world.full_time)))
    }

    fn cycle_enabled(&self, id: WorldId) -> Option<bool> {
        self.worlds.get(&id).map(|world| world.cycle_enabled)
    }

    fn set_cycle_enabled(&mut self, id: WorldId, enabled: bool) -> bool {
        self.worlds.get_mut(&id).is_some_and(|world| {
            world.cycle_enabled = enabled;
            true
        })
    }

    fn adjust_time(&mut self, id: WorldId, delta: i64) -> bool {
        self.worlds.get_mut(&id).is_some_and(|world| {
            world.full_time.checked_add_signed(delta).is_some_and(|next| {
                world.full_time = next;
                true
            })
        })
    }

    fn advance_native(&mut self) {
        for world in self.worlds.values_mut() {
            if world.cycle_enabled {
                world.full_time = world.full_time.saturating_add(1);
            }
        }
    }

    fn take_unloaded(&mut self) -> Vec<WorldId> {
        std::mem::take(&mut self.unloaded)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn stub_reports_loaded_worlds() {
        let mut host = StubWorldHost::new();
        let id = host.add_world(500);

        assert_eq!(host.world_ids(), vec![id]);
        assert_eq!(host.full_time(id), Some(500));
        assert_eq!(host.phase_time(id), Some(500));
        assert_eq!(host.cycle_enabled(id), Some(true));
    }

    #[test]
    fn stub_returns_none_for_unknown_world() {
        let host = StubWorldHost::new();
        let id = WorldId::new();

        assert_eq!(host.full_time(id), None);
        assert_eq!(host.phase_time(id), None);
        assert_eq!(host.cycle_enabled(id), None);
    }

    #[test]
    fn phase_time_wraps_to_cycle() {
        let mut host = StubWorldHost::new();
        let id = host.add_world(24_000 + 360);

        assert_eq!(host.phase_time(id), Some(360));
    }

    #[test]
    fn frozen_phase_overrides_counter() {
        let mut host = StubWorldHost::new();
        let id = host.add_world(0);
        host.freeze_phase(id, 15_000);
        host.advance_native();

        assert_eq!(host.full_time(id), Some(1));
        assert_eq!(host.phase_time(id), Some(15_000));
    }

    #[test]
    fn advance_skips_disabled_worlds() {
        let mut host = StubWorldHost::new();
        let enabled = host.add_world(0);
        let disabled = host.add_world(0);
        assert!(host.set_cycle_enabled(disabled, false));

        host.advance_native();

        assert_eq!(host.full_time(enabled), Some(1));
        assert_eq!(host.full_time(disabled), Some(0));
    }

    #[test]
    fn adjust_time_moves_counter() {
        let mut host = StubWorldHost::new();
        let id = host.add_world(100);

        assert!(host.adjust_time(id, 5));
        assert_eq!(host.full_time(id), Some(105));
        assert!(host.adjust_time(id, -3));
        assert_eq!(host.full_time(id), Some(102));
    }

    #[test]
    fn adjust_time_rejects_underflow() {
        let mut host = StubWorldHost::new();
        let id = host.add_world(2);

        assert!(!host.adjust_time(id, -5));
        assert_eq!(host.full_time(id), Some(2));
    }

    #[test]
    fn unload_queue_drains_once() {
        let mut host = StubWorldHost::new();
        let id = host.add_world(0);
        host.unload(id);

        assert_eq!(host.take_unloaded(), vec![id]);
        assert!(host.take_unloaded().is_empty());
        assert!(host.world_ids().is_empty());
    }
}
