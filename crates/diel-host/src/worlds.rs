//! The in-process world registry.
//!
//! [`HostWorlds`] owns every loaded world and implements the
//! scheduling host interface. Unloads are queued rather than signalled,
//! so the driver retires scheduler state for them on its next tick.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use diel_core::WorldHost;
use diel_core::config::WorldSeed;
use diel_types::WorldId;

use crate::clock::WorldClock;
use crate::error::HostError;

/// A loaded world: its name, clock, and cycle flag.
#[derive(Debug, Clone, Serialize)]
pub struct WorldState {
    /// Unique display name.
    pub name: String,

    /// The world's time counter.
    pub clock: WorldClock,

    /// Whether the host advances this world natively each tick.
    pub cycle_enabled: bool,
}

/// All worlds loaded in this process.
#[derive(Debug, Default)]
pub struct HostWorlds {
    worlds: BTreeMap<WorldId, WorldState>,
    unloaded: Vec<WorldId>,
}

impl HostWorlds {
    /// An empty registry.
    pub const fn new() -> Self {
        Self {
            worlds: BTreeMap::new(),
            unloaded: Vec::new(),
        }
    }

    /// Build a registry preloaded from config seeds.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::DuplicateWorld`] if two seeds share a name.
    pub fn from_seeds(seeds: &[WorldSeed]) -> Result<Self, HostError> {
        let mut registry = Self::new();
        for seed in seeds {
            registry.load_world(&seed.name, seed.cycle_enabled, seed.initial_time)?;
        }
        Ok(registry)
    }

    /// Load a world under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::DuplicateWorld`] if a loaded world already
    /// uses the name.
    pub fn load_world(
        &mut self,
        name: &str,
        cycle_enabled: bool,
        initial_time: u64,
    ) -> Result<WorldId, HostError> {
        if self.worlds.values().any(|world| world.name == name) {
            return Err(HostError::DuplicateWorld(name.to_owned()));
        }

        let id = WorldId::new();
        self.worlds.insert(
            id,
            WorldState {
                name: name.to_owned(),
                clock: WorldClock::new(initial_time),
                cycle_enabled,
            },
        );
        debug!(world_id = %id, name, initial_time, "world loaded");
        Ok(id)
    }

    /// Unload a world, queueing it for scheduler retirement.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::WorldNotFound`] if no loaded world has the
    /// given id.
    pub fn unload_world(&mut self, id: WorldId) -> Result<WorldState, HostError> {
        let state = self
            .worlds
            .remove(&id)
            .ok_or(HostError::WorldNotFound(id))?;
        self.unloaded.push(id);
        debug!(world_id = %id, name = %state.name, "world unloaded");
        Ok(state)
    }

    /// The state of a loaded world.
    pub fn get(&self, id: WorldId) -> Option<&WorldState> {
        self.worlds.get(&id)
    }

    /// Number of loaded worlds.
    pub fn count(&self) -> usize {
        self.worlds.len()
    }

    /// Iterate over loaded worlds in id order.
    pub fn worlds(&self) -> impl Iterator<Item = (WorldId, &WorldState)> {
        self.worlds.iter().map(|(id, state)| (*id, state))
    }

    /// The id of the loaded world with the given name, if any.
    pub fn find_by_name(&self, name: &str) -> Option<WorldId> {
        self.worlds
            .iter()
            .find(|(_, world)| world.name == name)
            .map(|(id, _)| *id)
    }
}

impl WorldHost for HostWorlds {
    fn world_ids(&self) -> Vec<WorldId> {
        self.worlds.keys().copied().collect()
    }

    fn full_time(&self, id: WorldId) -> Option<u64> {
        self.worlds.get(&id).map(|world| world.clock.full_time())
    }

    fn phase_time(&self, id: WorldId) -> Option<u64> {
        self.worlds.get(&id).map(|world| world.clock.phase_time())
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
        self.worlds
            .get_mut(&id)
            .is_some_and(|world| world.clock.apply_adjustment(delta).is_ok())
    }

    fn advance_native(&mut self) {
        for world in self.worlds.values_mut() {
            if world.cycle_enabled {
                world.clock.advance();
            }
        }
    }

    fn take_unloaded(&mut self) -> Vec<WorldId> {
        std::mem::take(&mut self.unloaded)
    }
}
