//! Host-level errors.

use diel_types::WorldId;

/// Errors from world load and unload operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// A world with the same name is already loaded.
    #[error("world '{0}' is already loaded")]
    DuplicateWorld(String),

    /// No loaded world has the given id.
    #[error("world {0} is not loaded")]
    WorldNotFound(WorldId),
}
