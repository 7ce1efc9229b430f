//! Persistence boundary for the world state.
//!
//! The orchestrator loads a snapshot, steps a working copy and writes the
//! whole result back with [`StateStore::save`]. A failed step never
//! reaches the store, so a save is either the old world or the new one.

mod json;

pub use json::JsonFileStore;

use crate::model::World;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no world has been saved yet")]
    Empty,
}

pub trait StateStore {
    fn load(&self) -> Result<World, StoreError>;
    /// Replace the stored world in one piece.
    fn save(&mut self, world: &World) -> Result<(), StoreError>;
}

/// In-process store; keeps a clone of the last saved world.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    world: Option<World>,
}

impl MemoryStore {
    pub fn new(world: World) -> Self {
        Self { world: Some(world) }
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<World, StoreError> {
        self.world.clone().ok_or(StoreError::Empty)
    }

    fn save(&mut self, world: &World) -> Result<(), StoreError> {
        self.world = Some(world.clone());
        Ok(())
    }
}
