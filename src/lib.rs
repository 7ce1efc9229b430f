pub mod combat;
pub mod config;
pub mod id;
pub mod interact;
pub mod model;
pub mod narrative;
pub mod scenario;
pub mod sim;
pub mod store;
pub mod worldgen;

pub use config::{ConfigError, SimConfig};
pub use id::IdGenerator;
pub use model::{ContentTables, GameTime, Npc, NpcId, Player, World};
pub use sim::{Orchestrator, SeclusionProgress, SeclusionReport, StepReport};
pub use store::{JsonFileStore, MemoryStore, StateStore, StoreError};
