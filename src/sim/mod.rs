mod context;
mod cultivation;
mod outcome;
pub mod pathing;
pub mod planner;
mod progression;
mod resources;
mod runner;
mod social;
pub mod succession;
mod system;

pub use context::TickContext;
pub use cultivation::CultivationSystem;
pub use progression::ProgressionSystem;
pub use resources::ResourceSystem;
pub use runner::{
    Orchestrator, SeclusionProgress, SeclusionReport, StepReport, default_systems,
};
pub use social::{SocialSystem, interaction_chance};
pub use succession::resolve_succession;
pub use system::SimSystem;
