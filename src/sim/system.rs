use super::context::TickContext;

/// A pluggable simulation system that runs once per orchestrator step.
///
/// Object-safe so systems can be stored as `Box<dyn SimSystem>`. Systems
/// run in registration order; each sees the mutations of the ones before it.
pub trait SimSystem {
    fn name(&self) -> &str;
    fn tick(&mut self, ctx: &mut TickContext);
}
