use rand::RngCore;

use crate::config::SimConfig;
use crate::model::{ContentTables, GameTime, World};

/// Context passed to each system on every step.
pub struct TickContext<'a> {
    pub world: &'a mut World,
    pub content: &'a ContentTables,
    pub config: &'a SimConfig,
    pub rng: &'a mut dyn RngCore,
    /// Game time at the start of the step. The clock only moves once every
    /// system has run.
    pub now: GameTime,
    pub elapsed_minutes: u64,
}

impl TickContext<'_> {
    /// Game time once this step has been applied.
    pub fn step_end(&self) -> GameTime {
        self.now.advance(self.elapsed_minutes as i64)
    }
}
