use std::ops::ControlFlow;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::context::TickContext;
use super::cultivation::CultivationSystem;
use super::progression::ProgressionSystem;
use super::resources::ResourceSystem;
use super::social::SocialSystem;
use super::system::SimSystem;
use crate::config::SimConfig;
use crate::model::time::MINUTES_PER_MONTH;
use crate::model::{ContentTables, GameTime, LogEntry, Relocation, World};
use crate::store::{StateStore, StoreError};

/// What one step changed, for callers that render incremental updates.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub started_at: GameTime,
    pub ended_at: GameTime,
    pub relocations: Vec<Relocation>,
    pub new_log_entries: Vec<LogEntry>,
}

/// Progress reported after each month of seclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeclusionProgress {
    pub completed: u32,
    pub total: u32,
    pub now: GameTime,
}

#[derive(Debug, Clone)]
pub struct SeclusionReport {
    pub months_requested: u32,
    pub months_completed: u32,
    pub cancelled: bool,
    pub ended_at: GameTime,
    pub log_entries: Vec<LogEntry>,
}

/// The system set in step order: respawns first, then NPC activity, then
/// the passes that read where everyone ended up.
pub fn default_systems() -> Vec<Box<dyn SimSystem>> {
    vec![
        Box::new(ResourceSystem),
        Box::new(ProgressionSystem),
        Box::new(SocialSystem),
        Box::new(CultivationSystem),
    ]
}

/// Drives the world forward. Owns the systems, the content tables and the
/// deterministic RNG, so the same seed and the same sequence of calls
/// replay the same world.
pub struct Orchestrator {
    systems: Vec<Box<dyn SimSystem>>,
    content: Arc<ContentTables>,
    config: SimConfig,
    rng: SmallRng,
}

impl Orchestrator {
    pub fn new(content: Arc<ContentTables>, config: SimConfig) -> Self {
        Self::with_systems(content, config, default_systems())
    }

    pub fn with_systems(
        content: Arc<ContentTables>,
        config: SimConfig,
        systems: Vec<Box<dyn SimSystem>>,
    ) -> Self {
        if let Err(err) = config.validate() {
            tracing::warn!(%err, "running with an out-of-range config");
        }
        let rng = SmallRng::seed_from_u64(config.seed);
        Self {
            systems,
            content,
            config,
            rng,
        }
    }

    pub fn content(&self) -> &ContentTables {
        &self.content
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// Advance `world` in place by `elapsed_minutes`.
    ///
    /// Every system sees the time at the start of the step. Map membership
    /// is reconciled once all systems ran, then the clock moves. A zero
    /// step is a no-op.
    pub fn step(&mut self, world: &mut World, elapsed_minutes: u64) -> StepReport {
        let started_at = world.current_time;
        if elapsed_minutes == 0 {
            return StepReport {
                started_at,
                ended_at: started_at,
                relocations: Vec::new(),
                new_log_entries: Vec::new(),
            };
        }
        world.log.set_capacity(self.config.max_log_entries);
        let last_log_id = world.log.iter().last().map(|e| e.id);

        for system in self.systems.iter_mut() {
            let mut ctx = TickContext {
                world: &mut *world,
                content: &self.content,
                config: &self.config,
                rng: &mut self.rng,
                now: started_at,
                elapsed_minutes,
            };
            system.tick(&mut ctx);
        }

        let relocations = world.reconcile_map_membership();
        world.current_time = started_at.advance(elapsed_minutes as i64);

        let new_log_entries = world
            .log
            .iter()
            .filter(|e| last_log_id.is_none_or(|last| e.id > last))
            .cloned()
            .collect();
        StepReport {
            started_at,
            ended_at: world.current_time,
            relocations,
            new_log_entries,
        }
    }

    /// Load the stored world, step a working copy and save it back.
    pub fn tick(
        &mut self,
        store: &mut dyn StateStore,
        elapsed_minutes: u64,
    ) -> Result<StepReport, StoreError> {
        let mut world = store.load()?;
        let report = self.step(&mut world, elapsed_minutes);
        store.save(&world)?;
        Ok(report)
    }

    /// Skip ahead `months` months, one month per step, saving after each.
    ///
    /// `on_progress` runs after every saved month; returning
    /// `ControlFlow::Break` stops before the next month, leaving the store
    /// at the last completed month.
    pub fn run_seclusion(
        &mut self,
        store: &mut dyn StateStore,
        months: u32,
        mut on_progress: impl FnMut(&SeclusionProgress) -> ControlFlow<()>,
    ) -> Result<SeclusionReport, StoreError> {
        let mut world = store.load()?;
        let mut log_entries = Vec::new();
        let mut completed = 0;
        let mut cancelled = false;

        while completed < months {
            let report = self.step(&mut world, MINUTES_PER_MONTH);
            store.save(&world)?;
            completed += 1;
            log_entries.extend(report.new_log_entries);

            let progress = SeclusionProgress {
                completed,
                total: months,
                now: world.current_time,
            };
            if on_progress(&progress).is_break() && completed < months {
                cancelled = true;
                tracing::info!(completed, months, "seclusion cancelled");
                break;
            }
        }

        Ok(SeclusionReport {
            months_requested: months,
            months_completed: completed,
            cancelled,
            ended_at: world.current_time,
            log_entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NpcPhase;
    use crate::scenario::Scenario;
    use crate::store::MemoryStore;

    #[test]
    fn zero_step_changes_nothing() {
        let mut s = Scenario::standard();
        s.cultivator("Lin Feng");
        let (mut world, content) = s.build_with_content();
        let before = serde_json::to_string(&world).unwrap();
        let mut orch = Orchestrator::new(Arc::new(content), SimConfig::default());
        let report = orch.step(&mut world, 0);
        assert_eq!(report.started_at, report.ended_at);
        assert_eq!(serde_json::to_string(&world).unwrap(), before);
    }

    #[test]
    fn clock_moves_after_the_systems() {
        let (mut world, content) = Scenario::standard().build_with_content();
        let mut orch = Orchestrator::new(Arc::new(content), SimConfig::default());
        let start = world.current_time;
        let report = orch.step(&mut world, 90);
        assert_eq!(report.started_at, start);
        assert_eq!(world.current_time, start.advance(90));
    }

    #[test]
    fn idle_npcs_pick_up_intents_on_the_first_step() {
        let mut s = Scenario::standard();
        let id = s.cultivator("Lin Feng").id();
        let (mut world, content) = s.build_with_content();
        let mut orch = Orchestrator::new(Arc::new(content), SimConfig::default());
        let report = orch.step(&mut world, 60);
        assert_ne!(world.npc(id).unwrap().phase(world.current_time), NpcPhase::Idle);
        assert!(!report.new_log_entries.is_empty());
    }

    #[test]
    fn same_seed_replays_the_same_world() {
        let run = || {
            let mut s = Scenario::standard();
            s.cultivator("Lin Feng");
            s.cultivator("Su Yan");
            s.cultivator("Wei Lan").on_map("peak");
            let (mut world, content) = s.build_with_content();
            let mut orch = Orchestrator::new(Arc::new(content), SimConfig::with_seed(77));
            for _ in 0..24 {
                orch.step(&mut world, MINUTES_PER_MONTH);
            }
            serde_json::to_string(&world).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn seclusion_stops_when_cancelled() {
        let (world, content) = Scenario::standard().build_with_content();
        let start = world.current_time;
        let mut store = MemoryStore::new(world);
        let mut orch = Orchestrator::new(Arc::new(content), SimConfig::default());

        let mut seen = Vec::new();
        let report = orch
            .run_seclusion(&mut store, 12, |p| {
                seen.push(p.completed);
                if p.completed == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();

        assert_eq!(seen, vec![1, 2, 3]);
        assert!(report.cancelled);
        assert_eq!(report.months_completed, 3);
        assert_eq!(store.world().unwrap().current_time, start.advance_months(3));
    }
}
