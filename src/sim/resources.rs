use super::context::TickContext;
use super::system::SimSystem;

/// Returns harvested nodes to their maps once their respawn time has come.
///
/// Runs first in the step so gatherers see nodes that respawned during it.
pub struct ResourceSystem;

impl SimSystem for ResourceSystem {
    fn name(&self) -> &str {
        "resources"
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let end = ctx.step_end();
        let due = ctx.world.nodes.reconcile(end);
        for entry in &due {
            tracing::debug!(
                node = entry.original_id,
                base_id = %entry.base_id,
                map = %entry.map_id,
                "node respawned"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::config::SimConfig;
    use crate::model::time::MINUTES_PER_DAY;
    use crate::model::{NodeKind, RespawnTime, World};
    use crate::scenario::{Scenario, standard_content};

    fn run(world: &mut World, minutes: u64) {
        let content = standard_content();
        let config = SimConfig::default();
        let mut rng = SmallRng::seed_from_u64(0);
        let now = world.current_time;
        let mut ctx = TickContext {
            world: &mut *world,
            content: &content,
            config: &config,
            rng: &mut rng,
            now,
            elapsed_minutes: minutes,
        };
        ResourceSystem.tick(&mut ctx);
        world.current_time = now.advance(minutes as i64);
    }

    #[test]
    fn queued_node_reappears_after_its_window() {
        let mut world = Scenario::standard().build();
        let node = world
            .nodes
            .visible_in_area("valley", "spirit-field", NodeKind::Herb)[0]
            .id;
        let mut rng = SmallRng::seed_from_u64(1);
        let now = world.current_time;
        world.nodes.remove_and_enqueue_respawn(
            "valley",
            node,
            Some(RespawnTime::Fixed(2 * MINUTES_PER_DAY)),
            1.0,
            now,
            &mut rng,
        );
        assert!(world.nodes.visible_instance("valley", node).is_none());

        run(&mut world, MINUTES_PER_DAY);
        assert!(world.nodes.visible_instance("valley", node).is_none());

        run(&mut world, MINUTES_PER_DAY);
        assert!(world.nodes.visible_instance("valley", node).is_some());
        assert!(world.nodes.respawn_queue().is_empty());
    }
}
