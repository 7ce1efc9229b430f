use super::context::TickContext;
use super::system::SimSystem;
use crate::model::npc::LEVELS_PER_REALM;
use crate::model::time::minutes_to_months;
use crate::model::{Activity, IntentKind, LogKind, NpcId};

/// Passive qi accumulation for living cultivators. Meditating NPCs gain
/// faster; filling a level's capacity raises the level, and the level
/// after the last one in a realm is a breakthrough.
pub struct CultivationSystem;

impl SimSystem for CultivationSystem {
    fn name(&self) -> &str {
        "cultivation"
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let months = minutes_to_months(ctx.elapsed_minutes);
        if months <= 0.0 {
            return;
        }
        for id in ctx.world.living_cultivators() {
            cultivate(ctx, id, months);
        }
    }
}

fn cultivate(ctx: &mut TickContext, id: NpcId, months: f64) {
    let base = ctx.config.base_qi_per_month;
    let meditation = ctx.config.meditation_qi_multiplier;
    let Some(npc) = ctx.world.npc_mut(id) else {
        return;
    };
    let meditating = matches!(
        &npc.activity,
        Activity::Dwelling { intent, .. } if intent.kind == IntentKind::Meditate
    );
    let rate = base
        * (1.0 + npc.cultivation.realm_index as f64 * 0.5)
        * if meditating { meditation } else { 1.0 };
    npc.cultivation.qi += rate * months;

    let mut breakthroughs = Vec::new();
    let mut leveled = false;
    while npc.cultivation.qi >= npc.cultivation.qi_capacity() {
        npc.cultivation.qi -= npc.cultivation.qi_capacity();
        npc.cultivation.level += 1;
        leveled = true;
        if npc.cultivation.level > LEVELS_PER_REALM {
            npc.cultivation.realm_index += 1;
            npc.cultivation.level = 1;
            breakthroughs.push(npc.cultivation.realm_index);
        }
    }
    if !leveled {
        return;
    }
    npc.refresh_stats();
    let name = npc.display_name();
    let map_id = npc.current_map.clone();
    for realm in breakthroughs {
        ctx.world.log_event(
            LogKind::Breakthrough,
            Some(id),
            Some(&map_id),
            format!("{name} broke through to realm {realm}."),
        );
    }
}
