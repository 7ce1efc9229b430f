//! Per-NPC activity state machine: plan when idle, walk the path, dwell at
//! the destination, then hand over to [`super::outcome`].

use super::context::TickContext;
use super::outcome::complete_intent;
use super::planner::plan;
use super::system::SimSystem;
use crate::model::time::months_to_minutes;
use crate::model::{Activity, Intent, LogKind, NpcId, NpcPhase};

pub struct ProgressionSystem;

impl SimSystem for ProgressionSystem {
    fn name(&self) -> &str {
        "progression"
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        if ctx.elapsed_minutes == 0 {
            return;
        }
        for id in ctx.world.living_cultivators() {
            advance_npc(ctx, id);
        }
    }
}

fn advance_npc(ctx: &mut TickContext, id: NpcId) {
    let Some(phase) = ctx.world.npc(id).map(|n| n.phase(ctx.now)) else {
        return;
    };
    match phase {
        NpcPhase::Traveling => advance_travel(ctx, id),
        NpcPhase::Dwelling => advance_dwell(ctx, id),
        NpcPhase::Idle | NpcPhase::Resting => try_begin_intent(ctx, id),
    }
}

/// Move along the path with this step's movement budget. Leftover budget
/// carries across hops but not into dwelling.
fn advance_travel(ctx: &mut TickContext, id: NpcId) {
    let mut budget = ctx.elapsed_minutes as f64 * ctx.config.travel_speed.max(0.0);
    let content = ctx.content;
    let Some(npc) = ctx.world.npc_mut(id) else {
        return;
    };
    let Activity::Traveling {
        intent, step_index, ..
    } = &mut npc.activity
    else {
        return;
    };

    let arrived = loop {
        let Some(step) = intent.path.get(*step_index) else {
            break true;
        };
        let remaining = npc.position.distance_to(step.target_position);
        if budget < remaining {
            npc.position = npc.position.step_towards(step.target_position, budget);
            break false;
        }
        budget -= remaining;
        npc.position = step.target_position;
        *step_index += 1;
        let Some(next) = intent.path.get(*step_index) else {
            break true;
        };
        if next.map_id != npc.current_map {
            let from = std::mem::replace(&mut npc.current_map, next.map_id.clone());
            npc.position = match content.map(&next.map_id) {
                Some(map) => map.entry_from(&from),
                None => {
                    tracing::warn!(map = %next.map_id, "path crosses into an unknown map");
                    next.target_position
                }
            };
        }
    };

    if arrived {
        arrive(ctx, id);
    }
}

fn arrive(ctx: &mut TickContext, id: NpcId) {
    let now = ctx.now;
    let Some(npc) = ctx.world.npc_mut(id) else {
        return;
    };
    let Activity::Traveling { intent, .. } = std::mem::take(&mut npc.activity) else {
        return;
    };
    if intent.duration_months == 0 {
        tracing::debug!(npc = id, kind = %intent.kind, "arrived");
        return;
    }
    npc.activity = Activity::Dwelling {
        remaining_minutes: months_to_minutes(intent.duration_months),
        intent,
        started_at: now,
    };
}

fn advance_dwell(ctx: &mut TickContext, id: NpcId) {
    let elapsed = ctx.elapsed_minutes;
    let Some(npc) = ctx.world.npc_mut(id) else {
        return;
    };
    let Activity::Dwelling {
        remaining_minutes, ..
    } = &mut npc.activity
    else {
        return;
    };
    *remaining_minutes = remaining_minutes.saturating_sub(elapsed);
    if *remaining_minutes > 0 {
        return;
    }
    let Activity::Dwelling { intent, .. } = std::mem::take(&mut npc.activity) else {
        return;
    };
    complete_intent(ctx, id, intent);
}

fn try_begin_intent(ctx: &mut TickContext, id: NpcId) {
    let now = ctx.now;
    let Some(npc) = ctx.world.npc_mut(id) else {
        return;
    };
    match npc.cannot_act_until {
        Some(until) if now < until => return,
        Some(_) => npc.cannot_act_until = None,
        None => {}
    }
    let Some(npc) = ctx.world.npc(id) else {
        return;
    };
    let Some(intent) = plan(npc, ctx.world, ctx.content, &mut *ctx.rng) else {
        return;
    };
    let map_id = npc.current_map.clone();
    let message = intent.description.clone();
    install_intent(ctx, id, intent);
    ctx.world
        .log_event(LogKind::IntentStarted, Some(id), Some(&map_id), message);
}

/// Start an intent: travel when it has a path, otherwise dwell in place.
pub(crate) fn install_intent(ctx: &mut TickContext, id: NpcId, intent: Intent) {
    let now = ctx.now;
    let Some(npc) = ctx.world.npc_mut(id) else {
        return;
    };
    npc.cannot_act_until = None;
    npc.activity = if !intent.path.is_empty() {
        Activity::Traveling {
            intent,
            step_index: 0,
            started_at: now,
        }
    } else if intent.duration_months > 0 {
        Activity::Dwelling {
            remaining_minutes: months_to_minutes(intent.duration_months),
            intent,
            started_at: now,
        }
    } else {
        Activity::Idle
    };
}
