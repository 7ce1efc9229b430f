use std::collections::BTreeMap;

use rand::Rng;

use super::context::TickContext;
use super::system::SimSystem;
use crate::model::time::minutes_to_months;
use crate::model::{LogKind, MapId, NpcId, personality_compatibility};

/// Affinity magnitude at which a pair counts as friends or enemies.
const BOND_THRESHOLD: i32 = 50;

/// Pairwise interactions between living cultivators that share a map.
pub struct SocialSystem;

/// Probability that at least one interaction happens over `months` when a
/// single month carries probability `per_month`.
pub fn interaction_chance(per_month: f64, months: f64) -> f64 {
    if months <= 0.0 {
        return 0.0;
    }
    let p = per_month.clamp(0.0, 1.0);
    (1.0 - (1.0 - p).powf(months)).clamp(0.0, 1.0)
}

/// Personality scaling for the base chance, kept within `[0.5, 1.5]`.
fn chance_modifier(compatibility: i32) -> f64 {
    (1.0 + 0.25 * compatibility as f64).clamp(0.5, 1.5)
}

impl SimSystem for SocialSystem {
    fn name(&self) -> &str {
        "social"
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let months = minutes_to_months(ctx.elapsed_minutes);
        if months <= 0.0 {
            return;
        }

        // Group by the records' own map rather than the membership index,
        // which is only reconciled after all systems ran.
        let mut by_map: BTreeMap<MapId, Vec<NpcId>> = BTreeMap::new();
        for id in ctx.world.living_cultivators() {
            if let Some(npc) = ctx.world.npc(id) {
                by_map.entry(npc.current_map.clone()).or_default().push(id);
            }
        }

        for (map_id, ids) in &by_map {
            for (i, &a) in ids.iter().enumerate() {
                for &b in &ids[i + 1..] {
                    let compat = match (ctx.world.npc(a), ctx.world.npc(b)) {
                        (Some(x), Some(y)) => personality_compatibility(&x.personality, &y.personality),
                        _ => continue,
                    };
                    let per_month = ctx.config.social_base_chance * chance_modifier(compat);
                    if ctx.rng.random_bool(interaction_chance(per_month, months)) {
                        interact(ctx, map_id, a, b, compat);
                    }
                }
            }
        }
    }
}

fn interact(ctx: &mut TickContext, map_id: &str, a: NpcId, b: NpcId, compat: i32) {
    let before = ctx.world.affinity(a, b);
    let lean = match before.signum() {
        1 => 0.2,
        -1 => -0.2,
        _ => 0.0,
    };
    let positive = (0.5 + lean + 0.1 * compat as f64).clamp(0.05, 0.95);
    let (lo, hi) = ctx.config.social_delta;
    let magnitude = ctx.rng.random_range(lo.min(hi)..=lo.max(hi)).abs();
    let delta = if ctx.rng.random_bool(positive) {
        magnitude
    } else {
        -magnitude
    };
    let after = ctx.world.adjust_affinity(a, b, delta);
    tracing::debug!(a, b, delta, after, "social interaction");

    let message = if before < BOND_THRESHOLD && after >= BOND_THRESHOLD {
        Some("have become close friends")
    } else if before > -BOND_THRESHOLD && after <= -BOND_THRESHOLD {
        Some("have become bitter rivals")
    } else {
        None
    };
    if let Some(what) = message {
        let names = (
            ctx.world.npc(a).map(|n| n.display_name()),
            ctx.world.npc(b).map(|n| n.display_name()),
        );
        if let (Some(x), Some(y)) = names {
            ctx.world
                .log_event(LogKind::Social, Some(a), Some(map_id), format!("{x} and {y} {what}."));
        }
    }
}
