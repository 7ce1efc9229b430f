//! Effects applied when a dwelling NPC finishes its intent, followed by the
//! post-outing rest and the trip home.

use rand::Rng;

use super::context::TickContext;
use super::pathing::build_path;
use crate::model::inventory::roll_loot;
use crate::model::{
    Activity, Destination, GatherTarget, Intent, IntentKind, ItemStack, LogKind, NpcId,
};

/// Apply an intent's effects, log the result, then start the rest period.
pub(crate) fn complete_intent(ctx: &mut TickContext, id: NpcId, intent: Intent) {
    let message = match &intent.kind {
        IntentKind::Gather { target } => gather(ctx, id, &intent, *target),
        IntentKind::Hunt => hunt(ctx, id, &intent),
        IntentKind::Trade => trade(ctx, id, &intent),
        IntentKind::Meditate => flavor(ctx, id, "finished meditating"),
        IntentKind::Challenge { .. } => flavor(ctx, id, "finished sparring at the arena"),
        IntentKind::Wander => flavor(ctx, id, "finished wandering"),
        IntentKind::Socialize => flavor(ctx, id, "spent time among fellow cultivators"),
        IntentKind::ReturnHome => flavor(ctx, id, "is back home"),
    };
    ctx.world.log_event(
        LogKind::IntentCompleted,
        Some(id),
        Some(&intent.destination.map_id),
        message,
    );
    begin_rest(ctx, id);
}

fn npc_name(ctx: &TickContext, id: NpcId) -> String {
    ctx.world
        .npc(id)
        .map(|n| n.display_name())
        .unwrap_or_else(|| format!("#{id}"))
}

fn flavor(ctx: &TickContext, id: NpcId, what: &str) -> String {
    format!("{} {what}.", npc_name(ctx, id))
}

fn describe_items(ctx: &TickContext, items: &[ItemStack]) -> String {
    items
        .iter()
        .map(|s| format!("{}x {}", s.quantity, ctx.content.item_name(&s.item_id)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Harvest one random visible node of the target kind in the destination
/// area. Removal and respawn scheduling happen together.
fn gather(ctx: &mut TickContext, id: NpcId, intent: &Intent, target: GatherTarget) -> String {
    let name = npc_name(ctx, id);
    let Destination {
        map_id, area_id, ..
    } = &intent.destination;
    let Some(area_id) = area_id else {
        tracing::warn!(npc = id, "gather intent without an area");
        return format!("{name} found nothing to gather.");
    };

    let candidates: Vec<(u64, String)> = ctx
        .world
        .nodes
        .visible_in_area(map_id, area_id, target.node_kind())
        .into_iter()
        .map(|n| (n.id, n.base_id.clone()))
        .collect();
    if candidates.is_empty() {
        return format!("{name} found nothing left to gather.");
    }
    let (instance_id, base_id) = &candidates[ctx.rng.random_range(0..candidates.len())];
    let Some(template) = ctx.content.template(base_id) else {
        tracing::warn!(base_id = %base_id, "node template missing");
        return format!("{name} found nothing to gather.");
    };

    let items = roll_loot(&template.loot, &mut *ctx.rng);
    ctx.world.nodes.remove_and_enqueue_respawn(
        map_id,
        *instance_id,
        template.respawn,
        ctx.config.respawn_multiplier,
        ctx.now,
        &mut *ctx.rng,
    );
    if let Some(npc) = ctx.world.npc_mut(id) {
        npc.inventory.add_all(&items);
    }
    if items.is_empty() {
        format!("{name} harvested {} but came away empty-handed.", template.name)
    } else {
        format!("{name} gathered {}.", describe_items(ctx, &items))
    }
}

/// Draws scale with the duration and with fortune; each draw succeeds with
/// the configured chance and yields one item from the hunt pool.
fn hunt(ctx: &mut TickContext, id: NpcId, intent: &Intent) -> String {
    let name = npc_name(ctx, id);
    let fortune = ctx.world.npc(id).map(|n| n.co_duyen).unwrap_or(0) as f64;
    let draws = (intent.duration_months as f64 * (1.0 + fortune / ctx.config.hunt_fortune_divisor))
        .ceil() as u32;
    let pool = ctx.content.hunt_drops();
    let mut items: Vec<ItemStack> = Vec::new();
    if !pool.is_empty() {
        for _ in 0..draws {
            if !ctx.rng.random_bool(ctx.config.hunt_drop_chance.clamp(0.0, 1.0)) {
                continue;
            }
            let item_id = &pool[ctx.rng.random_range(0..pool.len())];
            match items.iter_mut().find(|s| &s.item_id == item_id) {
                Some(stack) => stack.quantity += 1,
                None => items.push(ItemStack::new(item_id.clone(), 1)),
            }
        }
    }
    if let Some(npc) = ctx.world.npc_mut(id) {
        npc.inventory.add_all(&items);
    }
    if items.is_empty() {
        format!("{name} returned from the hunt with nothing.")
    } else {
        format!("{name} hunted and took {}.", describe_items(ctx, &items))
    }
}

fn trade(ctx: &mut TickContext, id: NpcId, intent: &Intent) -> String {
    let name = npc_name(ctx, id);
    let Some(npc) = ctx.world.npc_mut(id) else {
        return format!("{name} traded.");
    };
    let earnings = (intent.duration_months as f64
        * ctx.config.trade_income_per_month
        * (1.0 + npc.co_duyen as f64 / ctx.config.trade_fortune_divisor))
        .round() as u64;
    npc.linh_thach += earnings;
    format!("{name} traded and earned {earnings} spirit stones.")
}

/// Rest before the next plan. Fixed-position role holders rest longer with
/// their role's probability. NPCs away from home first travel back.
fn begin_rest(ctx: &mut TickContext, id: NpcId) {
    let Some(npc) = ctx.world.npc(id) else {
        return;
    };
    let fixed_chance = npc
        .faction
        .as_ref()
        .and_then(|m| {
            ctx.content
                .faction(&m.faction_id)
                .and_then(|f| f.role(&m.role))
        })
        .map(|r| r.fixed_position_chance.clamp(0.0, 1.0))
        .unwrap_or(0.0);
    let (lo, hi) = if fixed_chance > 0.0 && ctx.rng.random_bool(fixed_chance) {
        ctx.config.fixed_post_rest_months
    } else {
        ctx.config.rest_months
    };
    let months = ctx.rng.random_range(lo.min(hi)..=lo.max(hi));
    let until = ctx.now.advance_months(months);

    let return_trip = if npc.current_map != npc.home_map {
        let home_position = npc
            .home_position
            .or_else(|| ctx.content.map(&npc.home_map).map(|m| m.spawn_point));
        match home_position
            .and_then(|pos| build_path(ctx.content, &npc.current_map, &npc.home_map, pos).map(|p| (pos, p)))
        {
            Some((position, path)) => Some(Intent {
                kind: IntentKind::ReturnHome,
                description: format!("{} returns home", npc.display_name()),
                destination: Destination {
                    map_id: npc.home_map.clone(),
                    poi_id: None,
                    area_id: None,
                    position,
                },
                duration_months: 0,
                path,
            }),
            None => {
                tracing::warn!(npc = id, home = %npc.home_map, "no way home, resting in place");
                None
            }
        }
    } else {
        None
    };

    let Some(npc) = ctx.world.npc_mut(id) else {
        return;
    };
    npc.cannot_act_until = Some(until);
    match return_trip {
        Some(intent) => {
            let map_id = npc.current_map.clone();
            let message = intent.description.clone();
            npc.activity = Activity::Traveling {
                intent,
                step_index: 0,
                started_at: ctx.now,
            };
            ctx.world
                .log_event(LogKind::Returning, Some(id), Some(&map_id), message);
        }
        None => npc.activity = Activity::Idle,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::config::SimConfig;
    use crate::model::{ContentTables, Position, World};
    use crate::scenario::Scenario;

    fn intent(kind: IntentKind, map: &str, area: Option<&str>, months: u32) -> Intent {
        Intent {
            kind,
            description: String::new(),
            destination: Destination {
                map_id: map.into(),
                poi_id: None,
                area_id: area.map(str::to_string),
                position: Position::default(),
            },
            duration_months: months,
            path: Vec::new(),
        }
    }

    fn complete(world: &mut World, content: &ContentTables, config: &SimConfig, id: NpcId, i: Intent) {
        let mut rng = SmallRng::seed_from_u64(11);
        let now = world.current_time;
        let mut ctx = TickContext {
            world,
            content,
            config,
            rng: &mut rng,
            now,
            elapsed_minutes: 0,
        };
        complete_intent(&mut ctx, id, i);
    }

    #[test]
    fn gather_takes_loot_and_hides_the_node() {
        let mut s = Scenario::standard();
        let id = s.cultivator("Lin Feng").on_map("valley").id();
        let (mut world, content) = s.build_with_content();
        let before = world
            .nodes
            .visible_in_area("valley", "spirit-field", crate::model::NodeKind::Herb)
            .len();
        assert!(before > 0);

        let gather = intent(
            IntentKind::Gather { target: GatherTarget::Herb },
            "valley",
            Some("spirit-field"),
            1,
        );
        complete(&mut world, &content, &SimConfig::default(), id, gather);

        assert_eq!(world.npc(id).unwrap().inventory.count("spirit-grass"), 2);
        let after = world
            .nodes
            .visible_in_area("valley", "spirit-field", crate::model::NodeKind::Herb)
            .len();
        assert_eq!(after, before - 1);
        assert_eq!(world.nodes.respawn_queue().len(), 1);
        assert!(world.nodes.respawn_queue()[0].respawn_at > world.current_time);
    }

    #[test]
    fn trade_income_scales_with_fortune() {
        let mut s = Scenario::standard();
        let id = s.cultivator("Lin Feng").on_map("valley").co_duyen(30).id();
        let (mut world, content) = s.build_with_content();
        complete(&mut world, &content, &SimConfig::default(), id, intent(IntentKind::Trade, "valley", None, 2));
        assert_eq!(world.npc(id).unwrap().linh_thach, 2000);
    }

    #[test]
    fn hunt_always_drops_at_full_chance() {
        let mut s = Scenario::standard();
        let id = s.cultivator("Lin Feng").on_map("valley").id();
        let (mut world, content) = s.build_with_content();
        let config = SimConfig {
            hunt_drop_chance: 1.0,
            ..SimConfig::default()
        };
        complete(&mut world, &content, &config, id, intent(IntentKind::Hunt, "valley", Some("dark-woods"), 3));
        let total: u32 = world.npc(id).unwrap().inventory.iter().map(|s| s.quantity).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn completing_away_from_home_installs_a_return_trip() {
        let mut s = Scenario::standard();
        let id = s.cultivator("Lin Feng").home("valley").on_map("peak").id();
        let (mut world, content) = s.build_with_content();
        complete(&mut world, &content, &SimConfig::default(), id, intent(IntentKind::Wander, "peak", None, 1));

        let npc = world.npc(id).unwrap();
        let Activity::Traveling { intent, .. } = &npc.activity else {
            panic!("expected a return trip, got {:?}", npc.activity);
        };
        assert_eq!(intent.kind, IntentKind::ReturnHome);
        assert_eq!(intent.duration_months, 0);
        assert_eq!(intent.path.last().unwrap().map_id, "valley");
        assert!(npc.cannot_act_until.unwrap() > world.current_time);
        assert_eq!(world.log.of_kind(LogKind::Returning).count(), 1);
    }

    #[test]
    fn rest_lasts_within_configured_months() {
        let mut s = Scenario::standard();
        let id = s.cultivator("Lin Feng").on_map("valley").id();
        let (mut world, content) = s.build_with_content();
        complete(&mut world, &content, &SimConfig::default(), id, intent(IntentKind::Meditate, "valley", None, 1));
        let npc = world.npc(id).unwrap();
        assert!(npc.activity.is_idle());
        let rest = world.current_time.minutes_until(npc.cannot_act_until.unwrap());
        assert!((43_200..=3 * 43_200).contains(&rest));
    }

    fn leader_rest_months(fixed_position_chance: f64) -> u64 {
        let mut s = Scenario::standard();
        let id = s
            .cultivator("Old Master")
            .on_map("valley")
            .member("azure-sect", "Leader", 100)
            .id();
        let (mut world, mut content) = s.build_with_content();
        if let Some(leader) = content
            .factions
            .get_mut("azure-sect")
            .and_then(|f| f.roles.iter_mut().find(|r| r.name == "Leader"))
        {
            leader.fixed_position_chance = fixed_position_chance;
        }
        complete(&mut world, &content, &SimConfig::default(), id, intent(IntentKind::Meditate, "valley", None, 1));
        let npc = world.npc(id).unwrap();
        assert!(npc.activity.is_idle());
        world.current_time.minutes_until(npc.cannot_act_until.unwrap()) / 43_200
    }

    #[test]
    fn fixed_position_roles_take_the_long_rest() {
        assert!((6..=12).contains(&leader_rest_months(1.0)));
    }

    #[test]
    fn fixed_position_roles_without_the_trait_rest_briefly() {
        assert!((1..=3).contains(&leader_rest_months(0.0)));
    }

    #[test]
    fn inverted_rest_range_still_rests() {
        let mut s = Scenario::standard();
        let id = s.cultivator("Lin Feng").on_map("valley").id();
        let (mut world, content) = s.build_with_content();
        let config = SimConfig {
            rest_months: (3, 1),
            ..SimConfig::default()
        };
        complete(&mut world, &content, &config, id, intent(IntentKind::Meditate, "valley", None, 1));
        let npc = world.npc(id).unwrap();
        let rest = world.current_time.minutes_until(npc.cannot_act_until.unwrap());
        assert!((43_200..=3 * 43_200).contains(&rest));
    }
}
