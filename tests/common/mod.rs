#![allow(dead_code)]

use std::sync::Arc;

use cultivation_sim::SimConfig;
use cultivation_sim::model::*;
use cultivation_sim::sim::Orchestrator;

pub const MONTH: u64 = cultivation_sim::model::time::MINUTES_PER_MONTH;

pub fn orchestrator(content: ContentTables, seed: u64) -> Orchestrator {
    Orchestrator::new(Arc::new(content), SimConfig::with_seed(seed))
}

/// Put an NPC on the road to `target` on `to_map`, starting from where it
/// stands.
pub fn send(
    world: &mut World,
    content: &ContentTables,
    id: NpcId,
    kind: IntentKind,
    to_map: &str,
    target: Position,
    months: u32,
) {
    let from = world.npc(id).unwrap().current_map.clone();
    let path = cultivation_sim::sim::pathing::build_path(content, &from, to_map, target)
        .expect("maps are connected");
    let now = world.current_time;
    world.npc_mut(id).unwrap().activity = Activity::Traveling {
        intent: Intent {
            kind,
            description: "test errand".into(),
            destination: Destination {
                map_id: to_map.into(),
                poi_id: None,
                area_id: None,
                position: target,
            },
            duration_months: months,
            path,
        },
        step_index: 0,
        started_at: now,
    };
}

/// Immediately-due dwelling at the NPC's current spot.
pub fn dwell(world: &mut World, id: NpcId, intent: Intent) {
    let now = world.current_time;
    world.npc_mut(id).unwrap().activity = Activity::Dwelling {
        intent,
        remaining_minutes: 1,
        started_at: now,
    };
}

pub fn intent_at(
    kind: IntentKind,
    map_id: &str,
    area_id: Option<&str>,
    position: Position,
) -> Intent {
    Intent {
        kind,
        description: "test errand".into(),
        destination: Destination {
            map_id: map_id.into(),
            poi_id: None,
            area_id: area_id.map(str::to_string),
            position,
        },
        duration_months: 1,
        path: vec![],
    }
}
