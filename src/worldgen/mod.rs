pub mod names;
pub mod nodes;
pub mod npcs;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::model::{ContentTables, GameTime, Player, World};

pub use nodes::generate_for_map;
pub use npcs::populate_map;

/// Fill every map of `content` with resource nodes and NPCs.
///
/// Existing NPCs are kept; each map's node list is replaced.
pub fn populate_world(world: &mut World, content: &ContentTables, seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    for map in content.maps.values() {
        let instances = generate_for_map(map, content, &mut world.id_gen, &mut rng);
        world.nodes.set_map_instances(&map.id, instances);
        for npc in populate_map(map, content, &mut rng) {
            world.add_npc(npc);
        }
    }
}

/// A fresh world with the player standing on `start_map`'s spawn point.
pub fn generate_world(
    content: &ContentTables,
    player_name: &str,
    start_map: &str,
    start: GameTime,
    seed: u64,
) -> World {
    let spawn = match content.map(start_map) {
        Some(map) => map.spawn_point,
        None => {
            tracing::warn!(map = %start_map, "start map missing from content");
            Default::default()
        }
    };
    let mut world = World::new(Player::new(player_name, start_map, spawn), start);
    populate_world(&mut world, content, seed);
    tracing::info!(
        maps = content.maps.len(),
        npcs = world.npcs.len(),
        "world generated"
    );
    world
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NpcSpawnRule;
    use crate::scenario::standard_content;

    #[test]
    fn same_seed_same_world() {
        let mut content = standard_content();
        if let Some(valley) = content.maps.get_mut("valley") {
            valley.npc_rules.push(NpcSpawnRule {
                count: 4,
                realm_range: (0, 3),
                faction_id: Some("azure-sect".into()),
                role: None,
                monster_id: None,
                area_id: None,
            });
        }
        let a = generate_world(&content, "Hero", "valley", GameTime::default(), 9);
        let b = generate_world(&content, "Hero", "valley", GameTime::default(), 9);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        assert_eq!(a.npcs_on_map("valley").len(), 4);
        assert_eq!(a.player.position, content.map("valley").unwrap().spawn_point);
    }

    #[test]
    fn node_and_npc_ids_never_collide() {
        let mut content = standard_content();
        if let Some(peak) = content.maps.get_mut("peak") {
            peak.npc_rules.push(NpcSpawnRule {
                count: 3,
                realm_range: (0, 0),
                faction_id: None,
                role: None,
                monster_id: Some("shadow-wolf".into()),
                area_id: None,
            });
        }
        let world = generate_world(&content, "Hero", "valley", GameTime::default(), 1);
        let mut ids: Vec<u64> = world.npcs.keys().copied().collect();
        for map in content.maps.keys() {
            ids.extend(world.nodes.all_instances(map).iter().map(|n| n.id));
        }
        let unique: std::collections::BTreeSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }
}
