use rand::Rng;
use rand::RngCore;
use rand::seq::IndexedRandom;

use super::names::generate_cultivator_name;
use super::nodes::random_point;
use crate::model::npc::LEVELS_PER_REALM;
use crate::model::{
    Activity, CombatStats, ContentTables, Cultivation, Element, FactionMembership, Inventory,
    MapDef, Npc, NpcSpawnRule, NpcType, PersonalityTag, Position, WeaponKind,
};

const ELEMENTS: [Element; 5] = [
    Element::Metal,
    Element::Wood,
    Element::Water,
    Element::Fire,
    Element::Earth,
];

const WEAPONS: [WeaponKind; 5] = [
    WeaponKind::Sword,
    WeaponKind::Saber,
    WeaponKind::Spear,
    WeaponKind::Fan,
    WeaponKind::Staff,
];

const PERSONALITIES: [PersonalityTag; 10] = [
    PersonalityTag::Aggressive,
    PersonalityTag::Peaceful,
    PersonalityTag::Greedy,
    PersonalityTag::Generous,
    PersonalityTag::Sociable,
    PersonalityTag::Reclusive,
    PersonalityTag::Ambitious,
    PersonalityTag::Cautious,
    PersonalityTag::Honorable,
    PersonalityTag::Cunning,
];

/// NPC records for one map: its resident NPCs followed by everything its
/// spawn rules produce.
///
/// Procedural NPCs carry id 0; `World::add_npc` assigns real ids.
pub fn populate_map(map: &MapDef, content: &ContentTables, rng: &mut dyn RngCore) -> Vec<Npc> {
    let mut npcs: Vec<Npc> = map
        .resident_npcs
        .iter()
        .cloned()
        .map(|mut npc| {
            npc.current_map = map.id.clone();
            npc
        })
        .collect();

    for rule in &map.npc_rules {
        for _ in 0..rule.count {
            let spawned = match &rule.monster_id {
                Some(monster_id) => spawn_monster(map, rule, monster_id, content, rng),
                None => Some(spawn_cultivator(map, rule, content, rng)),
            };
            npcs.extend(spawned);
        }
    }
    tracing::debug!(map = %map.id, npcs = npcs.len(), "populated map");
    npcs
}

fn spawn_position(map: &MapDef, rule: &NpcSpawnRule, rng: &mut dyn RngCore) -> Position {
    let Some(area_id) = &rule.area_id else {
        return map.spawn_point;
    };
    match map.area(area_id) {
        Some(area) => random_point(area, rng),
        None => {
            tracing::warn!(map = %map.id, area = %area_id, "spawn rule names an unknown area");
            map.spawn_point
        }
    }
}

fn draw_realm(rule: &NpcSpawnRule, rng: &mut dyn RngCore) -> u32 {
    let (lo, hi) = rule.realm_range;
    rng.random_range(lo.min(hi)..=lo.max(hi))
}

fn membership(rule: &NpcSpawnRule, content: &ContentTables) -> Option<FactionMembership> {
    let faction_id = rule.faction_id.as_ref()?;
    let Some(faction) = content.faction(faction_id) else {
        tracing::warn!(faction = %faction_id, "spawn rule names an unknown faction");
        return None;
    };
    let role = match &rule.role {
        Some(name) => faction.role(name),
        None => faction.roles.last(),
    };
    let Some(role) = role else {
        tracing::warn!(faction = %faction_id, role = ?rule.role, "spawn rule names an unknown role");
        return None;
    };
    Some(FactionMembership {
        faction_id: faction.id.clone(),
        role: role.name.clone(),
        power: role.power,
    })
}

fn spawn_cultivator(
    map: &MapDef,
    rule: &NpcSpawnRule,
    content: &ContentTables,
    rng: &mut dyn RngCore,
) -> Npc {
    let realm = draw_realm(rule, rng);
    let cultivation = Cultivation::new(realm, rng.random_range(1..=LEVELS_PER_REALM));
    let position = spawn_position(map, rule, rng);

    let tag_count = rng.random_range(1..=2);
    let mut personality: Vec<PersonalityTag> =
        PERSONALITIES.choose_multiple(rng, tag_count).copied().collect();
    personality.sort();

    let root_count = rng.random_range(1..=2);
    let linh_can: Vec<Element> = ELEMENTS.choose_multiple(rng, root_count).copied().collect();
    let weapon = WEAPONS.choose(rng).copied();

    let known: Vec<&String> = content
        .skills
        .values()
        .filter(|s| s.element.is_none_or(|e| linh_can.contains(&e)))
        .filter(|s| s.weapon.is_none() || s.weapon == weapon)
        .map(|s| &s.id)
        .collect();
    let skills = known
        .choose_multiple(rng, 2)
        .map(|id| (*id).clone())
        .collect();

    Npc {
        id: 0,
        name: generate_cultivator_name(rng),
        title: None,
        npc_type: NpcType::Cultivator,
        monster_id: None,
        faction: membership(rule, content),
        personality,
        stats: CombatStats::for_cultivation(&cultivation),
        linh_thach: rng.random_range(10..=100) * (u64::from(realm) + 1),
        co_duyen: rng.random_range(0..=20),
        cultivation,
        linh_can,
        weapon,
        skills,
        inventory: Inventory::unbounded(),
        equipment: Vec::new(),
        home_map: map.id.clone(),
        home_position: Some(position),
        current_map: map.id.clone(),
        position,
        activity: Activity::Idle,
        cannot_act_until: None,
        challenge_cooldown_until: None,
    }
}

fn spawn_monster(
    map: &MapDef,
    rule: &NpcSpawnRule,
    monster_id: &str,
    content: &ContentTables,
    rng: &mut dyn RngCore,
) -> Option<Npc> {
    let Some(def) = content.monster(monster_id) else {
        tracing::warn!(map = %map.id, monster_id = %monster_id, "spawn rule names an unknown monster");
        return None;
    };
    let position = spawn_position(map, rule, rng);
    Some(Npc {
        id: 0,
        name: def.name.clone(),
        title: None,
        npc_type: NpcType::Monster,
        monster_id: Some(def.id.clone()),
        faction: None,
        personality: Vec::new(),
        cultivation: Cultivation::new(draw_realm(rule, rng), 1),
        stats: def.stats.clone(),
        linh_can: Vec::new(),
        weapon: None,
        skills: Vec::new(),
        inventory: Inventory::unbounded(),
        equipment: Vec::new(),
        linh_thach: 0,
        co_duyen: 0,
        home_map: map.id.clone(),
        home_position: Some(position),
        current_map: map.id.clone(),
        position,
        activity: Activity::Idle,
        cannot_act_until: None,
        challenge_cooldown_until: None,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::scenario::standard_content;

    fn rule(count: u32) -> NpcSpawnRule {
        NpcSpawnRule {
            count,
            realm_range: (1, 2),
            faction_id: None,
            role: None,
            monster_id: None,
            area_id: None,
        }
    }

    #[test]
    fn cultivators_get_derived_stats_and_membership() {
        let content = standard_content();
        let mut map = content.map("valley").unwrap().clone();
        map.npc_rules = vec![NpcSpawnRule {
            faction_id: Some("azure-sect".into()),
            area_id: Some("spirit-field".into()),
            ..rule(5)
        }];
        let mut rng = SmallRng::seed_from_u64(4);
        let npcs = populate_map(&map, &content, &mut rng);
        assert_eq!(npcs.len(), 5);
        let field = map.area("spirit-field").unwrap().bounds;
        for npc in &npcs {
            assert!((1..=2).contains(&npc.cultivation.realm_index));
            assert_eq!(npc.stats, CombatStats::for_cultivation(&npc.cultivation));
            let seat = npc.faction.as_ref().unwrap();
            assert_eq!(seat.role, "Disciple");
            assert_eq!(seat.power, 20);
            assert!(field.contains(npc.position));
            assert_eq!(npc.home_map, "valley");
            assert!(!npc.personality.is_empty());
        }
    }

    #[test]
    fn monsters_use_their_table_stats() {
        let content = standard_content();
        let mut map = content.map("valley").unwrap().clone();
        map.npc_rules = vec![
            NpcSpawnRule {
                monster_id: Some("shadow-wolf".into()),
                ..rule(2)
            },
            NpcSpawnRule {
                monster_id: Some("no-such-beast".into()),
                ..rule(3)
            },
        ];
        let mut rng = SmallRng::seed_from_u64(4);
        let npcs = populate_map(&map, &content, &mut rng);
        assert_eq!(npcs.len(), 2);
        let wolf = content.monster("shadow-wolf").unwrap();
        for npc in &npcs {
            assert_eq!(npc.npc_type, NpcType::Monster);
            assert_eq!(npc.stats, wolf.stats);
            assert_eq!(npc.position, map.spawn_point);
        }
    }

    #[test]
    fn unknown_faction_spawns_unaffiliated() {
        let content = standard_content();
        let mut map = content.map("peak").unwrap().clone();
        map.npc_rules = vec![NpcSpawnRule {
            faction_id: Some("ghost-clan".into()),
            ..rule(1)
        }];
        let mut rng = SmallRng::seed_from_u64(1);
        let npcs = populate_map(&map, &content, &mut rng);
        assert_eq!(npcs.len(), 1);
        assert!(npcs[0].faction.is_none());
    }
}
