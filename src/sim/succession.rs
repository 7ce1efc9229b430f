use std::cmp::Ordering;

use crate::config::SimConfig;
use crate::model::{ContentTables, LogKind, Npc, NpcId, World};

/// Fill the vacancy left by a defeated faction member.
///
/// Only roles with at least `succession_min_power` power leave a vacancy.
/// Candidates come from the role one rank below; if nobody holds it, two
/// ranks below. The strongest candidate (realm, then level; lowest id on a
/// tie) inherits the role and its power. Returns the promoted NPC.
pub fn resolve_succession(
    world: &mut World,
    content: &ContentTables,
    config: &SimConfig,
    deceased: NpcId,
) -> Option<NpcId> {
    let npc = world.npc(deceased)?;
    if !npc.is_cultivator() {
        return None;
    }
    let membership = npc.faction.clone()?;
    if membership.power < config.succession_min_power {
        return None;
    }
    let Some(faction) = content.faction(&membership.faction_id) else {
        tracing::warn!(faction = %membership.faction_id, "succession for unknown faction");
        return None;
    };
    let Some(rank) = faction.rank_of(&membership.role) else {
        tracing::warn!(role = %membership.role, faction = %faction.id, "succession for unknown role");
        return None;
    };

    let successor = (1..=2).find_map(|offset| {
        let lower = faction.role_at(rank + offset)?;
        world
            .npcs
            .values()
            .filter(|n| n.id != deceased && n.is_cultivator() && !world.is_defeated(n.id))
            .filter(|n| {
                n.faction
                    .as_ref()
                    .is_some_and(|m| m.faction_id == faction.id && m.role == lower.name)
            })
            .max_by(|a, b| stronger(a, b))
            .map(|n| n.id)
    })?;

    let heir = world.npc_mut(successor)?;
    if let Some(m) = heir.faction.as_mut() {
        m.role = membership.role.clone();
        m.power = membership.power;
    }
    let message = format!(
        "{} rises to {} of {}.",
        heir.display_name(),
        membership.role,
        faction.name
    );
    let map_id = heir.current_map.clone();
    world.log_event(LogKind::Succession, Some(successor), Some(&map_id), message);
    Some(successor)
}

fn stronger(a: &Npc, b: &Npc) -> Ordering {
    a.cultivation
        .realm_index
        .cmp(&b.cultivation.realm_index)
        .then(a.cultivation.level.cmp(&b.cultivation.level))
        .then(b.id.cmp(&a.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;

    #[test]
    fn elder_replaces_fallen_leader() {
        let mut s = Scenario::standard();
        let leader = s.cultivator("Old Master").member("azure-sect", "Leader", 100).id();
        let weak_elder = s
            .cultivator("Elder Mo")
            .member("azure-sect", "Elder", 60)
            .realm(2, 3)
            .id();
        let strong_elder = s
            .cultivator("Elder Qin")
            .member("azure-sect", "Elder", 60)
            .realm(2, 7)
            .id();
        s.cultivator("Disciple Hu").member("azure-sect", "Disciple", 20).realm(5, 1);
        let (mut world, content) = s.build_with_content();

        world.mark_defeated(leader);
        let heir = resolve_succession(&mut world, &content, &SimConfig::default(), leader);

        assert_eq!(heir, Some(strong_elder));
        let m = world.npc(strong_elder).unwrap().faction.clone().unwrap();
        assert_eq!((m.role.as_str(), m.power), ("Leader", 100));
        assert_eq!(world.npc(weak_elder).unwrap().faction.as_ref().unwrap().role, "Elder");
        assert_eq!(world.log.of_kind(LogKind::Succession).count(), 1);
    }

    #[test]
    fn falls_back_two_ranks_when_the_next_rank_is_empty() {
        let mut s = Scenario::standard();
        let leader = s.cultivator("Old Master").member("azure-sect", "Leader", 100).id();
        let disciple = s.cultivator("Disciple Hu").member("azure-sect", "Disciple", 20).id();
        let (mut world, content) = s.build_with_content();
        world.mark_defeated(leader);
        assert_eq!(
            resolve_succession(&mut world, &content, &SimConfig::default(), leader),
            Some(disciple)
        );
    }

    #[test]
    fn low_power_roles_leave_no_vacancy() {
        let mut s = Scenario::standard();
        let disciple = s.cultivator("Disciple Hu").member("azure-sect", "Disciple", 20).id();
        s.cultivator("Disciple Lu").member("azure-sect", "Disciple", 20);
        let (mut world, content) = s.build_with_content();
        world.mark_defeated(disciple);
        assert_eq!(
            resolve_succession(&mut world, &content, &SimConfig::default(), disciple),
            None
        );
    }

    #[test]
    fn defeated_members_are_not_candidates() {
        let mut s = Scenario::standard();
        let leader = s.cultivator("Old Master").member("azure-sect", "Leader", 100).id();
        let elder = s.cultivator("Elder Qin").member("azure-sect", "Elder", 60).id();
        let (mut world, content) = s.build_with_content();
        world.mark_defeated(elder);
        world.mark_defeated(leader);
        assert_eq!(
            resolve_succession(&mut world, &content, &SimConfig::default(), leader),
            None
        );
    }

    #[test]
    fn strongest_disciple_replaces_fallen_elder() {
        let mut s = Scenario::standard();
        let leader = s.cultivator("Old Master").member("azure-sect", "Leader", 100).id();
        let elder = s.cultivator("Elder Qin").member("azure-sect", "Elder", 60).id();
        let weak = s
            .cultivator("Disciple Lu")
            .member("azure-sect", "Disciple", 20)
            .realm(1, 4)
            .id();
        let strong = s
            .cultivator("Disciple Hu")
            .member("azure-sect", "Disciple", 20)
            .realm(2, 1)
            .id();
        let (mut world, content) = s.build_with_content();

        world.mark_defeated(elder);
        let heir = resolve_succession(&mut world, &content, &SimConfig::default(), elder);

        assert_eq!(heir, Some(strong));
        let m = world.npc(strong).unwrap().faction.clone().unwrap();
        assert_eq!((m.role.as_str(), m.power), ("Elder", 60));
        assert_eq!(world.npc(weak).unwrap().faction.as_ref().unwrap().role, "Disciple");
        assert_eq!(world.npc(leader).unwrap().faction.as_ref().unwrap().role, "Leader");
        assert_eq!(world.log.of_kind(LogKind::Succession).count(), 1);
    }
}
