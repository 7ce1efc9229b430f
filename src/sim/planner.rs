//! Goal selection and destination search for idle NPCs.
//!
//! The planner is a pure function of the NPC, the world and the RNG. It
//! never mutates state; the progression system installs whatever it
//! returns.

use rand::Rng;

use super::pathing::build_path;
use crate::model::{
    AreaKind, ContentTables, Destination, GatherTarget, Intent, IntentKind, MapId, NodeKind, Npc,
    PathStep, PersonalityTag, PoiKind, World,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Goal {
    Meditate,
    Gather,
    Hunt,
    Trade,
    Challenge,
    Wander,
    Socialize,
}

struct Candidate {
    destination: Destination,
    place: String,
}

/// Base goal weights adjusted by personality tags.
fn goal_weights(personality: &[PersonalityTag]) -> Vec<(Goal, u32)> {
    let mut weights: Vec<(Goal, i32)> = vec![
        (Goal::Meditate, 3),
        (Goal::Gather, 3),
        (Goal::Hunt, 2),
        (Goal::Trade, 2),
        (Goal::Challenge, 1),
        (Goal::Wander, 1),
        (Goal::Socialize, 2),
    ];
    let mut bump = |goal: Goal, delta: i32| {
        if let Some(entry) = weights.iter_mut().find(|(g, _)| *g == goal) {
            entry.1 += delta;
        }
    };
    for tag in personality {
        match tag {
            PersonalityTag::Aggressive => {
                bump(Goal::Hunt, 2);
                bump(Goal::Challenge, 2);
            }
            PersonalityTag::Peaceful => {
                bump(Goal::Meditate, 2);
                bump(Goal::Challenge, -1);
            }
            PersonalityTag::Greedy => {
                bump(Goal::Trade, 2);
                bump(Goal::Gather, 1);
            }
            PersonalityTag::Generous => bump(Goal::Socialize, 1),
            PersonalityTag::Sociable => bump(Goal::Socialize, 2),
            PersonalityTag::Reclusive => {
                bump(Goal::Meditate, 3);
                bump(Goal::Socialize, -2);
            }
            PersonalityTag::Ambitious => {
                bump(Goal::Challenge, 1);
                bump(Goal::Meditate, 1);
            }
            PersonalityTag::Cautious => bump(Goal::Hunt, -1),
            PersonalityTag::Honorable => bump(Goal::Challenge, 1),
            PersonalityTag::Cunning => bump(Goal::Trade, 1),
        }
    }
    weights
        .into_iter()
        .map(|(g, w)| (g, w.max(0) as u32))
        .collect()
}

/// Pick a goal and a reachable destination for an idle NPC.
///
/// Goals are tried in weighted-random order until one produces a
/// destination with a usable path. `None` means the NPC stays idle.
pub fn plan<R: Rng + ?Sized>(
    npc: &Npc,
    world: &World,
    content: &ContentTables,
    rng: &mut R,
) -> Option<Intent> {
    let mut pool = goal_weights(&npc.personality);
    pool.retain(|(_, w)| *w > 0);

    while !pool.is_empty() {
        let total: u32 = pool.iter().map(|(_, w)| *w).sum();
        let mut roll = rng.random_range(0..total);
        let idx = pool
            .iter()
            .position(|(_, w)| {
                if roll < *w {
                    true
                } else {
                    roll -= *w;
                    false
                }
            })
            .unwrap_or(0);
        let (goal, _) = pool.remove(idx);
        if let Some(intent) = plan_goal(goal, npc, world, content, rng) {
            return Some(intent);
        }
    }
    None
}

fn plan_goal<R: Rng + ?Sized>(
    goal: Goal,
    npc: &Npc,
    world: &World,
    content: &ContentTables,
    rng: &mut R,
) -> Option<Intent> {
    let maps = candidate_maps(npc, content);
    let (kind, candidates, months) = match goal {
        Goal::Meditate => {
            let mut found = poi_candidates(content, &maps, &[PoiKind::Cave, PoiKind::Sect]);
            if found.is_empty() {
                found.push(Candidate {
                    destination: Destination {
                        map_id: npc.current_map.clone(),
                        poi_id: None,
                        area_id: None,
                        position: npc.position,
                    },
                    place: "a quiet spot".to_string(),
                });
            }
            (IntentKind::Meditate, found, (1, 3))
        }
        Goal::Gather => {
            let mut targets = [GatherTarget::Herb, GatherTarget::Stone];
            if rng.random_bool(0.5) {
                targets.swap(0, 1);
            }
            let mut chosen = None;
            for target in targets {
                let found = gather_candidates(world, content, &maps, target);
                if !found.is_empty() {
                    chosen = Some((target, found));
                    break;
                }
            }
            let (target, found) = chosen?;
            (IntentKind::Gather { target }, found, (1, 2))
        }
        Goal::Hunt => (
            IntentKind::Hunt,
            area_candidates(content, &maps, AreaKind::HuntingGround),
            (1, 3),
        ),
        Goal::Trade => (
            IntentKind::Trade,
            poi_candidates(content, &maps, &[PoiKind::Market, PoiKind::City]),
            (1, 2),
        ),
        Goal::Challenge => (
            IntentKind::Challenge { target_npc: None },
            poi_candidates(content, &maps, &[PoiKind::Arena]),
            (1, 1),
        ),
        Goal::Wander => (
            IntentKind::Wander,
            poi_candidates(
                content,
                &maps,
                &[
                    PoiKind::Sect,
                    PoiKind::City,
                    PoiKind::Market,
                    PoiKind::Cave,
                    PoiKind::Arena,
                    PoiKind::Teahouse,
                    PoiKind::Landmark,
                ],
            )
            .into_iter()
            .filter(|c| c.destination.position != npc.position)
            .collect(),
            (1, 1),
        ),
        Goal::Socialize => (
            IntentKind::Socialize,
            poi_candidates(content, &maps, &[PoiKind::Teahouse, PoiKind::City]),
            (1, 1),
        ),
    };

    let (candidate, path) = choose_route(npc, candidates, content, rng)?;
    let kind = match kind {
        IntentKind::Challenge { .. } => IntentKind::Challenge {
            target_npc: challenge_target(npc, world, &candidate.destination.map_id),
        },
        other => other,
    };
    let duration_months = rng.random_range(months.0..=months.1);
    Some(Intent {
        description: describe(npc, &kind, &candidate.place),
        kind,
        destination: candidate.destination,
        duration_months,
        path,
    })
}

/// The current map, everything one hop away, then home.
fn candidate_maps(npc: &Npc, content: &ContentTables) -> Vec<MapId> {
    let mut maps: Vec<MapId> = vec![npc.current_map.clone()];
    if let Some(current) = content.map(&npc.current_map) {
        maps.extend(current.adjacent_maps().into_iter().map(str::to_string));
    }
    maps.push(npc.home_map.clone());
    let mut seen = Vec::with_capacity(maps.len());
    for m in maps {
        if content.map(&m).is_some() && !seen.contains(&m) {
            seen.push(m);
        }
    }
    seen
}

fn poi_candidates(content: &ContentTables, maps: &[MapId], kinds: &[PoiKind]) -> Vec<Candidate> {
    maps.iter()
        .filter_map(|id| content.map(id))
        .flat_map(|map| {
            map.pois
                .iter()
                .filter(|p| kinds.contains(&p.kind))
                .map(move |p| Candidate {
                    destination: Destination {
                        map_id: map.id.clone(),
                        poi_id: Some(p.id.clone()),
                        area_id: None,
                        position: p.position,
                    },
                    place: p.name.clone(),
                })
        })
        .collect()
}

fn area_candidates(content: &ContentTables, maps: &[MapId], kind: AreaKind) -> Vec<Candidate> {
    maps.iter()
        .filter_map(|id| content.map(id))
        .flat_map(|map| {
            map.areas_of_kind(kind).map(move |a| Candidate {
                destination: Destination {
                    map_id: map.id.clone(),
                    poi_id: None,
                    area_id: Some(a.id.clone()),
                    position: a.bounds.center(),
                },
                place: a.name.clone(),
            })
        })
        .collect()
}

/// Gathering areas that still hold at least one visible node of the kind.
fn gather_candidates(
    world: &World,
    content: &ContentTables,
    maps: &[MapId],
    target: GatherTarget,
) -> Vec<Candidate> {
    let area_kind = match target {
        GatherTarget::Herb => AreaKind::HerbField,
        GatherTarget::Stone => AreaKind::Mine,
    };
    let node_kind: NodeKind = target.node_kind();
    area_candidates(content, maps, area_kind)
        .into_iter()
        .filter(|c| {
            c.destination.area_id.as_deref().is_some_and(|area| {
                !world
                    .nodes
                    .visible_in_area(&c.destination.map_id, area, node_kind)
                    .is_empty()
            })
        })
        .collect()
}

fn route_to(npc: &Npc, dest: &Destination, content: &ContentTables) -> Option<Vec<PathStep>> {
    if dest.map_id == npc.current_map && dest.position == npc.position {
        return Some(Vec::new());
    }
    build_path(content, &npc.current_map, &dest.map_id, dest.position)
}

/// Pick a candidate at random; if its path is unusable, fall back to a
/// same-map candidate.
fn choose_route<R: Rng + ?Sized>(
    npc: &Npc,
    mut candidates: Vec<Candidate>,
    content: &ContentTables,
    rng: &mut R,
) -> Option<(Candidate, Vec<PathStep>)> {
    if candidates.is_empty() {
        return None;
    }
    let pick = candidates.swap_remove(rng.random_range(0..candidates.len()));
    if let Some(path) = route_to(npc, &pick.destination, content) {
        return Some((pick, path));
    }
    let mut local: Vec<Candidate> = std::iter::once(pick)
        .chain(candidates)
        .filter(|c| c.destination.map_id == npc.current_map)
        .collect();
    if local.is_empty() {
        return None;
    }
    let pick = local.swap_remove(rng.random_range(0..local.len()));
    let path = route_to(npc, &pick.destination, content)?;
    Some((pick, path))
}

/// Closest-in-power living cultivator on the arena's map.
fn challenge_target(npc: &Npc, world: &World, map_id: &str) -> Option<u64> {
    let own = npc.cultivation.power_rank() as i64;
    world
        .living_npcs_on_map(map_id)
        .into_iter()
        .filter(|id| *id != npc.id)
        .filter_map(|id| world.npc(id))
        .filter(|other| other.is_cultivator())
        .min_by_key(|other| ((other.cultivation.power_rank() as i64 - own).abs(), other.id))
        .map(|other| other.id)
}

fn describe(npc: &Npc, kind: &IntentKind, place: &str) -> String {
    let name = npc.display_name();
    match kind {
        IntentKind::Meditate => format!("{name} withdraws to {place} to meditate"),
        IntentKind::Gather { target: GatherTarget::Herb } => {
            format!("{name} sets out to gather herbs at {place}")
        }
        IntentKind::Gather { target: GatherTarget::Stone } => {
            format!("{name} sets out to mine spirit stone at {place}")
        }
        IntentKind::Hunt => format!("{name} goes hunting in {place}"),
        IntentKind::Trade => format!("{name} heads to {place} to trade"),
        IntentKind::Challenge { .. } => format!("{name} seeks a worthy opponent at {place}"),
        IntentKind::Wander => format!("{name} wanders towards {place}"),
        IntentKind::Socialize => format!("{name} goes to {place} to meet fellow cultivators"),
        IntentKind::ReturnHome => format!("{name} returns home"),
    }
}
