use rand::Rng;
use rand::RngCore;

use crate::id::IdGenerator;
use crate::model::{Area, ContentTables, MapDef, NodeInstance, Position, WeightedTemplate};

/// Placement attempts allowed per requested node before an area gives up.
const ATTEMPTS_PER_NODE: u32 = 20;

/// Build the master node list for one map: every manual spawn, then each
/// area's procedural fill.
///
/// Spawns naming an unknown template are skipped with a warning.
pub fn generate_for_map(
    map: &MapDef,
    content: &ContentTables,
    id_gen: &mut IdGenerator,
    rng: &mut dyn RngCore,
) -> Vec<NodeInstance> {
    let mut instances = Vec::new();

    for spawn in &map.node_spawns {
        let Some(template) = content.template(&spawn.base_id) else {
            tracing::warn!(map = %map.id, base_id = %spawn.base_id, "unknown node template in manual spawn");
            continue;
        };
        instances.push(NodeInstance {
            id: id_gen.next_id(),
            base_id: template.id.clone(),
            name: template.name.clone(),
            kind: template.kind,
            position: spawn.position,
            area_id: spawn.area_id.clone(),
        });
    }

    for area in &map.areas {
        fill_area(map, area, content, id_gen, rng, &mut instances);
    }

    tracing::debug!(map = %map.id, nodes = instances.len(), "generated resource nodes");
    instances
}

fn fill_area(
    map: &MapDef,
    area: &Area,
    content: &ContentTables,
    id_gen: &mut IdGenerator,
    rng: &mut dyn RngCore,
    out: &mut Vec<NodeInstance>,
) {
    let Some(fill) = &area.fill else {
        return;
    };
    let mut placed = 0;
    let mut attempts = 0;
    let max_attempts = fill.count * ATTEMPTS_PER_NODE;
    while placed < fill.count && attempts < max_attempts {
        attempts += 1;
        let Some(base_id) = pick_weighted(&fill.weights, rng) else {
            tracing::warn!(map = %map.id, area = %area.id, "area fill has no positive weights");
            return;
        };
        let Some(template) = content.template(base_id) else {
            tracing::warn!(map = %map.id, area = %area.id, base_id = %base_id, "unknown node template in area fill");
            continue;
        };
        let position = random_point(area, rng);
        if map.pois.iter().any(|poi| poi.bounds.contains(position)) {
            continue;
        }
        out.push(NodeInstance {
            id: id_gen.next_id(),
            base_id: template.id.clone(),
            name: template.name.clone(),
            kind: template.kind,
            position,
            area_id: Some(area.id.clone()),
        });
        placed += 1;
    }
    if placed < fill.count {
        tracing::debug!(
            map = %map.id,
            area = %area.id,
            placed,
            requested = fill.count,
            "area fill ran out of attempts"
        );
    }
}

fn pick_weighted<'a>(weights: &'a [WeightedTemplate], rng: &mut dyn RngCore) -> Option<&'a str> {
    let total: u32 = weights.iter().map(|w| w.weight).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.random_range(0..total);
    for w in weights {
        if roll < w.weight {
            return Some(&w.base_id);
        }
        roll -= w.weight;
    }
    None
}

pub(super) fn random_point(area: &Area, rng: &mut dyn RngCore) -> Position {
    let b = area.bounds;
    Position::new(
        b.x + rng.random::<f64>() * b.width,
        b.y + rng.random::<f64>() * b.height,
    )
}
