use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::model::{ContentTables, MapId, PathStep, Position};

/// Shortest chain of map ids from `start` to `goal` over neighbor, exit
/// and gate edges, both ends included. `None` when unreachable or when
/// either map is unknown.
pub fn map_route(content: &ContentTables, start: &str, goal: &str) -> Option<Vec<MapId>> {
    content.map(start)?;
    content.map(goal)?;
    if start == goal {
        return Some(vec![start.to_string()]);
    }
    let mut visited = BTreeSet::new();
    visited.insert(start.to_string());
    let mut came_from: BTreeMap<MapId, MapId> = BTreeMap::new();
    let mut queue: VecDeque<MapId> = VecDeque::new();
    queue.push_back(start.to_string());

    while let Some(current) = queue.pop_front() {
        let Some(map) = content.map(&current) else {
            continue;
        };
        for adj in map.adjacent_maps() {
            if !visited.insert(adj.to_string()) {
                continue;
            }
            came_from.insert(adj.to_string(), current.clone());
            if adj == goal {
                let mut route = vec![adj.to_string()];
                let mut cursor = adj.to_string();
                while let Some(prev) = came_from.get(&cursor) {
                    route.push(prev.clone());
                    cursor = prev.clone();
                }
                route.reverse();
                return Some(route);
            }
            queue.push_back(adj.to_string());
        }
    }
    None
}

/// Build the hop list for walking from `from_map` to `target` on `to_map`.
///
/// Each hop but the last targets the exit on its map leading to the next
/// map. A neighbor edge with no exit POI or gate makes the whole path
/// unusable and yields `None`.
pub fn build_path(
    content: &ContentTables,
    from_map: &str,
    to_map: &str,
    target: Position,
) -> Option<Vec<PathStep>> {
    let Some(route) = map_route(content, from_map, to_map) else {
        tracing::warn!(from_map, to_map, "no map route");
        return None;
    };

    let mut steps = Vec::with_capacity(route.len());
    for pair in route.windows(2) {
        let (here, next) = (&pair[0], &pair[1]);
        let Some(exit) = content.map(here).and_then(|m| m.exit_to(next)) else {
            tracing::warn!(map = %here, next = %next, "neighbor edge has no exit, abandoning path");
            return None;
        };
        steps.push(PathStep {
            map_id: here.clone(),
            target_position: exit,
        });
    }
    steps.push(PathStep {
        map_id: to_map.to_string(),
        target_position: target,
    });
    Some(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gate;
    use crate::scenario::standard_content;

    #[test]
    fn same_map_route_is_a_single_hop() {
        let content = standard_content();
        let path = build_path(&content, "valley", "valley", Position::new(1.0, 2.0)).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].target_position, Position::new(1.0, 2.0));
    }

    #[test]
    fn cross_map_path_ends_each_hop_at_an_exit() {
        let content = standard_content();
        let exit = content.map("valley").unwrap().exit_to("peak").unwrap();
        let path = build_path(&content, "valley", "peak", Position::new(10.0, 10.0)).unwrap();
        assert_eq!(
            path,
            vec![
                PathStep { map_id: "valley".into(), target_position: exit },
                PathStep { map_id: "peak".into(), target_position: Position::new(10.0, 10.0) },
            ]
        );
    }

    #[test]
    fn missing_exit_abandons_the_path() {
        let mut content = standard_content();
        if let Some(valley) = content.maps.get_mut("valley") {
            valley.pois.retain(|p| p.connects_to.is_none());
            valley.gates.clear();
        }
        assert!(map_route(&content, "valley", "peak").is_some());
        assert!(build_path(&content, "valley", "peak", Position::default()).is_none());
    }

    #[test]
    fn gate_alone_connects_maps() {
        let mut content = standard_content();
        let gate_at = Position::new(40.0, 40.0);
        if let Some(valley) = content.maps.get_mut("valley") {
            valley.neighbors.clear();
            valley.pois.retain(|p| p.connects_to.is_none());
            valley.gates = vec![Gate {
                id: "jade-gate".into(),
                position: gate_at,
                target_map: "peak".into(),
            }];
        }
        assert_eq!(
            map_route(&content, "valley", "peak"),
            Some(vec!["valley".to_string(), "peak".to_string()])
        );
        let path = build_path(&content, "valley", "peak", Position::new(10.0, 10.0)).unwrap();
        assert_eq!(path[0], PathStep { map_id: "valley".into(), target_position: gate_at });
    }

    #[test]
    fn exit_poi_alone_connects_maps() {
        let mut content = standard_content();
        if let Some(valley) = content.maps.get_mut("valley") {
            valley.neighbors.clear();
            valley.gates.clear();
        }
        assert!(content.map("valley").unwrap().exit_to("peak").is_some());
        assert_eq!(map_route(&content, "valley", "peak").map(|r| r.len()), Some(2));
    }

    #[test]
    fn unknown_map_has_no_route() {
        let content = standard_content();
        assert!(map_route(&content, "valley", "nowhere").is_none());
    }
}
