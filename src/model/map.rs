//! Static map content: points of interest, areas, gates and the
//! map-connectivity graph. Read-only at runtime.

use serde::{Deserialize, Serialize};

use super::npc::Npc;

pub type MapId = String;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Position) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Move `distance` units along the straight line towards `target`.
    /// Overshooting is clamped to `target`.
    pub fn step_towards(self, target: Position, distance: f64) -> Position {
        let total = self.distance_to(target);
        if total <= f64::EPSILON || distance >= total {
            return target;
        }
        let t = distance / total;
        Position {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
        }
    }
}

/// Axis-aligned bounding box, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiKind {
    Sect,
    City,
    Market,
    Cave,
    Arena,
    Teahouse,
    Landmark,
    /// Map exit; `connects_to` names the neighbouring map.
    Exit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poi {
    pub id: String,
    pub name: String,
    pub kind: PoiKind,
    pub position: Position,
    /// Footprint used to keep procedural spawns off the POI.
    pub bounds: Rect,
    #[serde(default)]
    pub connects_to: Option<MapId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaKind {
    HerbField,
    Mine,
    HuntingGround,
    Wilderness,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedTemplate {
    pub base_id: String,
    pub weight: u32,
}

/// Procedural fill rule: `count` nodes drawn from `weights`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaFill {
    pub count: u32,
    pub weights: Vec<WeightedTemplate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub name: String,
    pub kind: AreaKind,
    pub bounds: Rect,
    #[serde(default)]
    pub fill: Option<AreaFill>,
}

/// Teleport gate: a graph edge to another map that is not a walkable exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    pub id: String,
    pub position: Position,
    pub target_map: MapId,
}

/// Fixed-position node spawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualSpawn {
    pub base_id: String,
    pub position: Position,
    #[serde(default)]
    pub area_id: Option<String>,
}

/// Procedural NPC population rule. A rule with `monster_id` spawns
/// monsters from the monster table; otherwise it spawns cultivators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcSpawnRule {
    pub count: u32,
    /// Inclusive realm range for spawned NPCs.
    #[serde(default)]
    pub realm_range: (u32, u32),
    #[serde(default)]
    pub faction_id: Option<String>,
    /// Faction role to assign; the faction's lowest role when unset.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub monster_id: Option<String>,
    /// Area to scatter spawns over; the map's spawn point when unset.
    #[serde(default)]
    pub area_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDef {
    pub id: MapId,
    pub name: String,
    /// Declared one-hop edges. Exit POIs and gates add edges of their own;
    /// see [`MapDef::adjacent_maps`]. An edge listed here but with no exit
    /// POI or gate on this map cannot actually be travelled.
    #[serde(default)]
    pub neighbors: Vec<MapId>,
    #[serde(default)]
    pub pois: Vec<Poi>,
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub gates: Vec<Gate>,
    #[serde(default)]
    pub node_spawns: Vec<ManualSpawn>,
    #[serde(default)]
    pub spawn_point: Position,
    /// Fixed NPC records placed on this map when the world is populated.
    #[serde(default)]
    pub resident_npcs: Vec<Npc>,
    #[serde(default)]
    pub npc_rules: Vec<NpcSpawnRule>,
}

impl MapDef {
    pub fn poi(&self, id: &str) -> Option<&Poi> {
        self.pois.iter().find(|p| p.id == id)
    }

    pub fn area(&self, id: &str) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == id)
    }

    pub fn pois_of_kind(&self, kind: PoiKind) -> impl Iterator<Item = &Poi> {
        self.pois.iter().filter(move |p| p.kind == kind)
    }

    pub fn areas_of_kind(&self, kind: AreaKind) -> impl Iterator<Item = &Area> {
        self.areas.iter().filter(move |a| a.kind == kind)
    }

    /// Every map one hop away: declared neighbors, then exit POI targets,
    /// then gate targets, without duplicates.
    pub fn adjacent_maps(&self) -> Vec<&str> {
        let mut adjacent: Vec<&str> = Vec::new();
        let edges = self
            .neighbors
            .iter()
            .map(String::as_str)
            .chain(self.pois.iter().filter_map(|p| p.connects_to.as_deref()))
            .chain(self.gates.iter().map(|g| g.target_map.as_str()));
        for id in edges {
            if id != self.id && !adjacent.contains(&id) {
                adjacent.push(id);
            }
        }
        adjacent
    }

    /// Position of the exit POI or gate on this map that leads to `target`.
    pub fn exit_to(&self, target: &str) -> Option<Position> {
        self.pois
            .iter()
            .find(|p| p.connects_to.as_deref() == Some(target))
            .map(|p| p.position)
            .or_else(|| {
                self.gates
                    .iter()
                    .find(|g| g.target_map == target)
                    .map(|g| g.position)
            })
    }

    /// Where a traveller coming from `source` appears on this map: the
    /// connection back to `source` when there is one, else the spawn point.
    pub fn entry_from(&self, source: &str) -> Position {
        self.exit_to(source).unwrap_or(self.spawn_point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_towards_interpolates_and_clamps() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(100.0, 0.0);
        assert_eq!(a.step_towards(b, 50.0), Position::new(50.0, 0.0));
        assert_eq!(a.step_towards(b, 500.0), b);
        assert_eq!(b.step_towards(b, 1.0), b);
    }

    #[test]
    fn rect_contains_edges() {
        let r = Rect::new(10.0, 10.0, 20.0, 5.0);
        assert!(r.contains(Position::new(10.0, 10.0)));
        assert!(r.contains(Position::new(30.0, 15.0)));
        assert!(!r.contains(Position::new(31.0, 12.0)));
        assert_eq!(r.center(), Position::new(20.0, 12.5));
    }

    #[test]
    fn exit_prefers_poi_then_gate() {
        let map = MapDef {
            id: "a".into(),
            name: "A".into(),
            neighbors: vec!["b".into(), "c".into()],
            pois: vec![Poi {
                id: "exit-b".into(),
                name: "Road to B".into(),
                kind: PoiKind::Exit,
                position: Position::new(5.0, 5.0),
                bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
                connects_to: Some("b".into()),
            }],
            gates: vec![Gate {
                id: "gate-c".into(),
                position: Position::new(90.0, 90.0),
                target_map: "c".into(),
            }],
            areas: vec![],
            node_spawns: vec![],
            spawn_point: Position::new(50.0, 50.0),
            resident_npcs: vec![],
            npc_rules: vec![],
        };
        assert_eq!(map.exit_to("b"), Some(Position::new(5.0, 5.0)));
        assert_eq!(map.exit_to("c"), Some(Position::new(90.0, 90.0)));
        assert_eq!(map.exit_to("d"), None);
        assert_eq!(map.entry_from("d"), Position::new(50.0, 50.0));
    }
}
