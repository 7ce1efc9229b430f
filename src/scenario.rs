use std::sync::Arc;

use crate::config::SimConfig;
use crate::model::time::MINUTES_PER_MONTH;
use crate::model::*;
use crate::sim::Orchestrator;
use crate::worldgen;

/// Seed used for node and NPC population in [`Scenario::build`].
const POPULATION_SEED: u64 = 7;

// -- Builder-style ref type --

/// Typed reference to an NPC in a [`Scenario`], enabling chained field mutation.
///
/// Created by [`Scenario::cultivator`], [`Scenario::monster`] or
/// [`Scenario::npc_mut`]. Call [`.id()`](NpcRef::id) to terminate the chain
/// and extract the NPC id.
pub struct NpcRef<'a> {
    scenario: &'a mut Scenario,
    id: NpcId,
}

impl<'a> NpcRef<'a> {
    /// Escape hatch: apply an arbitrary closure to the NPC record.
    pub fn with(mut self, f: impl FnOnce(&mut Npc)) -> Self {
        if let Some(npc) = self.scenario.world.npc_mut(self.id) {
            f(npc);
        }
        self
    }

    /// Place the NPC on `map_id` at that map's spawn point. Its home map is
    /// left alone.
    pub fn on_map(self, map_id: &str) -> Self {
        let spawn = self.scenario.content.map(map_id).map(|m| m.spawn_point);
        self.with(|n| {
            n.current_map = map_id.to_string();
            if let Some(spawn) = spawn {
                n.position = spawn;
            }
        })
    }

    pub fn at(self, position: Position) -> Self { self.with(|n| n.position = position) }
    pub fn home(self, map_id: &str) -> Self { self.with(|n| n.home_map = map_id.to_string()) }
    pub fn home_position(self, p: Position) -> Self { self.with(|n| n.home_position = Some(p)) }
    pub fn co_duyen(self, v: u32) -> Self { self.with(|n| n.co_duyen = v) }
    pub fn linh_thach(self, v: u64) -> Self { self.with(|n| n.linh_thach = v) }
    pub fn title(self, v: &str) -> Self { self.with(|n| n.title = Some(v.to_string())) }
    pub fn personality(self, v: Vec<PersonalityTag>) -> Self { self.with(|n| n.personality = v) }
    pub fn linh_can(self, v: Vec<Element>) -> Self { self.with(|n| n.linh_can = v) }
    pub fn weapon(self, v: WeaponKind) -> Self { self.with(|n| n.weapon = Some(v)) }
    pub fn skills(self, v: &[&str]) -> Self {
        self.with(|n| n.skills = v.iter().map(|s| s.to_string()).collect())
    }

    /// Set realm and level and re-derive full-health combat stats.
    pub fn realm(self, realm_index: u32, level: u32) -> Self {
        self.with(|n| {
            n.cultivation = Cultivation::new(realm_index, level);
            n.stats = CombatStats::for_cultivation(&n.cultivation);
        })
    }

    pub fn member(self, faction_id: &str, role: &str, power: u32) -> Self {
        self.with(|n| {
            n.faction = Some(FactionMembership {
                faction_id: faction_id.to_string(),
                role: role.to_string(),
                power,
            })
        })
    }

    pub fn item(self, item_id: &str, quantity: u32) -> Self {
        self.with(|n| {
            n.inventory.add(item_id, quantity);
        })
    }

    pub fn equip(self, item_id: &str) -> Self { self.with(|n| n.equipment.push(item_id.to_string())) }

    /// Terminate the chain and return the NPC id.
    pub fn id(self) -> NpcId { self.id }
}

/// Declarative world builder.
///
/// Used by tests for deterministic setup: add NPCs through the typed refs,
/// then [`build`](Scenario::build) populates resource nodes for every map in
/// the content tables and rebuilds the per-map NPC index.
pub struct Scenario {
    world: World,
    content: ContentTables,
}

impl Scenario {
    /// A single empty map named `valley` with the player on it.
    pub fn new() -> Self {
        let content = ContentTables::default().with_map(bare_map("valley", "Quiet Valley"));
        Self::with_content(content, "valley")
    }

    /// Two connected maps with a sect, hunting and gathering grounds. See
    /// [`standard_content`].
    pub fn standard() -> Self {
        Self::with_content(standard_content(), "valley")
    }

    pub fn with_content(content: ContentTables, start_map: &str) -> Self {
        let spawn = content.map(start_map).map(|m| m.spawn_point).unwrap_or_default();
        let world = World::new(Player::new("Wanderer", start_map, spawn), GameTime::default());
        Self { world, content }
    }

    pub fn content_mut(&mut self) -> &mut ContentTables {
        &mut self.content
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.world.player
    }

    /// Add a realm 1 cultivator living on `valley`.
    pub fn cultivator(&mut self, name: &str) -> NpcRef<'_> {
        let cultivation = Cultivation::new(1, 1);
        let spawn = self.content.map("valley").map(|m| m.spawn_point).unwrap_or_default();
        let npc = Npc {
            id: 0,
            name: name.to_string(),
            title: None,
            npc_type: NpcType::Cultivator,
            monster_id: None,
            faction: None,
            personality: Vec::new(),
            stats: CombatStats::for_cultivation(&cultivation),
            cultivation,
            linh_can: Vec::new(),
            weapon: None,
            skills: Vec::new(),
            inventory: Inventory::unbounded(),
            equipment: Vec::new(),
            linh_thach: 0,
            co_duyen: 0,
            home_map: "valley".into(),
            home_position: None,
            current_map: "valley".into(),
            position: spawn,
            activity: Activity::Idle,
            cannot_act_until: None,
            challenge_cooldown_until: None,
        };
        let id = self.world.add_npc(npc);
        NpcRef { scenario: self, id }
    }

    /// Add a monster from the monster table on `valley`.
    pub fn monster(&mut self, monster_id: &str) -> NpcRef<'_> {
        let (name, stats) = match self.content.monster(monster_id) {
            Some(def) => (def.name.clone(), def.stats.clone()),
            None => {
                tracing::warn!(monster_id = %monster_id, "scenario monster missing from content");
                (monster_id.to_string(), CombatStats::for_cultivation(&Cultivation::new(0, 1)))
            }
        };
        let id = self
            .cultivator(&name)
            .with(|n| {
                n.npc_type = NpcType::Monster;
                n.monster_id = Some(monster_id.to_string());
                n.cultivation = Cultivation::new(0, 1);
                n.stats = stats;
            })
            .id();
        NpcRef { scenario: self, id }
    }

    pub fn npc_mut(&mut self, id: NpcId) -> NpcRef<'_> {
        NpcRef { scenario: self, id }
    }

    pub fn build(self) -> World {
        self.build_with_content().0
    }

    pub fn build_with_content(mut self) -> (World, ContentTables) {
        self.world.rebuild_map_index();
        worldgen::populate_world(&mut self.world, &self.content, POPULATION_SEED);
        (self.world, self.content)
    }

    /// Build, then run `months` one-month steps with the default systems.
    pub fn run(self, months: u32, seed: u64) -> World {
        let (mut world, content) = self.build_with_content();
        let mut orchestrator = Orchestrator::new(Arc::new(content), SimConfig::with_seed(seed));
        for _ in 0..months {
            orchestrator.step(&mut world, MINUTES_PER_MONTH);
        }
        world
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

// -- Standard content --

fn bare_map(id: &str, name: &str) -> MapDef {
    MapDef {
        id: id.into(),
        name: name.into(),
        neighbors: vec![],
        pois: vec![],
        areas: vec![],
        gates: vec![],
        node_spawns: vec![],
        spawn_point: Position::new(250.0, 250.0),
        resident_npcs: vec![],
        npc_rules: vec![],
    }
}

fn poi(id: &str, name: &str, kind: PoiKind, x: f64, y: f64, half: f64) -> Poi {
    Poi {
        id: id.into(),
        name: name.into(),
        kind,
        position: Position::new(x, y),
        bounds: Rect::new(x - half, y - half, half * 2.0, half * 2.0),
        connects_to: None,
    }
}

fn exit(id: &str, name: &str, to: &str, x: f64, y: f64) -> Poi {
    Poi {
        connects_to: Some(to.into()),
        ..poi(id, name, PoiKind::Exit, x, y, 10.0)
    }
}

fn area(id: &str, name: &str, kind: AreaKind, bounds: Rect) -> Area {
    Area {
        id: id.into(),
        name: name.into(),
        kind,
        bounds,
        fill: None,
    }
}

fn spawn(base_id: &str, x: f64, y: f64, area_id: Option<&str>) -> ManualSpawn {
    ManualSpawn {
        base_id: base_id.into(),
        position: Position::new(x, y),
        area_id: area_id.map(str::to_string),
    }
}

fn role(name: &str, power: u32, fixed_position_chance: f64) -> FactionRole {
    FactionRole {
        name: name.into(),
        power,
        fixed_position_chance,
    }
}

/// Content shared by most tests.
///
/// * `valley`: the Azure Cloud Sect, a market, a teahouse, the
///   `spirit-field` herb field (three manual `spirit-grass` nodes), the
///   `dark-woods` hunting ground and two farm plots.
/// * `peak`: a meditation cave, an arena and the `jade-mine` (four
///   procedural `iron-ore` nodes).
///
/// The two maps are joined by an exit on each side.
pub fn standard_content() -> ContentTables {
    let valley = MapDef {
        neighbors: vec!["peak".into()],
        pois: vec![
            poi("azure-sect", "Azure Cloud Sect", PoiKind::Sect, 100.0, 100.0, 40.0),
            poi("valley-market", "Valley Market", PoiKind::Market, 400.0, 100.0, 30.0),
            poi("jade-teahouse", "Jade Teahouse", PoiKind::Teahouse, 400.0, 200.0, 20.0),
            exit("valley-pass", "Mountain Pass", "peak", 490.0, 250.0),
        ],
        areas: vec![
            area("spirit-field", "Spirit Field", AreaKind::HerbField, Rect::new(50.0, 300.0, 150.0, 150.0)),
            area("dark-woods", "Dark Woods", AreaKind::HuntingGround, Rect::new(300.0, 300.0, 150.0, 150.0)),
        ],
        node_spawns: vec![
            spawn("spirit-grass", 80.0, 330.0, Some("spirit-field")),
            spawn("spirit-grass", 120.0, 380.0, Some("spirit-field")),
            spawn("spirit-grass", 160.0, 420.0, Some("spirit-field")),
            spawn("farm-plot", 240.0, 470.0, None),
            spawn("farm-plot", 270.0, 470.0, None),
        ],
        ..bare_map("valley", "Azure Valley")
    };

    let peak = MapDef {
        neighbors: vec!["valley".into()],
        pois: vec![
            poi("cloud-cave", "Cloud Cave", PoiKind::Cave, 100.0, 100.0, 20.0),
            poi("peak-arena", "Summit Arena", PoiKind::Arena, 250.0, 100.0, 30.0),
            exit("mountain-path", "Mountain Path", "valley", 10.0, 250.0),
        ],
        areas: vec![Area {
            fill: Some(AreaFill {
                count: 4,
                weights: vec![WeightedTemplate { base_id: "iron-ore".into(), weight: 1 }],
            }),
            ..area("jade-mine", "Jade Mine", AreaKind::Mine, Rect::new(300.0, 300.0, 150.0, 150.0))
        }],
        ..bare_map("peak", "Cloud Peak")
    };

    let shadow_wolf = MonsterDef {
        id: "shadow-wolf".into(),
        name: "Shadow Wolf".into(),
        difficulty: 1.2,
        stats: CombatStats {
            max_hp: 80,
            hp: 80,
            max_mana: 0,
            mana: 0,
            attack: 14,
            defense: 5,
            speed: 12,
            crit_rate: 0.05,
            evasion: 0.05,
        },
        loot: vec![
            LootEntry::new("beast-core", 1, 1, 0.8),
            LootEntry::new("beast-hide", 1, 2, 1.0),
        ],
    };

    ContentTables::default()
        .with_map(valley)
        .with_map(peak)
        .with_template(NodeTemplate {
            id: "spirit-grass".into(),
            name: "Spirit Grass".into(),
            kind: NodeKind::Herb,
            loot: vec![LootEntry::new("spirit-grass", 2, 2, 1.0)],
            respawn: Some(RespawnTime::Range(2880, 4320)),
        })
        .with_template(NodeTemplate {
            id: "iron-ore".into(),
            name: "Iron Ore Vein".into(),
            kind: NodeKind::Stone,
            loot: vec![LootEntry::new("iron-ore", 1, 3, 1.0)],
            respawn: Some(RespawnTime::Fixed(10080)),
        })
        .with_template(NodeTemplate {
            id: "farm-plot".into(),
            name: "Farm Plot".into(),
            kind: NodeKind::Farmland,
            loot: vec![],
            respawn: None,
        })
        .with_item("spirit-grass", "Spirit Grass")
        .with_item("iron-ore", "Iron Ore")
        .with_item("beast-core", "Beast Core")
        .with_item("beast-hide", "Beast Hide")
        .with_item("beast-bone", "Beast Bone")
        .with_item("jade-rice", "Jade Rice")
        .with_faction(Faction {
            id: "azure-sect".into(),
            name: "Azure Cloud Sect".into(),
            roles: vec![
                role("Leader", 100, 0.8),
                role("Elder", 60, 0.3),
                role("Disciple", 20, 0.0),
            ],
        })
        .with_monster(shadow_wolf)
        .with_skill(SkillDef {
            id: "flame-palm".into(),
            name: "Flame Palm".into(),
            mana_cost: 10,
            base_damage: 8,
            attack_scaling: 1.0,
            element: Some(Element::Fire),
            weapon: None,
            effects: vec![SkillEffect {
                kind: EffectKind::Burn { damage: 3, turns: 2 },
                chance: 0.3,
            }],
        })
        .with_skill(SkillDef {
            id: "sword-qi".into(),
            name: "Sword Qi Slash".into(),
            mana_cost: 8,
            base_damage: 10,
            attack_scaling: 1.1,
            element: None,
            weapon: Some(WeaponKind::Sword),
            effects: vec![],
        })
        .with_skill(SkillDef {
            id: "healing-breath".into(),
            name: "Healing Breath".into(),
            mana_cost: 12,
            base_damage: 0,
            attack_scaling: 0.0,
            element: Some(Element::Wood),
            weapon: None,
            effects: vec![SkillEffect {
                kind: EffectKind::Heal { flat: 20, scaling: Some((StatKind::MaxHp, 0.05)) },
                chance: 1.0,
            }],
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_maps_connect_both_ways() {
        let content = standard_content();
        let valley = content.map("valley").unwrap();
        let peak = content.map("peak").unwrap();
        assert!(valley.exit_to("peak").is_some());
        assert!(peak.exit_to("valley").is_some());
    }

    #[test]
    fn build_populates_nodes_and_indexes_npcs() {
        let mut s = Scenario::standard();
        let a = s.cultivator("Lin Feng").id();
        let b = s.cultivator("Wei Lan").on_map("peak").id();
        let world = s.build();
        assert_eq!(world.npcs_on_map("valley"), &[a]);
        assert_eq!(world.npcs_on_map("peak"), &[b]);
        assert_eq!(
            world.nodes.visible_in_area("valley", "spirit-field", NodeKind::Herb).len(),
            3
        );
        assert_eq!(world.nodes.visible_in_area("peak", "jade-mine", NodeKind::Stone).len(), 4);
    }

    #[test]
    fn monsters_take_table_stats() {
        let mut s = Scenario::standard();
        let wolf = s.monster("shadow-wolf").on_map("valley").id();
        let world = s.build();
        let npc = world.npc(wolf).unwrap();
        assert_eq!(npc.npc_type, NpcType::Monster);
        assert_eq!(npc.stats.max_hp, 80);
        assert_eq!(npc.name, "Shadow Wolf");
    }

    #[test]
    fn run_advances_the_clock_by_whole_months() {
        let mut s = Scenario::standard();
        s.cultivator("Lin Feng");
        let world = s.run(3, 11);
        assert_eq!(world.current_time, GameTime::default().advance_months(3));
    }
}
