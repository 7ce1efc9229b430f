//! Read-only static content: items, skills, monsters, factions, maps and
//! node templates. The simulation never mutates these tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::faction::Faction;
use super::inventory::{ItemId, LootEntry};
use super::map::MapDef;
use super::node::NodeTemplate;
use super::npc::CombatStats;
use super::skill::SkillDef;

/// Drops used by HUNT outings when the content bundle names none.
pub const DEFAULT_HUNT_DROPS: [&str; 3] = ["beast-core", "beast-hide", "beast-bone"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub value: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonsterDef {
    pub id: String,
    pub name: String,
    /// Reward multiplier; 1.0 is an ordinary beast.
    pub difficulty: f64,
    pub stats: CombatStats,
    #[serde(default)]
    pub loot: Vec<LootEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentTables {
    pub items: BTreeMap<ItemId, ItemDef>,
    pub skills: BTreeMap<String, SkillDef>,
    pub monsters: BTreeMap<String, MonsterDef>,
    pub factions: BTreeMap<String, Faction>,
    pub maps: BTreeMap<String, MapDef>,
    pub node_templates: BTreeMap<String, NodeTemplate>,
    pub hunt_drop_pool: Vec<ItemId>,
}

impl ContentTables {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn map(&self, id: &str) -> Option<&MapDef> {
        self.maps.get(id)
    }

    pub fn template(&self, id: &str) -> Option<&NodeTemplate> {
        self.node_templates.get(id)
    }

    pub fn skill(&self, id: &str) -> Option<&SkillDef> {
        self.skills.get(id)
    }

    pub fn monster(&self, id: &str) -> Option<&MonsterDef> {
        self.monsters.get(id)
    }

    pub fn faction(&self, id: &str) -> Option<&Faction> {
        self.factions.get(id)
    }

    pub fn item_name(&self, id: &str) -> String {
        self.items
            .get(id)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Case-insensitive item lookup by display name.
    pub fn item_by_name(&self, name: &str) -> Option<&ItemDef> {
        let needle = name.trim().to_lowercase();
        self.items
            .values()
            .find(|i| i.name.to_lowercase() == needle)
    }

    pub fn hunt_drops(&self) -> Vec<ItemId> {
        if self.hunt_drop_pool.is_empty() {
            DEFAULT_HUNT_DROPS.iter().map(|s| s.to_string()).collect()
        } else {
            self.hunt_drop_pool.clone()
        }
    }

    // -- Builder helpers --

    pub fn with_map(mut self, map: MapDef) -> Self {
        self.maps.insert(map.id.clone(), map);
        self
    }

    pub fn with_template(mut self, template: NodeTemplate) -> Self {
        self.node_templates.insert(template.id.clone(), template);
        self
    }

    pub fn with_faction(mut self, faction: Faction) -> Self {
        self.factions.insert(faction.id.clone(), faction);
        self
    }

    pub fn with_skill(mut self, skill: SkillDef) -> Self {
        self.skills.insert(skill.id.clone(), skill);
        self
    }

    pub fn with_monster(mut self, monster: MonsterDef) -> Self {
        self.monsters.insert(monster.id.clone(), monster);
        self
    }

    pub fn with_item(mut self, id: &str, name: &str) -> Self {
        self.items.insert(
            id.to_string(),
            ItemDef {
                id: id.to_string(),
                name: name.to_string(),
                value: 0,
            },
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_partial_bundle_from_json() {
        let json = r#"{
            "items": {"beast-core": {"id": "beast-core", "name": "Beast Core"}},
            "node_templates": {
                "spirit-grass": {
                    "id": "spirit-grass", "name": "Spirit Grass", "kind": "herb",
                    "loot": [{"item_id": "grass", "quantity": [1, 3], "chance": 0.8}],
                    "respawn": [600, 1200]
                },
                "old-chest": {"id": "old-chest", "name": "Old Chest", "kind": "chest", "respawn": 5000}
            }
        }"#;
        let content = ContentTables::from_json_str(json).unwrap();
        assert_eq!(content.item_name("beast-core"), "Beast Core");
        assert_eq!(content.item_name("unknown"), "unknown");
        assert!(content.item_by_name("beast core").is_some());
        assert_eq!(
            content.template("spirit-grass").unwrap().respawn,
            Some(crate::model::node::RespawnTime::Range(600, 1200))
        );
        assert_eq!(
            content.template("old-chest").unwrap().respawn,
            Some(crate::model::node::RespawnTime::Fixed(5000))
        );
        assert_eq!(content.hunt_drops().len(), 3);
    }
}
