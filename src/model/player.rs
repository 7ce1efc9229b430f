use serde::{Deserialize, Serialize};

use super::inventory::Inventory;
use super::map::{MapId, Position};
use super::npc::{CombatStats, Cultivation};
use super::skill::{Element, WeaponKind};

pub const DEFAULT_PLAYER_SLOTS: usize = 40;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub cultivation: Cultivation,
    pub stats: CombatStats,
    #[serde(default)]
    pub linh_can: Vec<Element>,
    #[serde(default)]
    pub weapon: Option<WeaponKind>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub inventory: Inventory,
    #[serde(default)]
    pub linh_thach: u64,
    pub current_map: MapId,
    pub position: Position,
}

impl Player {
    pub fn new(name: &str, map_id: &str, position: Position) -> Self {
        let cultivation = Cultivation::new(0, 1);
        Self {
            name: name.to_string(),
            stats: CombatStats::for_cultivation(&cultivation),
            cultivation,
            linh_can: Vec::new(),
            weapon: None,
            skills: Vec::new(),
            inventory: Inventory::with_capacity(DEFAULT_PLAYER_SLOTS),
            linh_thach: 0,
            current_map: map_id.to_string(),
            position,
        }
    }
}
