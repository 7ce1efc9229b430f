use serde::{Deserialize, Serialize};

use super::faction::FactionMembership;
use super::intent::{Activity, NpcId, NpcPhase};
use super::inventory::{Inventory, ItemId};
use super::map::{MapId, Position};
use super::skill::{Element, WeaponKind};
use super::time::GameTime;

/// Levels inside one realm before a breakthrough to the next realm.
pub const LEVELS_PER_REALM: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcType {
    Cultivator,
    Monster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityTag {
    Aggressive,
    Peaceful,
    Greedy,
    Generous,
    Sociable,
    Reclusive,
    Ambitious,
    Cautious,
    Honorable,
    Cunning,
}

impl PersonalityTag {
    /// +1 when the two tags get along, -1 when they clash, 0 otherwise.
    pub fn compatibility(self, other: PersonalityTag) -> i32 {
        use PersonalityTag::*;
        match (self, other) {
            (Sociable, Sociable) | (Peaceful, Peaceful) | (Honorable, Honorable) => 1,
            (Generous, Greedy) | (Greedy, Generous) => 0,
            (Sociable, Generous) | (Generous, Sociable) => 1,
            (Ambitious, Ambitious) => -1,
            (Aggressive, Peaceful) | (Peaceful, Aggressive) => -1,
            (Aggressive, Aggressive) => -1,
            (Honorable, Cunning) | (Cunning, Honorable) => -1,
            (Reclusive, Sociable) | (Sociable, Reclusive) => -1,
            (Cautious, Peaceful) | (Peaceful, Cautious) => 1,
            _ => 0,
        }
    }
}

/// Sum of pairwise tag compatibility between two personalities.
pub fn personality_compatibility(a: &[PersonalityTag], b: &[PersonalityTag]) -> i32 {
    a.iter()
        .flat_map(|x| b.iter().map(move |y| x.compatibility(*y)))
        .sum()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cultivation {
    pub realm_index: u32,
    pub level: u32,
    /// Accumulated qi toward the next level.
    #[serde(default)]
    pub qi: f64,
    /// Accumulated insight ("cảm ngộ").
    #[serde(default)]
    pub cam_ngo: u32,
}

impl Cultivation {
    pub fn new(realm_index: u32, level: u32) -> Self {
        Self {
            realm_index,
            level: level.max(1),
            qi: 0.0,
            cam_ngo: 0,
        }
    }

    /// Single comparable strength figure: realm dominates level.
    pub fn power_rank(&self) -> u32 {
        self.realm_index * LEVELS_PER_REALM + self.level
    }

    /// Qi needed to leave the current level.
    pub fn qi_capacity(&self) -> f64 {
        100.0 * 2f64.powi(self.realm_index as i32) * (1.0 + self.level as f64 * 0.25)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    pub max_hp: u32,
    pub hp: u32,
    pub max_mana: u32,
    pub mana: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub crit_rate: f64,
    pub evasion: f64,
}

impl CombatStats {
    /// Baseline stats for a cultivator at a realm and level.
    pub fn for_cultivation(c: &Cultivation) -> Self {
        let tier = 1.0 + c.realm_index as f64 * 0.8 + c.level as f64 * 0.1;
        let max_hp = (100.0 * tier).round() as u32;
        let max_mana = (50.0 * tier).round() as u32;
        Self {
            max_hp,
            hp: max_hp,
            max_mana,
            mana: max_mana,
            attack: (12.0 * tier).round() as u32,
            defense: (6.0 * tier).round() as u32,
            speed: (10.0 * tier).round() as u32,
            crit_rate: 0.05 + c.realm_index as f64 * 0.01,
            evasion: 0.05 + c.realm_index as f64 * 0.005,
        }
    }

    pub fn is_down(&self) -> bool {
        self.hp == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Npc {
    pub id: NpcId,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    pub npc_type: NpcType,
    /// Monster table entry for monster-type NPCs.
    #[serde(default)]
    pub monster_id: Option<String>,
    #[serde(default)]
    pub faction: Option<FactionMembership>,
    #[serde(default)]
    pub personality: Vec<PersonalityTag>,
    pub cultivation: Cultivation,
    pub stats: CombatStats,
    #[serde(default)]
    pub linh_can: Vec<Element>,
    #[serde(default)]
    pub weapon: Option<WeaponKind>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub equipment: Vec<ItemId>,
    #[serde(default)]
    pub linh_thach: u64,
    /// Fortune ("cơ duyên"); boosts hunting and trading yields.
    #[serde(default)]
    pub co_duyen: u32,
    pub home_map: MapId,
    /// Where the NPC settles on its home map; the map's spawn point when unset.
    #[serde(default)]
    pub home_position: Option<Position>,
    pub current_map: MapId,
    pub position: Position,
    #[serde(default)]
    pub activity: Activity,
    #[serde(default)]
    pub cannot_act_until: Option<GameTime>,
    /// Set when the player spares this NPC; blocks re-challenging.
    #[serde(default)]
    pub challenge_cooldown_until: Option<GameTime>,
}

impl Npc {
    pub fn is_cultivator(&self) -> bool {
        self.npc_type == NpcType::Cultivator
    }

    pub fn display_name(&self) -> String {
        match &self.title {
            Some(title) => format!("{title} {}", self.name),
            None => self.name.clone(),
        }
    }

    pub fn phase(&self, now: GameTime) -> NpcPhase {
        match &self.activity {
            Activity::Traveling { .. } => NpcPhase::Traveling,
            Activity::Dwelling { .. } => NpcPhase::Dwelling,
            Activity::Idle => match self.cannot_act_until {
                Some(until) if now < until => NpcPhase::Resting,
                _ => NpcPhase::Idle,
            },
        }
    }

    /// Re-derive combat stats after a cultivation change, keeping the
    /// current HP/mana fraction.
    pub fn refresh_stats(&mut self) {
        let hp_frac = self.stats.hp as f64 / self.stats.max_hp.max(1) as f64;
        let mana_frac = self.stats.mana as f64 / self.stats.max_mana.max(1) as f64;
        let mut fresh = CombatStats::for_cultivation(&self.cultivation);
        fresh.hp = ((fresh.max_hp as f64 * hp_frac).round() as u32).max(1);
        fresh.mana = (fresh.max_mana as f64 * mana_frac).round() as u32;
        self.stats = fresh;
    }
}
