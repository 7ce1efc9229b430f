use serde::{Deserialize, Serialize};

use crate::model::{
    CombatStats, Cultivation, Element, Npc, NpcId, NpcType, PersonalityTag, Player, StatKind,
    WeaponKind,
};
use crate::narrative::DefeatDecision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Npc,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Npc,
            Side::Npc => Side::Player,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusKind {
    Burn { damage: u32 },
    Stun,
    Debuff { stat: StatKind, amount: u32 },
}

impl StatusKind {
    /// Effects in the same slot replace each other instead of stacking.
    fn same_slot(&self, other: &StatusKind) -> bool {
        match (self, other) {
            (StatusKind::Burn { .. }, StatusKind::Burn { .. }) => true,
            (StatusKind::Stun, StatusKind::Stun) => true,
            (StatusKind::Debuff { stat: a, .. }, StatusKind::Debuff { stat: b, .. }) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: StatusKind,
    pub turns_left: u32,
}

/// A fighter's combat snapshot. Combat works on copies; results are
/// written back to the world only when the fight is settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    pub cultivation: Cultivation,
    pub stats: CombatStats,
    pub linh_can: Vec<Element>,
    pub weapon: Option<WeaponKind>,
    pub skills: Vec<String>,
    pub effects: Vec<ActiveEffect>,
}

impl Combatant {
    pub fn from_player(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            cultivation: player.cultivation.clone(),
            stats: player.stats.clone(),
            linh_can: player.linh_can.clone(),
            weapon: player.weapon,
            skills: player.skills.clone(),
            effects: Vec::new(),
        }
    }

    pub fn from_npc(npc: &Npc) -> Self {
        Self {
            name: npc.display_name(),
            cultivation: npc.cultivation.clone(),
            stats: npc.stats.clone(),
            linh_can: npc.linh_can.clone(),
            weapon: npc.weapon,
            skills: npc.skills.clone(),
            effects: Vec::new(),
        }
    }

    pub fn hp_fraction(&self) -> f64 {
        if self.stats.max_hp == 0 {
            return 0.0;
        }
        self.stats.hp as f64 / self.stats.max_hp as f64
    }

    pub fn is_down(&self) -> bool {
        self.stats.is_down()
    }

    pub fn is_stunned(&self) -> bool {
        self.effects
            .iter()
            .any(|e| e.kind == StatusKind::Stun && e.turns_left > 0)
    }

    fn base_stat(&self, stat: StatKind) -> u32 {
        match stat {
            StatKind::Attack => self.stats.attack,
            StatKind::Defense => self.stats.defense,
            StatKind::Speed => self.stats.speed,
            StatKind::MaxHp => self.stats.max_hp,
            StatKind::MaxMana => self.stats.max_mana,
        }
    }

    /// Stat value after active debuffs.
    pub fn effective(&self, stat: StatKind) -> u32 {
        let penalty: u32 = self
            .effects
            .iter()
            .filter_map(|e| match e.kind {
                StatusKind::Debuff { stat: s, amount } if s == stat => Some(amount),
                _ => None,
            })
            .sum();
        self.base_stat(stat).saturating_sub(penalty)
    }

    pub fn apply_effect(&mut self, kind: StatusKind, turns: u32) {
        if turns == 0 {
            return;
        }
        self.effects.retain(|e| !e.kind.same_slot(&kind));
        self.effects.push(ActiveEffect {
            kind,
            turns_left: turns,
        });
    }

    pub(super) fn burn_damage(&self) -> u32 {
        self.effects
            .iter()
            .map(|e| match e.kind {
                StatusKind::Burn { damage } => damage,
                _ => 0,
            })
            .sum()
    }

    /// Count down every effect by one turn and drop the expired ones.
    pub(super) fn tick_effects(&mut self) {
        for e in &mut self.effects {
            e.turns_left = e.turns_left.saturating_sub(1);
        }
        self.effects.retain(|e| e.turns_left > 0);
    }

    pub(super) fn take_damage(&mut self, amount: u32) {
        self.stats.hp = self.stats.hp.saturating_sub(amount);
    }

    pub(super) fn heal(&mut self, amount: u32) {
        self.stats.hp = (self.stats.hp + amount).min(self.stats.max_hp);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "skill_id", rename_all = "snake_case")]
pub enum CombatAction {
    Attack,
    Skill(String),
}

/// One player-versus-NPC fight.
///
/// Created by [`super::challenge`], advanced turn by turn, and consumed by
/// one of the settle functions once it has ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatState {
    pub npc_id: NpcId,
    pub npc_type: NpcType,
    pub npc_personality: Vec<PersonalityTag>,
    /// Reward multiplier; monster table difficulty, 1.0 for cultivators.
    pub difficulty: f64,
    pub player: Combatant,
    pub npc: Combatant,
    /// Turns taken so far, counting both sides.
    pub turn: u32,
    pub max_turns: u32,
    pub is_player_turn: bool,
    pub log: Vec<String>,
    pub ended: bool,
    pub winner: Option<Side>,
    pub fled: bool,
    /// Damage dealt by the most recent hit, for display.
    pub last_damage: Option<(Side, u32)>,
    pub npc_decision: Option<DefeatDecision>,
    pub cam_ngo_gained: Option<u32>,
}

impl CombatState {
    pub fn new(player: Combatant, npc: &Npc, difficulty: f64, max_turns: u32) -> Self {
        let opponent = Combatant::from_npc(npc);
        let is_player_turn = player.stats.speed >= opponent.stats.speed;
        let opener = if is_player_turn { &player.name } else { &opponent.name };
        let log = vec![format!(
            "{} faces {}. {} moves first.",
            player.name, opponent.name, opener
        )];
        Self {
            npc_id: npc.id,
            npc_type: npc.npc_type,
            npc_personality: npc.personality.clone(),
            difficulty,
            player,
            npc: opponent,
            turn: 0,
            max_turns: max_turns.max(1),
            is_player_turn,
            log,
            ended: false,
            winner: None,
            fled: false,
            last_damage: None,
            npc_decision: None,
            cam_ngo_gained: None,
        }
    }

    pub fn current_side(&self) -> Side {
        if self.is_player_turn {
            Side::Player
        } else {
            Side::Npc
        }
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Player => &self.player,
            Side::Npc => &self.npc,
        }
    }

    /// Acting combatant first, its opponent second.
    pub(super) fn sides_mut(&mut self, side: Side) -> (&mut Combatant, &mut Combatant) {
        match side {
            Side::Player => (&mut self.player, &mut self.npc),
            Side::Npc => (&mut self.npc, &mut self.player),
        }
    }
}
