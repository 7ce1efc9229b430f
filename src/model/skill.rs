use serde::{Deserialize, Serialize};

/// Spiritual root element ("linh căn").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Metal,
    Wood,
    Water,
    Fire,
    Earth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    Sword,
    Saber,
    Spear,
    Fan,
    Staff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Attack,
    Defense,
    Speed,
    MaxHp,
    MaxMana,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectKind {
    /// Heal the caster by `flat + caster.stat * scaling`.
    Heal {
        #[serde(default)]
        flat: u32,
        #[serde(default)]
        scaling: Option<(StatKind, f64)>,
    },
    /// Fixed damage at the start of each of the target's turns.
    Burn { damage: u32, turns: u32 },
    /// The target skips its next `turns` turns.
    Stun { turns: u32 },
    /// Lower one of the target's stats by `amount` for `turns` turns.
    Debuff { stat: StatKind, amount: u32, turns: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEffect {
    pub kind: EffectKind,
    pub chance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDef {
    pub id: String,
    pub name: String,
    pub mana_cost: u32,
    pub base_damage: u32,
    /// Multiplier applied to the caster's attack stat.
    #[serde(default)]
    pub attack_scaling: f64,
    #[serde(default)]
    pub element: Option<Element>,
    /// Weapon the technique is written for; `None` fits any weapon.
    #[serde(default)]
    pub weapon: Option<WeaponKind>,
    #[serde(default)]
    pub effects: Vec<SkillEffect>,
}
