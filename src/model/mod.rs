pub mod content;
pub mod faction;
pub mod intent;
pub mod inventory;
pub mod log;
pub mod map;
pub mod node;
pub mod npc;
pub mod player;
pub mod skill;
pub mod time;
pub mod world;

pub use content::{ContentTables, ItemDef, MonsterDef};
pub use faction::{Faction, FactionMembership, FactionRole};
pub use intent::{
    Activity, Destination, GatherTarget, Intent, IntentKind, NpcId, NpcPhase, PathStep,
};
pub use inventory::{Inventory, ItemId, ItemStack, LootEntry, roll_loot};
pub use log::{LogEntry, LogKind, WorldLog};
pub use map::{
    Area, AreaFill, AreaKind, Gate, ManualSpawn, MapDef, MapId, NpcSpawnRule, Poi, PoiKind,
    Position, Rect, WeightedTemplate,
};
pub use node::{
    FarmlandView, HarvestOutcome, NodeInstance, NodeKind, NodeRegistry, NodeTemplate,
    PlantedPlot, RespawnEntry, RespawnTime,
};
pub use npc::{CombatStats, Cultivation, Npc, NpcType, PersonalityTag, personality_compatibility};
pub use player::Player;
pub use skill::{EffectKind, Element, SkillDef, SkillEffect, StatKind, WeaponKind};
pub use time::{GameTime, Season};
pub use world::{PairKey, Relocation, World};
