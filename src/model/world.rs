use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::intent::NpcId;
use super::log::{LogEntry, LogKind, WorldLog};
use super::map::MapId;
use super::node::NodeRegistry;
use super::npc::Npc;
use super::player::Player;
use super::time::GameTime;
use crate::id::IdGenerator;

pub const AFFINITY_MIN: i32 = -100;
pub const AFFINITY_MAX: i32 = 100;

/// Unordered NPC pair, stored smallest id first. Serialized as `"a:b"` so it
/// can key a JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PairKey(NpcId, NpcId);

impl PairKey {
    pub fn new(a: NpcId, b: NpcId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn ids(self) -> (NpcId, NpcId) {
        (self.0, self.1)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0, self.1)
    }
}

impl From<PairKey> for String {
    fn from(k: PairKey) -> Self {
        k.to_string()
    }
}

impl TryFrom<String> for PairKey {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let (a, b) = s
            .split_once(':')
            .ok_or_else(|| format!("invalid pair key: {s}"))?;
        let a: NpcId = a.parse().map_err(|_| format!("invalid pair key: {s}"))?;
        let b: NpcId = b.parse().map_err(|_| format!("invalid pair key: {s}"))?;
        Ok(PairKey::new(a, b))
    }
}

/// An NPC that moved between per-map collections during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub npc_id: NpcId,
    pub from: MapId,
    pub to: MapId,
}

/// The full persisted game state.
///
/// NPC records live in one arena keyed by id; `npcs_by_map` is the
/// canonical per-map membership index. Defeated NPCs stay in the arena so
/// ids held by the UI and by affinity records keep resolving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub current_time: GameTime,
    pub player: Player,
    pub npcs: BTreeMap<NpcId, Npc>,
    pub npcs_by_map: BTreeMap<MapId, Vec<NpcId>>,
    pub defeated_npc_ids: BTreeSet<NpcId>,
    pub affinities: BTreeMap<PairKey, i32>,
    pub nodes: NodeRegistry,
    pub log: WorldLog,
    pub id_gen: IdGenerator,
}

impl World {
    pub fn new(player: Player, start: GameTime) -> Self {
        Self {
            current_time: start,
            player,
            npcs: BTreeMap::new(),
            npcs_by_map: BTreeMap::new(),
            defeated_npc_ids: BTreeSet::new(),
            affinities: BTreeMap::new(),
            nodes: NodeRegistry::new(),
            log: WorldLog::default(),
            id_gen: IdGenerator::new(),
        }
    }

    /// Insert an NPC and file it under its current map. An id of 0 is
    /// replaced with a freshly generated one. Returns the id.
    pub fn add_npc(&mut self, mut npc: Npc) -> NpcId {
        if npc.id == 0 {
            npc.id = self.id_gen.next_id();
        } else {
            self.id_gen.reserve_through(npc.id);
        }
        let id = npc.id;
        self.npcs_by_map
            .entry(npc.current_map.clone())
            .or_default()
            .push(id);
        self.npcs.insert(id, npc);
        id
    }

    pub fn npc(&self, id: NpcId) -> Option<&Npc> {
        self.npcs.get(&id)
    }

    pub fn npc_mut(&mut self, id: NpcId) -> Option<&mut Npc> {
        self.npcs.get_mut(&id)
    }

    pub fn is_defeated(&self, id: NpcId) -> bool {
        self.defeated_npc_ids.contains(&id)
    }

    /// A living NPC: present in the arena and not defeated.
    pub fn living_npc(&self, id: NpcId) -> Option<&Npc> {
        self.npcs.get(&id).filter(|_| !self.is_defeated(id))
    }

    pub fn npcs_on_map(&self, map_id: &str) -> &[NpcId] {
        self.npcs_by_map
            .get(map_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn living_npcs_on_map(&self, map_id: &str) -> Vec<NpcId> {
        self.npcs_on_map(map_id)
            .iter()
            .copied()
            .filter(|id| !self.is_defeated(*id))
            .collect()
    }

    /// Ids of every living cultivator, in id order.
    pub fn living_cultivators(&self) -> Vec<NpcId> {
        self.npcs
            .values()
            .filter(|n| n.is_cultivator() && !self.is_defeated(n.id))
            .map(|n| n.id)
            .collect()
    }

    /// Logically destroy an NPC. The record stays in the arena.
    pub fn mark_defeated(&mut self, id: NpcId) {
        self.defeated_npc_ids.insert(id);
    }

    pub fn log_event(
        &mut self,
        kind: LogKind,
        npc_id: Option<NpcId>,
        map_id: Option<&str>,
        message: String,
    ) -> u64 {
        let id = self.id_gen.next_id();
        self.log.push(LogEntry {
            id,
            time: self.current_time,
            kind,
            npc_id,
            map_id: map_id.map(str::to_string),
            message,
        });
        id
    }

    /// Move every NPC whose `current_map` disagrees with the collection it
    /// is filed under. Runs once per step, after all position updates.
    pub fn reconcile_map_membership(&mut self) -> Vec<Relocation> {
        let mut moves = Vec::new();
        for (map_id, ids) in &self.npcs_by_map {
            for id in ids {
                if let Some(npc) = self.npcs.get(id)
                    && npc.current_map != *map_id
                {
                    moves.push(Relocation {
                        npc_id: *id,
                        from: map_id.clone(),
                        to: npc.current_map.clone(),
                    });
                }
            }
        }
        for m in &moves {
            if let Some(list) = self.npcs_by_map.get_mut(&m.from) {
                list.retain(|id| *id != m.npc_id);
            }
            self.npcs_by_map
                .entry(m.to.clone())
                .or_default()
                .push(m.npc_id);
        }
        moves
    }

    /// Rebuild `npcs_by_map` from scratch out of each NPC's `current_map`.
    pub fn rebuild_map_index(&mut self) {
        self.npcs_by_map.clear();
        for npc in self.npcs.values() {
            self.npcs_by_map
                .entry(npc.current_map.clone())
                .or_default()
                .push(npc.id);
        }
    }

    pub fn affinity(&self, a: NpcId, b: NpcId) -> i32 {
        self.affinities
            .get(&PairKey::new(a, b))
            .copied()
            .unwrap_or(0)
    }

    /// Shift the pair's affinity by `delta`, clamped to `[-100, 100]`.
    /// Returns the new value.
    pub fn adjust_affinity(&mut self, a: NpcId, b: NpcId, delta: i32) -> i32 {
        let entry = self.affinities.entry(PairKey::new(a, b)).or_insert(0);
        *entry = (*entry + delta).clamp(AFFINITY_MIN, AFFINITY_MAX);
        *entry
    }
}
