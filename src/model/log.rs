use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::intent::NpcId;
use super::map::MapId;
use super::time::GameTime;

pub const DEFAULT_LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    IntentStarted,
    IntentCompleted,
    Returning,
    Breakthrough,
    Succession,
    Social,
    Combat,
    Harvest,
    Encounter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub time: GameTime,
    pub kind: LogKind,
    #[serde(default)]
    pub npc_id: Option<NpcId>,
    #[serde(default)]
    pub map_id: Option<MapId>,
    pub message: String,
}

/// Bounded, append-only world chronicle shown to the player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl WorldLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.trim();
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push_back(entry);
        self.trim();
    }

    fn trim(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn of_kind(&self, kind: LogKind) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    pub fn for_npc(&self, npc_id: NpcId) -> impl Iterator<Item = &LogEntry> {
        self.entries
            .iter()
            .filter(move |e| e.npc_id == Some(npc_id))
    }
}

impl Default for WorldLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}
