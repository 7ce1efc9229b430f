//! NPC goals and the per-NPC activity state machine.
//!
//! An [`Intent`] is immutable once planned. The NPC's [`Activity`] records
//! how far it has been consumed: travelling along `intent.path` or dwelling
//! at the destination.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::map::{MapId, Position};
use super::node::NodeKind;
use super::time::GameTime;

pub type NpcId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatherTarget {
    Herb,
    Stone,
}

impl GatherTarget {
    pub fn node_kind(self) -> NodeKind {
        match self {
            GatherTarget::Herb => NodeKind::Herb,
            GatherTarget::Stone => NodeKind::Stone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntentKind {
    Meditate,
    Gather { target: GatherTarget },
    Hunt,
    Trade,
    Challenge { target_npc: Option<NpcId> },
    Wander,
    Socialize,
    /// Pure travel leg back to the home map after an outing.
    ReturnHome,
}

impl IntentKind {
    pub fn label(&self) -> &'static str {
        match self {
            IntentKind::Meditate => "meditate",
            IntentKind::Gather { .. } => "gather",
            IntentKind::Hunt => "hunt",
            IntentKind::Trade => "trade",
            IntentKind::Challenge { .. } => "challenge",
            IntentKind::Wander => "wander",
            IntentKind::Socialize => "socialize",
            IntentKind::ReturnHome => "return_home",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub map_id: MapId,
    #[serde(default)]
    pub poi_id: Option<String>,
    #[serde(default)]
    pub area_id: Option<String>,
    pub position: Position,
}

/// One hop of a route: walk to `target_position` on `map_id`. Every hop
/// but the last ends on the exit or gate leading to the next hop's map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub map_id: MapId,
    pub target_position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub kind: IntentKind,
    pub description: String,
    pub destination: Destination,
    /// Months spent at the destination. Zero means the intent is pure
    /// travel and ends on arrival.
    pub duration_months: u32,
    /// Empty when the NPC is already at the destination.
    #[serde(default)]
    pub path: Vec<PathStep>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Activity {
    #[default]
    Idle,
    Traveling {
        intent: Intent,
        step_index: usize,
        started_at: GameTime,
    },
    Dwelling {
        intent: Intent,
        remaining_minutes: u64,
        started_at: GameTime,
    },
}

impl Activity {
    pub fn intent(&self) -> Option<&Intent> {
        match self {
            Activity::Idle => None,
            Activity::Traveling { intent, .. } | Activity::Dwelling { intent, .. } => Some(intent),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Activity::Idle)
    }
}

/// Coarse phase used for display and scheduling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcPhase {
    Idle,
    Resting,
    Traveling,
    Dwelling,
}
