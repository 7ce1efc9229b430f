//! Turn-based player-versus-NPC combat.
//!
//! A fight runs on copies of both combatants inside [`CombatState`]. The
//! world is only touched when the fight is settled with
//! [`apply_verdict`], [`apply_player_defeat`] or [`apply_flight`].

mod outcome;
mod reward;
mod state;
mod turn;

pub use outcome::{
    VerdictOutcome, apply_flight, apply_player_defeat, apply_verdict, challenge, conclude,
};
pub use reward::cam_ngo_reward;
pub use state::{ActiveEffect, CombatAction, CombatState, Combatant, Side, StatusKind};
pub use turn::choose_action;

use crate::model::{GameTime, NpcId};

#[derive(Debug, thiserror::Error)]
pub enum CombatError {
    #[error("no NPC with id {0}")]
    NpcNotFound(NpcId),
    #[error("NPC {0} has already been defeated")]
    NpcDefeated(NpcId),
    #[error("NPC {npc_id} cannot be challenged again until {until}")]
    OnCooldown { npc_id: NpcId, until: GameTime },
    #[error("it is not the player's turn")]
    NotPlayerTurn,
    #[error("it is not the NPC's turn")]
    NotNpcTurn,
    #[error("combat has already ended")]
    AlreadyEnded,
    #[error("combat has not ended")]
    NotEnded,
    #[error("combat did not end the way this settlement expects")]
    NoVictory,
}
