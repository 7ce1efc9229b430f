use super::state::Combatant;
use crate::model::Cultivation;

const BASE_REWARD: f64 = 10.0;
const GAP_FACTOR: f64 = 1.15; // per power rank of difference
const MAX_GAP: i32 = 20;
const HP_POOL_DIVISOR: f64 = 20.0;

/// Insight ("cảm ngộ") earned for defeating `opponent`.
///
/// Grows with the opponent's power rank relative to the player, with its
/// HP pool and with the encounter difficulty; never below 1.
pub fn cam_ngo_reward(player: &Cultivation, opponent: &Combatant, difficulty: f64) -> u32 {
    let gap = (opponent.cultivation.power_rank() as i32 - player.power_rank() as i32)
        .clamp(-MAX_GAP, MAX_GAP);
    let pool = BASE_REWARD + opponent.stats.max_hp as f64 / HP_POOL_DIVISOR;
    let reward = pool * difficulty.max(0.1) * GAP_FACTOR.powi(gap);
    reward.round().max(1.0) as u32
}
