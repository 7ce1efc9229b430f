//! Starting a fight against a world NPC and writing its result back.

use rand::{Rng, RngCore};

use super::CombatError;
use super::reward::cam_ngo_reward;
use super::state::{CombatState, Combatant, Side};
use crate::config::SimConfig;
use crate::model::inventory::roll_loot;
use crate::model::{ContentTables, ItemStack, LogKind, NpcId, NpcType, World};
use crate::narrative::{DefeatDecision, DefeatRequest, NarrativeClient, Verdict};
use crate::sim::resolve_succession;

const INVENTORY_DROP_CHANCE: f64 = 0.5;
const EQUIPMENT_DROP_CHANCE: f64 = 0.2;
const DEFEAT_CALL_SITE: &str = "combat.defeat";

/// Result of sparing or killing a defeated NPC.
#[derive(Debug, Clone, PartialEq)]
pub struct VerdictOutcome {
    pub verdict: Verdict,
    pub cam_ngo: u32,
    pub loot: Vec<ItemStack>,
    pub linh_thach: u64,
    /// Loot that did not fit in the player's inventory and was left behind.
    pub overflow: Vec<ItemStack>,
    pub successor: Option<NpcId>,
    pub messages: Vec<String>,
}

/// Open a fight with an NPC, looked up fresh by id.
pub fn challenge(
    world: &World,
    content: &ContentTables,
    config: &SimConfig,
    npc_id: NpcId,
) -> Result<CombatState, CombatError> {
    let npc = world.npc(npc_id).ok_or(CombatError::NpcNotFound(npc_id))?;
    if world.is_defeated(npc_id) {
        return Err(CombatError::NpcDefeated(npc_id));
    }
    if let Some(until) = npc.challenge_cooldown_until
        && world.current_time < until
    {
        return Err(CombatError::OnCooldown { npc_id, until });
    }
    let difficulty = match (&npc.npc_type, &npc.monster_id) {
        (NpcType::Monster, Some(monster_id)) => match content.monster(monster_id) {
            Some(def) => def.difficulty,
            None => {
                tracing::warn!(monster_id = %monster_id, "monster definition missing");
                1.0
            }
        },
        _ => 1.0,
    };
    Ok(CombatState::new(
        Combatant::from_player(&world.player),
        npc,
        difficulty,
        config.max_combat_turns,
    ))
}

/// Once the player has won, compute the insight reward and obtain the
/// defeated NPC's decision. Monsters always die; a cultivator's decision
/// comes from the narrative service. Calling it again is a no-op.
pub async fn conclude(
    state: &mut CombatState,
    world: &World,
    narrative: &NarrativeClient,
) -> Result<(), CombatError> {
    if !state.ended {
        return Err(CombatError::NotEnded);
    }
    if state.winner != Some(Side::Player) || state.npc_decision.is_some() {
        return Ok(());
    }
    state.cam_ngo_gained = Some(cam_ngo_reward(
        &world.player.cultivation,
        &state.npc,
        state.difficulty,
    ));
    let decision = match state.npc_type {
        NpcType::Monster => DefeatDecision {
            decision: Verdict::Kill,
            dialogue: format!("{} collapses with a final howl.", state.npc.name),
        },
        NpcType::Cultivator => {
            let request = DefeatRequest {
                npc_name: state.npc.name.clone(),
                npc_realm: state.npc.cultivation.realm_index,
                npc_level: state.npc.cultivation.level,
                player_name: state.player.name.clone(),
                player_realm: world.player.cultivation.realm_index,
                player_level: world.player.cultivation.level,
                personality_tags: state.npc_personality.clone(),
            };
            narrative.defeat_decision(DEFEAT_CALL_SITE, &request).await
        }
    };
    state.log.push(decision.dialogue.clone());
    state.npc_decision = Some(decision);
    Ok(())
}

/// Settle a player victory. `verdict` overrides the NPC's suggested
/// decision; monsters are always killed. Consumes the combat.
pub fn apply_verdict(
    world: &mut World,
    content: &ContentTables,
    config: &SimConfig,
    state: CombatState,
    verdict: Option<Verdict>,
    rng: &mut dyn RngCore,
) -> Result<VerdictOutcome, CombatError> {
    if !state.ended {
        return Err(CombatError::NotEnded);
    }
    if state.winner != Some(Side::Player) {
        return Err(CombatError::NoVictory);
    }
    let npc_id = state.npc_id;
    let npc = world.npc(npc_id).ok_or(CombatError::NpcNotFound(npc_id))?;
    if world.is_defeated(npc_id) {
        return Err(CombatError::NpcDefeated(npc_id));
    }
    let verdict = match npc.npc_type {
        NpcType::Monster => Verdict::Kill,
        NpcType::Cultivator => verdict
            .or(state.npc_decision.as_ref().map(|d| d.decision))
            .unwrap_or(Verdict::Spare),
    };
    let cam_ngo = state.cam_ngo_gained.unwrap_or_else(|| {
        cam_ngo_reward(&world.player.cultivation, &state.npc, state.difficulty)
    });

    sync_player(world, &state.player);
    world.player.cultivation.cam_ngo += cam_ngo;
    let mut outcome = VerdictOutcome {
        verdict,
        cam_ngo,
        loot: Vec::new(),
        linh_thach: 0,
        overflow: Vec::new(),
        successor: None,
        messages: vec![format!("You gain {cam_ngo} insight.")],
    };
    match verdict {
        Verdict::Spare => spare(world, config, npc_id, &mut outcome),
        Verdict::Kill => kill(world, content, config, npc_id, rng, &mut outcome),
    }
    Ok(outcome)
}

fn spare(world: &mut World, config: &SimConfig, npc_id: NpcId, outcome: &mut VerdictOutcome) {
    let until = world
        .current_time
        .advance_months(config.challenge_cooldown_months);
    let Some(npc) = world.npc_mut(npc_id) else {
        return;
    };
    npc.stats.hp = 1;
    npc.challenge_cooldown_until = Some(until);
    let message = format!("You spare {}.", npc.display_name());
    let map_id = npc.current_map.clone();
    outcome.messages.push(message.clone());
    world.log_event(LogKind::Combat, Some(npc_id), Some(&map_id), message);
}

fn kill(
    world: &mut World,
    content: &ContentTables,
    config: &SimConfig,
    npc_id: NpcId,
    rng: &mut dyn RngCore,
    outcome: &mut VerdictOutcome,
) {
    let Some(npc) = world.npc_mut(npc_id) else {
        return;
    };
    let mut loot = Vec::new();
    match (&npc.npc_type, &npc.monster_id) {
        (NpcType::Monster, Some(monster_id)) => match content.monster(monster_id) {
            Some(def) => loot = roll_loot(&def.loot, &mut *rng),
            None => tracing::warn!(monster_id = %monster_id, "monster definition missing"),
        },
        (NpcType::Monster, None) => {}
        (NpcType::Cultivator, _) => {
            let carried: Vec<ItemStack> = npc.inventory.iter().cloned().collect();
            for stack in carried {
                if stack.quantity == 0 || !rng.random_bool(INVENTORY_DROP_CHANCE) {
                    continue;
                }
                let qty = rng.random_range(1..=stack.quantity);
                let taken = npc.inventory.remove(&stack.item_id, qty);
                if taken > 0 {
                    loot.push(ItemStack::new(stack.item_id.clone(), taken));
                }
            }
            let mut kept = Vec::new();
            for item_id in std::mem::take(&mut npc.equipment) {
                if rng.random_bool(EQUIPMENT_DROP_CHANCE) {
                    loot.push(ItemStack::new(item_id, 1));
                } else {
                    kept.push(item_id);
                }
            }
            npc.equipment = kept;
        }
    }

    let share = rng.random_range(0.7..=1.0);
    let currency = ((npc.linh_thach as f64 * share).round() as u64).min(npc.linh_thach);
    npc.linh_thach -= currency;
    let name = npc.display_name();
    let map_id = npc.current_map.clone();

    world.player.linh_thach += currency;
    let overflow = world.player.inventory.add_all(&loot);
    world.mark_defeated(npc_id);

    outcome.messages.push(format!("You slay {name}."));
    if currency > 0 {
        outcome
            .messages
            .push(format!("You collect {currency} spirit stones."));
    }
    for stack in &loot {
        outcome.messages.push(format!(
            "You take {}x {}.",
            stack.quantity,
            content.item_name(&stack.item_id)
        ));
    }
    for stack in &overflow {
        outcome.messages.push(format!(
            "Your bag is full; {}x {} is left behind.",
            stack.quantity,
            content.item_name(&stack.item_id)
        ));
    }
    let message = format!("{name} was slain by {}.", world.player.name);
    world.log_event(LogKind::Combat, Some(npc_id), Some(&map_id), message);

    outcome.successor = resolve_succession(world, content, config, npc_id);
    outcome.loot = loot;
    outcome.linh_thach = currency;
    outcome.overflow = overflow;
}

/// Settle a player loss. The player survives on 1 HP; the NPC keeps the
/// wounds it took. Consumes the combat.
pub fn apply_player_defeat(world: &mut World, state: CombatState) -> Result<(), CombatError> {
    if !state.ended {
        return Err(CombatError::NotEnded);
    }
    if state.winner != Some(Side::Npc) {
        return Err(CombatError::NoVictory);
    }
    sync_player(world, &state.player);
    world.player.stats.hp = 1;
    if let Some(npc) = world.npc_mut(state.npc_id) {
        npc.stats.hp = state.npc.stats.hp.max(1);
    }
    let map_id = world.player.current_map.clone();
    let message = format!("{} was defeated by {}.", world.player.name, state.npc.name);
    world.log_event(LogKind::Combat, Some(state.npc_id), Some(&map_id), message);
    Ok(())
}

/// Settle a fight the player fled. Consumes the combat.
pub fn apply_flight(world: &mut World, state: CombatState) -> Result<(), CombatError> {
    if !state.fled {
        return Err(CombatError::NotEnded);
    }
    sync_player(world, &state.player);
    world.player.stats.hp = world.player.stats.hp.max(1);
    Ok(())
}

fn sync_player(world: &mut World, fighter: &Combatant) {
    world.player.stats.hp = fighter.stats.hp;
    world.player.stats.mana = fighter.stats.mana;
}
