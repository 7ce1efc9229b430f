//! Turn resolution: start-of-turn effects, the chosen action, effect
//! countdown, and the end-of-fight checks.

use rand::{Rng, RngCore};

use super::CombatError;
use super::state::{CombatAction, CombatState, Combatant, Side, StatusKind};
use crate::model::{ContentTables, EffectKind, SkillDef, StatKind};

/// Evasion never exceeds this, so every fight can end.
const MAX_EVASION: f64 = 0.75;
const CRIT_MULTIPLIER: f64 = 1.5;
const ELEMENT_AFFINITY_BONUS: f64 = 1.2; // caster's spiritual root matches
const WEAPON_MATCH_BONUS: f64 = 1.15;
const WEAPON_MISMATCH_PENALTY: f64 = 0.8;
/// Below this HP fraction the built-in policy prefers healing.
const HEAL_THRESHOLD: f64 = 0.4;

impl CombatState {
    /// Player's action for the current turn.
    pub fn player_act(
        &mut self,
        action: CombatAction,
        content: &ContentTables,
        rng: &mut dyn RngCore,
    ) -> Result<(), CombatError> {
        if self.ended {
            return Err(CombatError::AlreadyEnded);
        }
        if !self.is_player_turn {
            return Err(CombatError::NotPlayerTurn);
        }
        self.take_turn(Side::Player, action, content, rng);
        Ok(())
    }

    /// The NPC picks and performs its action for the current turn.
    pub fn npc_act(
        &mut self,
        content: &ContentTables,
        rng: &mut dyn RngCore,
    ) -> Result<(), CombatError> {
        if self.ended {
            return Err(CombatError::AlreadyEnded);
        }
        if self.is_player_turn {
            return Err(CombatError::NotNpcTurn);
        }
        let action = choose_action(&self.npc, content, rng);
        self.take_turn(Side::Npc, action, content, rng);
        Ok(())
    }

    /// Drive both sides with the built-in policy until the fight ends.
    /// Bounded by the turn cap.
    pub fn auto_resolve(&mut self, content: &ContentTables, rng: &mut dyn RngCore) {
        while !self.ended {
            let side = self.current_side();
            let action = choose_action(self.combatant(side), content, rng);
            self.take_turn(side, action, content, rng);
        }
    }

    /// The player leaves the fight: no winner, no rewards.
    pub fn flee(&mut self) -> Result<(), CombatError> {
        if self.ended {
            return Err(CombatError::AlreadyEnded);
        }
        self.ended = true;
        self.fled = true;
        self.winner = None;
        self.log.push(format!("{} flees from {}.", self.player.name, self.npc.name));
        Ok(())
    }

    fn take_turn(
        &mut self,
        side: Side,
        action: CombatAction,
        content: &ContentTables,
        rng: &mut dyn RngCore,
    ) {
        self.turn += 1;
        let mut lines = Vec::new();
        let mut last_damage = None;
        let (actor, target) = self.sides_mut(side);

        let burn = actor.burn_damage();
        if burn > 0 {
            actor.take_damage(burn);
            lines.push(format!("{} burns for {burn} damage.", actor.name));
        }

        if actor.is_down() {
            // Burned out before acting.
        } else if actor.is_stunned() {
            lines.push(format!("{} is stunned and cannot act.", actor.name));
            actor.tick_effects();
        } else {
            let dealt = match &action {
                CombatAction::Attack => basic_attack(actor, target, rng, &mut lines),
                CombatAction::Skill(id) => match content.skill(id) {
                    Some(skill) if actor.stats.mana >= skill.mana_cost => {
                        cast(actor, target, skill, rng, &mut lines)
                    }
                    Some(skill) => {
                        lines.push(format!(
                            "{} lacks the qi for {} and strikes instead.",
                            actor.name, skill.name
                        ));
                        basic_attack(actor, target, rng, &mut lines)
                    }
                    None => {
                        tracing::warn!(skill_id = %id, "unknown skill, falling back to attack");
                        basic_attack(actor, target, rng, &mut lines)
                    }
                },
            };
            if let Some(amount) = dealt {
                last_damage = Some((side.other(), amount));
            }
            actor.tick_effects();
        }

        let actor_down = actor.is_down();
        let target_down = target.is_down();
        self.log.extend(lines);
        if last_damage.is_some() {
            self.last_damage = last_damage;
        }

        if target_down {
            self.finish(side);
        } else if actor_down {
            self.finish(side.other());
        } else {
            self.is_player_turn = side == Side::Npc;
            if self.turn >= self.max_turns {
                self.force_end();
            }
        }
    }

    fn finish(&mut self, winner: Side) {
        self.ended = true;
        self.winner = Some(winner);
        let (w, l) = match winner {
            Side::Player => (&self.player.name, &self.npc.name),
            Side::Npc => (&self.npc.name, &self.player.name),
        };
        self.log.push(format!("{w} defeats {l}."));
        tracing::debug!(npc = self.npc_id, ?winner, turns = self.turn, "combat ended");
    }

    /// Turn cap reached: the larger remaining HP fraction wins, ties go to
    /// the player.
    fn force_end(&mut self) {
        self.log
            .push("Both fighters are exhausted; the duel is called.".to_string());
        let winner = if self.player.hp_fraction() >= self.npc.hp_fraction() {
            Side::Player
        } else {
            Side::Npc
        };
        self.finish(winner);
    }
}

/// Built-in policy: heal when low, otherwise use an affordable damaging
/// technique most of the time, else a basic attack.
pub fn choose_action(actor: &Combatant, content: &ContentTables, rng: &mut dyn RngCore) -> CombatAction {
    let affordable: Vec<&SkillDef> = actor
        .skills
        .iter()
        .filter_map(|id| content.skill(id))
        .filter(|s| s.mana_cost <= actor.stats.mana)
        .collect();

    if actor.hp_fraction() < HEAL_THRESHOLD
        && let Some(heal) = affordable.iter().find(|s| {
            s.effects
                .iter()
                .any(|e| matches!(e.kind, EffectKind::Heal { .. }))
        })
    {
        return CombatAction::Skill(heal.id.clone());
    }

    let damaging: Vec<&&SkillDef> = affordable.iter().filter(|s| deals_damage(s)).collect();
    if !damaging.is_empty() && rng.random_bool(0.6) {
        let pick = damaging[rng.random_range(0..damaging.len())];
        return CombatAction::Skill(pick.id.clone());
    }
    CombatAction::Attack
}

fn deals_damage(skill: &SkillDef) -> bool {
    skill.base_damage > 0 || skill.attack_scaling > 0.0
}

fn mitigated(raw: f64, target: &Combatant) -> u32 {
    let defense = target.effective(StatKind::Defense) as f64;
    (raw - defense * 0.5).max(1.0).round() as u32
}

fn basic_attack(
    actor: &mut Combatant,
    target: &mut Combatant,
    rng: &mut dyn RngCore,
    lines: &mut Vec<String>,
) -> Option<u32> {
    if rng.random_bool(target.stats.evasion.clamp(0.0, MAX_EVASION)) {
        lines.push(format!("{} dodges {}'s strike.", target.name, actor.name));
        return None;
    }
    let mut raw = actor.effective(StatKind::Attack) as f64 * rng.random_range(0.9..=1.1);
    let crit = rng.random_bool(actor.stats.crit_rate.clamp(0.0, 1.0));
    if crit {
        raw *= CRIT_MULTIPLIER;
    }
    let damage = mitigated(raw, target);
    target.take_damage(damage);
    lines.push(if crit {
        format!("{} lands a critical strike on {} for {damage}.", actor.name, target.name)
    } else {
        format!("{} strikes {} for {damage}.", actor.name, target.name)
    });
    Some(damage)
}

fn cast(
    actor: &mut Combatant,
    target: &mut Combatant,
    skill: &SkillDef,
    rng: &mut dyn RngCore,
    lines: &mut Vec<String>,
) -> Option<u32> {
    actor.stats.mana -= skill.mana_cost;

    let mut dealt = None;
    if deals_damage(skill) {
        let mut raw =
            skill.base_damage as f64 + actor.effective(StatKind::Attack) as f64 * skill.attack_scaling;
        if skill.element.is_some_and(|e| actor.linh_can.contains(&e)) {
            raw *= ELEMENT_AFFINITY_BONUS;
        }
        match skill.weapon {
            Some(w) if actor.weapon == Some(w) => raw *= WEAPON_MATCH_BONUS,
            Some(_) => raw *= WEAPON_MISMATCH_PENALTY,
            None => {}
        }
        let damage = mitigated(raw, target);
        target.take_damage(damage);
        lines.push(format!(
            "{} uses {} on {} for {damage}.",
            actor.name, skill.name, target.name
        ));
        dealt = Some(damage);
    } else {
        lines.push(format!("{} uses {}.", actor.name, skill.name));
    }

    for effect in &skill.effects {
        if !rng.random_bool(effect.chance.clamp(0.0, 1.0)) {
            continue;
        }
        match &effect.kind {
            EffectKind::Heal { flat, scaling } => {
                let scaled = scaling
                    .map(|(stat, factor)| (actor.effective(stat) as f64 * factor).round() as u32)
                    .unwrap_or(0);
                let amount = flat + scaled;
                actor.heal(amount);
                lines.push(format!("{} recovers {amount} HP.", actor.name));
            }
            EffectKind::Burn { damage, turns } => {
                target.apply_effect(StatusKind::Burn { damage: *damage }, *turns);
                lines.push(format!("{} is set ablaze.", target.name));
            }
            EffectKind::Stun { turns } => {
                target.apply_effect(StatusKind::Stun, *turns);
                lines.push(format!("{} is stunned.", target.name));
            }
            EffectKind::Debuff {
                stat,
                amount,
                turns,
            } => {
                target.apply_effect(
                    StatusKind::Debuff {
                        stat: *stat,
                        amount: *amount,
                    },
                    *turns,
                );
                lines.push(format!("{}'s {stat:?} is weakened.", target.name));
            }
        }
    }
    dealt
}
