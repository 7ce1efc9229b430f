use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for a simulation run.
///
/// Every field has a default, so a JSON override only needs the keys it
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed; the same seed and inputs replay the same world.
    pub seed: u64,
    /// NPC travel speed in map pixels per game minute.
    pub travel_speed: f64,
    /// Rest after an outing, in months (inclusive range).
    pub rest_months: (u32, u32),
    /// Rest for holders of fixed-position faction roles.
    pub fixed_post_rest_months: (u32, u32),
    pub trade_income_per_month: f64,
    pub trade_fortune_divisor: f64,
    pub hunt_drop_chance: f64,
    pub hunt_fortune_divisor: f64,
    /// Monthly chance that two NPCs on the same map interact.
    pub social_base_chance: f64,
    /// Magnitude range of one social affinity change.
    pub social_delta: (i32, i32),
    /// Roles below this power leave no vacancy worth filling.
    pub succession_min_power: u32,
    /// Combat is force-ended after this many turns.
    pub max_combat_turns: u32,
    pub challenge_cooldown_months: u32,
    pub base_qi_per_month: f64,
    pub meditation_qi_multiplier: f64,
    pub respawn_multiplier: f64,
    pub max_log_entries: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            travel_speed: 5.0,
            rest_months: (1, 3),
            fixed_post_rest_months: (6, 12),
            trade_income_per_month: 500.0,
            trade_fortune_divisor: 30.0,
            hunt_drop_chance: 0.7,
            hunt_fortune_divisor: 25.0,
            social_base_chance: 0.15,
            social_delta: (1, 10),
            succession_min_power: 50,
            max_combat_turns: 100,
            challenge_cooldown_months: 1,
            base_qi_per_month: 30.0,
            meditation_qi_multiplier: 2.0,
            respawn_multiplier: 1.0,
            max_log_entries: 500,
        }
    }
}

impl SimConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse overrides from JSON and validate them.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.travel_speed <= 0.0 {
            return Err(ConfigError::Invalid("travel_speed must be positive".into()));
        }
        for (name, (lo, hi)) in [
            ("rest_months", self.rest_months),
            ("fixed_post_rest_months", self.fixed_post_rest_months),
        ] {
            if lo > hi {
                return Err(ConfigError::Invalid(format!("{name}: {lo} > {hi}")));
            }
        }
        if self.social_delta.0 > self.social_delta.1 || self.social_delta.0 < 0 {
            return Err(ConfigError::Invalid("social_delta must be a non-negative range".into()));
        }
        if !(0.0..=1.0).contains(&self.social_base_chance)
            || !(0.0..=1.0).contains(&self.hunt_drop_chance)
        {
            return Err(ConfigError::Invalid("probabilities must lie in [0, 1]".into()));
        }
        if self.max_combat_turns == 0 {
            return Err(ConfigError::Invalid("max_combat_turns must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SimConfig::from_json_str(r#"{"seed": 7, "travel_speed": 2.5}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.travel_speed, 2.5);
        assert_eq!(config.rest_months, (1, 3));
    }

    #[test]
    fn rejects_inverted_ranges() {
        let err = SimConfig::from_json_str(r#"{"rest_months": [5, 2]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            SimConfig::from_json_str("{"),
            Err(ConfigError::Parse(_))
        ));
    }
}
