use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionRole {
    pub name: String,
    pub power: u32,
    /// Chance that a holder of this role takes a long (6-12 month) rest
    /// after an outing because the post keeps them at home. Zero for
    /// roles without a fixed position.
    #[serde(default)]
    pub fixed_position_chance: f64,
}

/// A sect or clan. `roles` is ordered by descending power.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faction {
    pub id: String,
    pub name: String,
    pub roles: Vec<FactionRole>,
}

impl Faction {
    pub fn role(&self, name: &str) -> Option<&FactionRole> {
        self.roles.iter().find(|r| r.name == name)
    }

    /// Index of a role in the power ranking (0 = highest).
    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.roles.iter().position(|r| r.name == name)
    }

    pub fn role_at(&self, rank: usize) -> Option<&FactionRole> {
        self.roles.get(rank)
    }
}

/// An NPC's seat in a faction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionMembership {
    pub faction_id: String,
    pub role: String,
    pub power: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_lookup() {
        let f = Faction {
            id: "azure".into(),
            name: "Azure Cloud Sect".into(),
            roles: vec![
                FactionRole { name: "Leader".into(), power: 100, fixed_position_chance: 0.8 },
                FactionRole { name: "Elder".into(), power: 60, fixed_position_chance: 0.3 },
                FactionRole { name: "Disciple".into(), power: 20, fixed_position_chance: 0.0 },
            ],
        };
        assert_eq!(f.rank_of("Elder"), Some(1));
        assert_eq!(f.role_at(2).map(|r| r.power), Some(20));
        assert!(f.role("Servant").is_none());
    }
}
