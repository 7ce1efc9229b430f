use serde::{Deserialize, Serialize};

/// Monotonic ID generator shared by NPCs, resource-node instances, farm
/// plots and log entries.
///
/// Serialized with the world so a reloaded save keeps handing out fresh
/// ids instead of colliding with existing ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn starting_from(start: u64) -> Self {
        Self { next: start }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Make sure future ids are strictly greater than `id`.
    /// Used when records with preassigned ids are inserted.
    pub fn reserve_through(&mut self, id: u64) {
        if id >= self.next {
            self.next = id + 1;
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids() {
        let mut id_gen = IdGenerator::new();
        assert_eq!(id_gen.next_id(), 1);
        assert_eq!(id_gen.next_id(), 2);
    }

    #[test]
    fn reserve_skips_past_preassigned_ids() {
        let mut id_gen = IdGenerator::starting_from(5);
        id_gen.reserve_through(40);
        assert_eq!(id_gen.next_id(), 41);
        id_gen.reserve_through(3);
        assert_eq!(id_gen.next_id(), 42);
    }

    #[test]
    fn survives_serde_round_trip() {
        let mut id_gen = IdGenerator::new();
        id_gen.next_id();
        let json = serde_json::to_string(&id_gen).unwrap();
        let mut back: IdGenerator = serde_json::from_str(&json).unwrap();
        assert_eq!(back.next_id(), 2);
    }
}
