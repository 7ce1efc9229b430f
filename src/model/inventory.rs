use rand::Rng;
use serde::{Deserialize, Serialize};

pub type ItemId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: ItemId,
    pub quantity: u32,
}

impl ItemStack {
    pub fn new(item_id: impl Into<ItemId>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
        }
    }
}

/// One loot-table row: rolled independently at `chance`, quantity uniform
/// in `quantity.0..=quantity.1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootEntry {
    pub item_id: ItemId,
    pub quantity: (u32, u32),
    pub chance: f64,
}

impl LootEntry {
    pub fn new(item_id: impl Into<ItemId>, min: u32, max: u32, chance: f64) -> Self {
        Self {
            item_id: item_id.into(),
            quantity: (min, max),
            chance,
        }
    }
}

/// Roll every entry of a loot table. Entries that fail their chance roll or
/// draw a zero quantity produce nothing.
pub fn roll_loot<R: Rng + ?Sized>(table: &[LootEntry], rng: &mut R) -> Vec<ItemStack> {
    let mut drops = Vec::new();
    for entry in table {
        let chance = entry.chance.clamp(0.0, 1.0);
        if chance <= 0.0 || rng.random::<f64>() >= chance {
            continue;
        }
        let (lo, hi) = if entry.quantity.0 <= entry.quantity.1 {
            entry.quantity
        } else {
            (entry.quantity.1, entry.quantity.0)
        };
        let quantity = rng.random_range(lo..=hi);
        if quantity > 0 {
            drops.push(ItemStack::new(entry.item_id.clone(), quantity));
        }
    }
    drops
}

/// Stacked item storage. A distinct item occupies one slot; `capacity` of
/// `None` means unbounded (NPC inventories).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<ItemStack>,
    #[serde(default)]
    capacity: Option<usize>,
}

impl Inventory {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity: Some(capacity),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter()
    }

    pub fn count(&self, item_id: &str) -> u32 {
        self.slots
            .iter()
            .find(|s| s.item_id == item_id)
            .map_or(0, |s| s.quantity)
    }

    /// Add `quantity` of an item. Returns the quantity that did not fit
    /// (zero on success). Existing stacks always accept more.
    pub fn add(&mut self, item_id: &str, quantity: u32) -> u32 {
        if quantity == 0 {
            return 0;
        }
        if let Some(stack) = self.slots.iter_mut().find(|s| s.item_id == item_id) {
            stack.quantity += quantity;
            return 0;
        }
        if self.capacity.is_some_and(|cap| self.slots.len() >= cap) {
            return quantity;
        }
        self.slots.push(ItemStack::new(item_id, quantity));
        0
    }

    /// Add several stacks; returns the overflow stacks that were dropped.
    pub fn add_all(&mut self, stacks: &[ItemStack]) -> Vec<ItemStack> {
        stacks
            .iter()
            .filter_map(|s| {
                let overflow = self.add(&s.item_id, s.quantity);
                (overflow > 0).then(|| ItemStack::new(s.item_id.clone(), overflow))
            })
            .collect()
    }

    /// Remove up to `quantity`; returns how many were actually removed.
    pub fn remove(&mut self, item_id: &str, quantity: u32) -> u32 {
        let Some(idx) = self.slots.iter().position(|s| s.item_id == item_id) else {
            return 0;
        };
        let taken = quantity.min(self.slots[idx].quantity);
        self.slots[idx].quantity -= taken;
        if self.slots[idx].quantity == 0 {
            self.slots.remove(idx);
        }
        taken
    }

    /// Take everything out, leaving the inventory empty.
    pub fn drain(&mut self) -> Vec<ItemStack> {
        std::mem::take(&mut self.slots)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn certain_entry_always_drops_in_range() {
        let table = vec![LootEntry::new("herb", 2, 2, 1.0)];
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(roll_loot(&table, &mut rng), vec![ItemStack::new("herb", 2)]);
        }
    }

    #[test]
    fn zero_chance_never_drops() {
        let table = vec![LootEntry::new("herb", 1, 5, 0.0)];
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..50 {
            assert!(roll_loot(&table, &mut rng).is_empty());
        }
    }

    #[test]
    fn capacity_limits_new_slots_but_not_stacks() {
        let mut inv = Inventory::with_capacity(1);
        assert_eq!(inv.add("a", 3), 0);
        assert_eq!(inv.add("a", 2), 0);
        assert_eq!(inv.add("b", 4), 4);
        assert_eq!(inv.count("a"), 5);
        assert_eq!(inv.count("b"), 0);
    }

    #[test]
    fn add_all_reports_overflow() {
        let mut inv = Inventory::with_capacity(2);
        let overflow = inv.add_all(&[
            ItemStack::new("a", 1),
            ItemStack::new("b", 1),
            ItemStack::new("c", 7),
        ]);
        assert_eq!(overflow, vec![ItemStack::new("c", 7)]);
    }

    #[test]
    fn unbounded_never_overflows() {
        let mut inv = Inventory::unbounded();
        for i in 0..200 {
            assert_eq!(inv.add(&format!("item-{i}"), 1), 0);
        }
        assert_eq!(inv.len(), 200);
    }

    #[test]
    fn remove_drops_empty_stack() {
        let mut inv = Inventory::unbounded();
        inv.add("a", 3);
        assert_eq!(inv.remove("a", 5), 3);
        assert!(inv.is_empty());
        assert_eq!(inv.remove("missing", 1), 0);
    }
}
