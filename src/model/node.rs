//! Gatherable / interactable resource nodes and their respawn queue.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::inventory::{ItemId, LootEntry};
use super::map::{MapId, Position};
use super::time::GameTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Herb,
    Stone,
    Farmland,
    Chest,
    Other,
}

/// Respawn delay in minutes: a single value or a uniform `[min, max]` range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RespawnTime {
    Fixed(u64),
    Range(u64, u64),
}

impl RespawnTime {
    /// Draw a delay scaled by `multiplier`.
    pub fn draw<R: Rng + ?Sized>(self, multiplier: f64, rng: &mut R) -> u64 {
        let multiplier = multiplier.max(0.0);
        match self {
            RespawnTime::Fixed(minutes) => (minutes as f64 * multiplier).round() as u64,
            RespawnTime::Range(a, b) => {
                let lo = (a.min(b) as f64 * multiplier).round() as u64;
                let hi = (a.max(b) as f64 * multiplier).round() as u64;
                rng.random_range(lo..=hi)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTemplate {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub loot: Vec<LootEntry>,
    /// `None` means the node is gone for good once harvested.
    #[serde(default)]
    pub respawn: Option<RespawnTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInstance {
    pub id: u64,
    pub base_id: String,
    pub name: String,
    pub kind: NodeKind,
    pub position: Position,
    #[serde(default)]
    pub area_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespawnEntry {
    pub original_id: u64,
    pub base_id: String,
    pub map_id: MapId,
    pub area_id: Option<String>,
    pub original_position: Position,
    pub respawn_at: GameTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantedPlot {
    pub plot_id: u64,
    pub plant_name: String,
    /// Item produced when the plot is harvested.
    pub crop_item_id: ItemId,
    pub planted_at: GameTime,
    pub growth_minutes: u64,
}

impl PlantedPlot {
    /// Growth fraction in `[0, 1]`.
    pub fn growth(&self, now: GameTime) -> f64 {
        if self.growth_minutes == 0 {
            return 1.0;
        }
        let elapsed = self.planted_at.minutes_until(now);
        (elapsed as f64 / self.growth_minutes as f64).clamp(0.0, 1.0)
    }
}

/// Dynamic overlay for a farmland node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmlandView {
    pub is_planted: bool,
    pub growth_percent: f64,
    pub is_ready: bool,
    pub plant_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestOutcome {
    /// Hidden until `respawn_at`.
    Requeued { respawn_at: GameTime },
    /// Non-respawning node deleted from the map's master list.
    Removed,
    /// The instance was unknown or already waiting to respawn.
    NotVisible,
}

/// Live node instances per map plus the respawn queue.
///
/// An instance is visible exactly when it is in the master list and not in
/// the queue. Harvesting never touches the master list of a respawning
/// node; it only enqueues it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeRegistry {
    instances: BTreeMap<MapId, Vec<NodeInstance>>,
    respawn_queue: Vec<RespawnEntry>,
    #[serde(default)]
    planted_plots: Vec<PlantedPlot>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the master list for a map (used at map-population time).
    pub fn set_map_instances(&mut self, map_id: &str, instances: Vec<NodeInstance>) {
        self.instances.insert(map_id.to_string(), instances);
    }

    pub fn all_instances(&self, map_id: &str) -> &[NodeInstance] {
        self.instances.get(map_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn respawn_queue(&self) -> &[RespawnEntry] {
        &self.respawn_queue
    }

    pub fn is_queued(&self, instance_id: u64) -> bool {
        self.respawn_queue
            .iter()
            .any(|e| e.original_id == instance_id)
    }

    pub fn visible(&self, map_id: &str) -> impl Iterator<Item = &NodeInstance> {
        self.all_instances(map_id)
            .iter()
            .filter(|n| !self.is_queued(n.id))
    }

    pub fn visible_instance(&self, map_id: &str, instance_id: u64) -> Option<&NodeInstance> {
        self.visible(map_id).find(|n| n.id == instance_id)
    }

    /// Visible instances of `kind` inside an area.
    pub fn visible_in_area(&self, map_id: &str, area_id: &str, kind: NodeKind) -> Vec<&NodeInstance> {
        self.visible(map_id)
            .filter(|n| n.kind == kind && n.area_id.as_deref() == Some(area_id))
            .collect()
    }

    /// Hide a harvested instance: enqueue it for respawn when the template
    /// declares a window, otherwise delete it from the map permanently.
    pub fn remove_and_enqueue_respawn<R: Rng + ?Sized>(
        &mut self,
        map_id: &str,
        instance_id: u64,
        respawn: Option<RespawnTime>,
        multiplier: f64,
        now: GameTime,
        rng: &mut R,
    ) -> HarvestOutcome {
        let Some(instance) = self.visible_instance(map_id, instance_id).cloned() else {
            return HarvestOutcome::NotVisible;
        };
        match respawn {
            Some(window) => {
                let delay = window.draw(multiplier, rng);
                let respawn_at = now.advance(delay as i64);
                self.respawn_queue.push(RespawnEntry {
                    original_id: instance.id,
                    base_id: instance.base_id,
                    map_id: map_id.to_string(),
                    area_id: instance.area_id,
                    original_position: instance.position,
                    respawn_at,
                });
                HarvestOutcome::Requeued { respawn_at }
            }
            None => {
                if let Some(list) = self.instances.get_mut(map_id) {
                    list.retain(|n| n.id != instance_id);
                }
                HarvestOutcome::Removed
            }
        }
    }

    /// Drop every queue entry whose time has come. Returns the entries that
    /// became visible again.
    pub fn reconcile(&mut self, now: GameTime) -> Vec<RespawnEntry> {
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.respawn_queue)
            .into_iter()
            .partition(|e| e.respawn_at <= now);
        self.respawn_queue = pending;
        due
    }

    // -- Farmland --

    /// Start growing a crop on a plot. Fails if the plot is already planted.
    pub fn plant(
        &mut self,
        plot_id: u64,
        plant_name: &str,
        crop_item_id: &str,
        growth_minutes: u64,
        now: GameTime,
    ) -> bool {
        if self.planted_plots.iter().any(|p| p.plot_id == plot_id) {
            return false;
        }
        self.planted_plots.push(PlantedPlot {
            plot_id,
            plant_name: plant_name.to_string(),
            crop_item_id: crop_item_id.to_string(),
            planted_at: now,
            growth_minutes,
        });
        true
    }

    pub fn planted(&self, plot_id: u64) -> Option<&PlantedPlot> {
        self.planted_plots.iter().find(|p| p.plot_id == plot_id)
    }

    pub fn clear_plot(&mut self, plot_id: u64) -> Option<PlantedPlot> {
        let idx = self.planted_plots.iter().position(|p| p.plot_id == plot_id)?;
        Some(self.planted_plots.remove(idx))
    }

    pub fn farmland_view(&self, plot_id: u64, now: GameTime) -> FarmlandView {
        match self.planted(plot_id) {
            Some(plot) => {
                let growth = plot.growth(now);
                FarmlandView {
                    is_planted: true,
                    growth_percent: (growth * 100.0).round(),
                    is_ready: growth >= 1.0,
                    plant_name: Some(plot.plant_name.clone()),
                }
            }
            None => FarmlandView {
                is_planted: false,
                growth_percent: 0.0,
                is_ready: false,
                plant_name: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::model::time::MINUTES_PER_DAY;

    fn herb(id: u64) -> NodeInstance {
        NodeInstance {
            id,
            base_id: "spirit-grass".into(),
            name: "Spirit Grass".into(),
            kind: NodeKind::Herb,
            position: Position::new(10.0, 10.0),
            area_id: Some("field".into()),
        }
    }

    fn registry() -> NodeRegistry {
        let mut reg = NodeRegistry::new();
        reg.set_map_instances("valley", vec![herb(1), herb(2)]);
        reg
    }

    #[test]
    fn fixed_respawn_scales_by_multiplier() {
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(RespawnTime::Fixed(100).draw(1.5, &mut rng), 150);
        let d = RespawnTime::Range(10, 20).draw(2.0, &mut rng);
        assert!((20..=40).contains(&d));
    }

    #[test]
    fn harvested_node_is_hidden_until_due_then_visible_once() {
        let mut reg = registry();
        let mut rng = SmallRng::seed_from_u64(3);
        let now = GameTime::default();
        let outcome = reg.remove_and_enqueue_respawn(
            "valley",
            1,
            Some(RespawnTime::Fixed(MINUTES_PER_DAY)),
            1.0,
            now,
            &mut rng,
        );
        let due = now.advance(MINUTES_PER_DAY as i64);
        assert_eq!(outcome, HarvestOutcome::Requeued { respawn_at: due });

        // Never both visible and queued.
        assert!(reg.is_queued(1));
        assert!(reg.visible_instance("valley", 1).is_none());
        assert_eq!(reg.all_instances("valley").len(), 2);

        assert!(reg.reconcile(now.advance(10)).is_empty());
        assert!(reg.visible_instance("valley", 1).is_none());

        let back = reg.reconcile(due);
        assert_eq!(back.len(), 1);
        assert!(reg.visible_instance("valley", 1).is_some());
        assert!(reg.reconcile(due.advance(1)).is_empty());
    }

    #[test]
    fn queued_node_cannot_be_harvested_twice() {
        let mut reg = registry();
        let mut rng = SmallRng::seed_from_u64(3);
        let window = Some(RespawnTime::Range(60, 120));
        let now = GameTime::default();
        reg.remove_and_enqueue_respawn("valley", 2, window, 1.0, now, &mut rng);
        let again = reg.remove_and_enqueue_respawn("valley", 2, window, 1.0, now, &mut rng);
        assert_eq!(again, HarvestOutcome::NotVisible);
        assert_eq!(reg.respawn_queue().len(), 1);
    }

    #[test]
    fn non_respawning_node_is_deleted() {
        let mut reg = registry();
        let mut rng = SmallRng::seed_from_u64(3);
        let outcome =
            reg.remove_and_enqueue_respawn("valley", 1, None, 1.0, GameTime::default(), &mut rng);
        assert_eq!(outcome, HarvestOutcome::Removed);
        assert_eq!(reg.all_instances("valley").len(), 1);
        assert!(reg.respawn_queue().is_empty());
    }

    #[test]
    fn farmland_growth_is_clamped_and_ready_at_full() {
        let mut reg = NodeRegistry::new();
        let start = GameTime::default();
        assert!(reg.plant(7, "Jade Rice", "jade-rice", 1000, start));
        assert!(!reg.plant(7, "Jade Rice", "jade-rice", 1000, start));

        let half = reg.farmland_view(7, start.advance(500));
        assert!(half.is_planted);
        assert_eq!(half.growth_percent, 50.0);
        assert!(!half.is_ready);

        let over = reg.farmland_view(7, start.advance(5000));
        assert_eq!(over.growth_percent, 100.0);
        assert!(over.is_ready);

        let empty = reg.farmland_view(8, start);
        assert!(!empty.is_planted);
        assert_eq!(empty.plant_name, None);
    }
}
