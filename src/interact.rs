//! Direct player actions on the world: harvesting nodes, farming plots and
//! narrative-generated encounters.

use rand::{Rng, RngCore};

use crate::config::SimConfig;
use crate::model::{
    ContentTables, HarvestOutcome, ItemStack, LogKind, NodeKind, World, roll_loot,
};
use crate::narrative::{InteractionRequest, NarrativeClient};

/// Crop yield per harvested plot (inclusive).
const PLOT_YIELD: (u32, u32) = (2, 4);
const ENCOUNTER_CALL_SITE: &str = "encounter";

#[derive(Debug, thiserror::Error)]
pub enum InteractError {
    #[error("no visible node {instance_id} on map {map_id}")]
    NodeNotFound { map_id: String, instance_id: u64 },
    #[error("node {0} is farmland; plant or harvest it as a plot")]
    Farmland(u64),
    #[error("node {0} is not farmland")]
    NotFarmland(u64),
    #[error("unknown node template {0}")]
    UnknownTemplate(String),
    #[error("unknown item {0}")]
    UnknownItem(String),
    #[error("plot {0} is already planted")]
    AlreadyPlanted(u64),
    #[error("plot {0} has nothing planted")]
    NotPlanted(u64),
    #[error("plot {plot_id} is only {growth_percent}% grown")]
    NotReady { plot_id: u64, growth_percent: f64 },
}

/// What the player got out of an interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gains {
    /// Items that went into the inventory.
    pub items: Vec<ItemStack>,
    /// Items that did not fit and were dropped.
    pub overflow: Vec<ItemStack>,
    pub linh_thach: u64,
    pub messages: Vec<String>,
}

impl Gains {
    fn receive(world: &mut World, content: &ContentTables, loot: Vec<ItemStack>) -> Self {
        let overflow = world.player.inventory.add_all(&loot);
        let mut gains = Gains::default();
        for stack in loot {
            let dropped: u32 = overflow
                .iter()
                .filter(|o| o.item_id == stack.item_id)
                .map(|o| o.quantity)
                .sum();
            let kept = stack.quantity.saturating_sub(dropped);
            if kept > 0 {
                gains.messages.push(format!(
                    "You obtain {kept}x {}.",
                    content.item_name(&stack.item_id)
                ));
                gains.items.push(ItemStack::new(stack.item_id, kept));
            }
        }
        for stack in &overflow {
            gains.messages.push(format!(
                "Your bag is full; {}x {} is dropped.",
                stack.quantity,
                content.item_name(&stack.item_id)
            ));
        }
        gains.overflow = overflow;
        gains
    }
}

/// The player gathers a visible node on `map_id`. The node is hidden (or
/// deleted, if it never respawns) in the same call that grants the loot.
pub fn harvest_node_for_player(
    world: &mut World,
    content: &ContentTables,
    config: &SimConfig,
    map_id: &str,
    instance_id: u64,
    rng: &mut dyn RngCore,
) -> Result<(Gains, HarvestOutcome), InteractError> {
    let node = world
        .nodes
        .visible_instance(map_id, instance_id)
        .cloned()
        .ok_or_else(|| InteractError::NodeNotFound {
            map_id: map_id.to_string(),
            instance_id,
        })?;
    if node.kind == NodeKind::Farmland {
        return Err(InteractError::Farmland(instance_id));
    }
    let Some(template) = content.template(&node.base_id) else {
        tracing::warn!(base_id = %node.base_id, "harvested node has no template");
        return Err(InteractError::UnknownTemplate(node.base_id));
    };

    let loot = roll_loot(&template.loot, &mut *rng);
    let now = world.current_time;
    let outcome = world.nodes.remove_and_enqueue_respawn(
        map_id,
        instance_id,
        template.respawn,
        config.respawn_multiplier,
        now,
        rng,
    );
    let mut gains = Gains::receive(world, content, loot);
    if gains.items.is_empty() && gains.overflow.is_empty() {
        gains.messages.push(format!("The {} yields nothing.", node.name));
    }
    let message = format!("{} harvested {}.", world.player.name, node.name);
    world.log_event(LogKind::Harvest, None, Some(map_id), message);
    tracing::debug!(map = %map_id, node = instance_id, ?outcome, "player harvested node");
    Ok((gains, outcome))
}

fn farmland_plot(world: &World, map_id: &str, plot_id: u64) -> Result<(), InteractError> {
    let node = world
        .nodes
        .visible_instance(map_id, plot_id)
        .ok_or_else(|| InteractError::NodeNotFound {
            map_id: map_id.to_string(),
            instance_id: plot_id,
        })?;
    if node.kind != NodeKind::Farmland {
        return Err(InteractError::NotFarmland(plot_id));
    }
    Ok(())
}

/// Plant `crop_item_id` on a farmland plot. It is ready to harvest once
/// `growth_minutes` have passed.
pub fn plant_plot(
    world: &mut World,
    content: &ContentTables,
    map_id: &str,
    plot_id: u64,
    crop_item_id: &str,
    growth_minutes: u64,
) -> Result<(), InteractError> {
    farmland_plot(world, map_id, plot_id)?;
    let Some(crop) = content.items.get(crop_item_id) else {
        tracing::warn!(item = %crop_item_id, "cannot plant unknown item");
        return Err(InteractError::UnknownItem(crop_item_id.to_string()));
    };
    let now = world.current_time;
    if !world
        .nodes
        .plant(plot_id, &crop.name, &crop.id, growth_minutes, now)
    {
        return Err(InteractError::AlreadyPlanted(plot_id));
    }
    let message = format!("{} planted {}.", world.player.name, crop.name);
    world.log_event(LogKind::Harvest, None, Some(map_id), message);
    Ok(())
}

/// Harvest a fully grown plot, clearing it for replanting.
pub fn harvest_plot(
    world: &mut World,
    content: &ContentTables,
    map_id: &str,
    plot_id: u64,
    rng: &mut dyn RngCore,
) -> Result<Gains, InteractError> {
    farmland_plot(world, map_id, plot_id)?;
    let view = world.nodes.farmland_view(plot_id, world.current_time);
    if !view.is_planted {
        return Err(InteractError::NotPlanted(plot_id));
    }
    if !view.is_ready {
        return Err(InteractError::NotReady {
            plot_id,
            growth_percent: view.growth_percent,
        });
    }
    let Some(plot) = world.nodes.clear_plot(plot_id) else {
        return Err(InteractError::NotPlanted(plot_id));
    };
    let quantity = rng.random_range(PLOT_YIELD.0..=PLOT_YIELD.1);
    let gains = Gains::receive(
        world,
        content,
        vec![ItemStack::new(plot.crop_item_id, quantity)],
    );
    let message = format!("{} harvested {}.", world.player.name, plot.plant_name);
    world.log_event(LogKind::Harvest, None, Some(map_id), message);
    Ok(gains)
}

/// Ask the narrative service for an encounter and grant what it names.
/// Item names the content tables do not know are skipped.
pub async fn resolve_encounter(
    world: &mut World,
    content: &ContentTables,
    narrative: &NarrativeClient,
    request: &InteractionRequest,
) -> (String, Gains) {
    let payload = narrative.interaction(ENCOUNTER_CALL_SITE, request).await;

    let mut loot = Vec::new();
    for named in &payload.loot {
        if named.quantity == 0 {
            continue;
        }
        match content.item_by_name(&named.item_name) {
            Some(item) => loot.push(ItemStack::new(item.id.clone(), named.quantity)),
            None => tracing::warn!(item_name = %named.item_name, "encounter names an unknown item"),
        }
    }

    let mut gains = Gains::receive(world, content, loot);
    if let Some(stones) = payload.linh_thach.filter(|s| *s > 0) {
        world.player.linh_thach += stones;
        gains.linh_thach = stones;
        gains.messages.push(format!("You receive {stones} spirit stones."));
    }
    let map_id = world.player.current_map.clone();
    world.log_event(
        LogKind::Encounter,
        None,
        Some(&map_id),
        payload.dialogue.clone(),
    );
    (payload.dialogue, gains)
}
