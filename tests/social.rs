use rand::SeedableRng;
use rand::rngs::SmallRng;

use cultivation_sim::SimConfig;
use cultivation_sim::model::World;
use cultivation_sim::model::time::MINUTES_PER_MONTH;
use cultivation_sim::scenario::{Scenario, standard_content};
use cultivation_sim::sim::{SimSystem, SocialSystem, TickContext};

fn social_pass(world: &mut World, config: &SimConfig, months: u64, seed: u64) {
    let content = standard_content();
    let mut rng = SmallRng::seed_from_u64(seed);
    let now = world.current_time;
    let mut ctx = TickContext {
        world,
        content: &content,
        config,
        rng: &mut rng,
        now,
        elapsed_minutes: months * MINUTES_PER_MONTH,
    };
    SocialSystem.tick(&mut ctx);
}

fn pair() -> (World, u64, u64) {
    let mut s = Scenario::standard();
    let a = s.cultivator("Lin Feng").id();
    let b = s.cultivator("Su Yan").id();
    (s.build(), a, b)
}

/// How many of 300 independent pairs interacted at least once.
fn interacting_pairs(months: u64) -> usize {
    let config = SimConfig::default();
    (0..300)
        .filter(|&seed| {
            let (mut world, a, b) = pair();
            social_pass(&mut world, &config, months, seed);
            world.affinity(a, b) != 0
        })
        .count()
}

#[test]
fn long_steps_compound_the_monthly_chance() {
    let one_month = interacting_pairs(1);
    let one_year = interacting_pairs(12);
    assert!(one_month < 80, "one month: {one_month}");
    assert!(one_year > 220, "one year: {one_year}");
}

#[test]
fn zero_length_steps_change_nothing() {
    let config = SimConfig {
        social_base_chance: 1.0,
        ..SimConfig::default()
    };
    let (mut world, a, b) = pair();
    social_pass(&mut world, &config, 0, 1);
    assert_eq!(world.affinity(a, b), 0);
}

#[test]
fn the_dead_and_monsters_keep_to_themselves() {
    let config = SimConfig {
        social_base_chance: 1.0,
        ..SimConfig::default()
    };
    let mut s = Scenario::standard();
    let a = s.cultivator("Lin Feng").id();
    let fallen = s.cultivator("Su Yan").id();
    let wolf = s.monster("shadow-wolf").id();
    let mut world = s.build();
    world.mark_defeated(fallen);

    social_pass(&mut world, &config, 12, 3);
    assert_eq!(world.affinity(a, fallen), 0);
    assert_eq!(world.affinity(a, wolf), 0);
}
