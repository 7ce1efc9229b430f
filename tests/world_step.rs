mod common;

use std::ops::ControlFlow;

use common::{MONTH, dwell, intent_at, orchestrator, send};
use cultivation_sim::model::time::MINUTES_PER_DAY;
use cultivation_sim::model::*;
use cultivation_sim::scenario::Scenario;
use cultivation_sim::store::{JsonFileStore, StateStore};

#[test]
fn npc_crosses_maps_and_changes_collection_after_the_step() {
    let mut s = Scenario::standard();
    let id = s.cultivator("Lin Feng").id();
    let (mut world, content) = s.build_with_content();
    let cave = content.map("peak").unwrap().poi("cloud-cave").unwrap().position;
    send(&mut world, &content, id, IntentKind::Meditate, "peak", cave, 2);
    let mut orch = orchestrator(content, 1);

    // 150 of the 240 pixels to the mountain pass.
    let report = orch.step(&mut world, 30);
    assert_eq!(world.npc(id).unwrap().current_map, "valley");
    assert!(report.relocations.is_empty());

    let report = orch.step(&mut world, 120);
    let npc = world.npc(id).unwrap();
    assert_eq!(npc.current_map, "peak");
    assert_eq!(npc.position, cave);
    assert!(matches!(npc.activity, Activity::Dwelling { .. }));
    assert_eq!(
        report.relocations,
        vec![Relocation { npc_id: id, from: "valley".into(), to: "peak".into() }]
    );
    assert_eq!(world.npcs_on_map("peak"), &[id]);
    assert!(world.npcs_on_map("valley").is_empty());
}

#[test]
fn gathering_consumes_a_node_that_later_respawns() {
    let mut s = Scenario::standard();
    let id = s.cultivator("Su Yan").id();
    let (mut world, content) = s.build_with_content();
    let field = content.map("valley").unwrap().area("spirit-field").unwrap().bounds.center();
    dwell(
        &mut world,
        id,
        intent_at(
            IntentKind::Gather { target: GatherTarget::Herb },
            "valley",
            Some("spirit-field"),
            field,
        ),
    );
    let mut orch = orchestrator(content, 3);

    orch.step(&mut world, 1);
    let npc = world.npc(id).unwrap();
    assert_eq!(npc.inventory.count("spirit-grass"), 2);
    assert_eq!(npc.phase(world.current_time), NpcPhase::Resting);
    assert_eq!(world.nodes.respawn_queue().len(), 1);
    let gathered = world.nodes.respawn_queue()[0].original_id;
    assert!(world.nodes.visible_instance("valley", gathered).is_none());
    assert_eq!(world.nodes.visible_in_area("valley", "spirit-field", NodeKind::Herb).len(), 2);
    assert_eq!(world.log.of_kind(LogKind::IntentCompleted).count(), 1);

    // The longest spirit-grass window is three days.
    orch.step(&mut world, 3 * MINUTES_PER_DAY);
    assert!(world.nodes.respawn_queue().is_empty());
    assert!(world.nodes.visible_instance("valley", gathered).is_some());
}

#[test]
fn long_runs_keep_world_invariants() {
    let mut s = Scenario::standard();
    for name in ["Lin Feng", "Su Yan", "Wei Lan", "Gu Yue", "Bai Xue", "Mo Chen"] {
        s.cultivator(name);
    }
    s.cultivator("Old Master").member("azure-sect", "Leader", 100).realm(3, 2);
    let world = s.run(36, 21);

    for (map_id, ids) in &world.npcs_by_map {
        for id in ids {
            assert_eq!(&world.npc(*id).unwrap().current_map, map_id);
        }
    }
    let indexed: usize = world.npcs_by_map.values().map(Vec::len).sum();
    assert_eq!(indexed, world.npcs.len());

    for map_id in ["valley", "peak"] {
        for node in world.nodes.all_instances(map_id) {
            let visible = world.nodes.visible_instance(map_id, node.id).is_some();
            assert_ne!(visible, world.nodes.is_queued(node.id));
        }
    }
    assert!(world.affinities.values().all(|v| (-100..=100).contains(v)));
    assert!(world.log.of_kind(LogKind::IntentStarted).count() > 0);
}

#[test]
fn seclusion_saves_each_month_and_can_be_cancelled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("world.json");
    let mut store = JsonFileStore::new(&path);
    let mut s = Scenario::standard();
    s.cultivator("Lin Feng");
    s.cultivator("Su Yan");
    let (world, content) = s.build_with_content();
    let start = world.current_time;
    store.save(&world).unwrap();
    let mut orch = orchestrator(content, 5);

    let report = orch
        .run_seclusion(&mut store, 6, |p| {
            assert_eq!(p.total, 6);
            if p.completed == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();
    assert!(report.cancelled);
    assert_eq!(report.months_completed, 2);
    assert_eq!(store.load().unwrap().current_time, start.advance_months(2));

    let report = orch
        .run_seclusion(&mut store, 3, |_| ControlFlow::Continue(()))
        .unwrap();
    assert!(!report.cancelled);
    assert_eq!(report.ended_at, start.advance_months(5));
    assert_eq!(store.load().unwrap().current_time, start.advance_months(5));
    assert!(!dir.path().join("world.json.tmp").exists());
}

#[test]
fn tick_round_trips_through_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("world.json"));
    let mut s = Scenario::standard();
    let id = s.cultivator("Lin Feng").id();
    let (world, content) = s.build_with_content();
    let start = world.current_time;
    store.save(&world).unwrap();

    let mut orch = orchestrator(content, 8);
    let report = orch.tick(&mut store, MONTH).unwrap();
    assert_eq!(report.started_at, start);

    let saved = store.load().unwrap();
    assert_eq!(saved.current_time, start.advance_months(1));
    assert_ne!(saved.npc(id).unwrap().phase(saved.current_time), NpcPhase::Idle);
}
