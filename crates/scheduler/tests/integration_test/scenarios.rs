use rota_core::{CommandClass, ConnectionKind, MIN_STRENGTH};
use rota_scheduler::Scheduler;

use crate::helpers::{make_config, test_data_dir};

#[test]
fn default_sequence_admission_scenario() {
    // N = 12 with sequence [0,1,2,3,6,8,9,8,1,2]: the first turn holds one
    // command, the second holds two.
    let data_dir = test_data_dir();
    let scheduler = Scheduler::new(make_config(data_dir.clone())).unwrap();
    scheduler.start();

    assert!(scheduler.submit("status check", CommandClass::System, 5));
    assert!(!scheduler.submit("status check again", CommandClass::System, 5));

    assert!(scheduler.advance_turn());
    assert!(scheduler.submit("status check again", CommandClass::System, 5));
    assert!(scheduler.submit("and another", CommandClass::System, 5));
    assert!(!scheduler.submit("one too many", CommandClass::System, 5));

    scheduler.stop();
    std::fs::remove_dir_all(&data_dir).ok();
}

#[test]
fn progression_follows_the_sequence_across_a_cycle() {
    let data_dir = test_data_dir();
    let scheduler = Scheduler::new(make_config(data_dir.clone())).unwrap();
    scheduler.start();

    let sequence = scheduler.config().progression_sequence.clone();
    let n = scheduler.config().turn_count;
    for i in 0..n {
        let expected = u32::from(sequence[i % sequence.len()]);
        assert_eq!(scheduler.get_current_progression(), expected, "turn {i}");
        scheduler.advance_turn();
    }
    assert_eq!(scheduler.cycle_count(), 1);

    scheduler.stop();
    std::fs::remove_dir_all(&data_dir).ok();
}

#[test]
fn similarity_graph_forms_and_decays_away() {
    let data_dir = test_data_dir();
    let scheduler = Scheduler::new(make_config(data_dir.clone())).unwrap();
    scheduler.start();
    scheduler.advance_turn(); // capacity 2

    scheduler.submit("deploy service", CommandClass::System, 5);
    scheduler.submit("deploy gateway", CommandClass::System, 5);

    let connections = scheduler.connections();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].kind, ConnectionKind::Similarity);
    assert!(connections[0].strength >= MIN_STRENGTH);
    assert!(connections[0].strength <= 1.0);

    for _ in 0..200 {
        scheduler.decay_tick();
    }
    assert_eq!(scheduler.connection_count(), 0);

    scheduler.stop();
    std::fs::remove_dir_all(&data_dir).ok();
}

#[test]
fn visualization_reflects_the_ring() {
    let data_dir = test_data_dir();
    let scheduler = Scheduler::new(make_config(data_dir.clone())).unwrap();
    scheduler.start();
    scheduler.submit("render me", CommandClass::Visualization, 5);

    let text = scheduler.get_visualization();
    assert!(text.contains("turn 0/12"));
    assert!(text.contains("> turn  0"));
    assert!(text.contains("1/1"));
    // reads must not mutate
    assert_eq!(scheduler.get_visualization(), text);

    scheduler.stop();
    std::fs::remove_dir_all(&data_dir).ok();
}
