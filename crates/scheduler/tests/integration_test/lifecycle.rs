use std::time::Duration;

use rota_core::{CommandClass, SchedulerConfig};
use rota_scheduler::{Phase, Scheduler};

use crate::helpers::{make_config, test_data_dir};

#[test]
fn heartbeat_advances_turns_on_wall_clock() {
    let data_dir = test_data_dir();
    let config = SchedulerConfig {
        turn_duration_seconds: 1,
        ..make_config(data_dir.clone())
    };
    let scheduler = Scheduler::new(config).unwrap();
    scheduler.start();
    scheduler.submit("ticking along", CommandClass::System, 5);

    // Two turn durations plus generous slack for the 250ms heartbeat.
    std::thread::sleep(Duration::from_millis(2600));

    let counters = scheduler.counters();
    assert!(
        counters.turns_completed >= 1,
        "expected at least one completed turn, got {}",
        counters.turns_completed
    );
    // the flushed command was executed at the first turn boundary
    assert_eq!(counters.commands_executed, 1);

    scheduler.stop();
    std::fs::remove_dir_all(&data_dir).ok();
}

#[test]
fn stop_halts_the_heartbeat() {
    let data_dir = test_data_dir();
    let config = SchedulerConfig {
        turn_duration_seconds: 1,
        ..make_config(data_dir.clone())
    };
    let scheduler = Scheduler::new(config).unwrap();
    scheduler.start();
    scheduler.stop();
    assert_eq!(scheduler.phase(), Phase::Stopped);

    let turn_after_stop = scheduler.current_turn();
    std::thread::sleep(Duration::from_millis(1600));
    assert_eq!(scheduler.current_turn(), turn_after_stop);

    std::fs::remove_dir_all(&data_dir).ok();
}

#[test]
fn stop_writes_a_final_snapshot() {
    let data_dir = test_data_dir();
    let scheduler = Scheduler::new(make_config(data_dir.clone())).unwrap();
    scheduler.start();
    scheduler.submit("persist me", CommandClass::Data, 5);
    scheduler.stop();

    assert!(data_dir.join("scheduler").join("current.json").exists());

    std::fs::remove_dir_all(&data_dir).ok();
}

#[test]
fn resume_latest_restores_stopped_state() {
    let data_dir = test_data_dir();
    let config = make_config(data_dir.clone());

    let first = Scheduler::new(config.clone()).unwrap();
    first.start();
    first.advance_turn();
    first.advance_turn();
    first.stop();
    let turn_before = first.current_turn();
    drop(first);

    let second = Scheduler::new(config).unwrap();
    assert!(second.resume_latest().unwrap());
    assert_eq!(second.current_turn(), turn_before);
    assert_eq!(second.phase(), Phase::Idle);

    std::fs::remove_dir_all(&data_dir).ok();
}
