use std::path::PathBuf;

use uuid::Uuid;

use rota_core::SchedulerConfig;

/// Create a unique temp directory for each test.
pub fn test_data_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("rota-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Test configuration with timers pushed far out so nothing advances or
/// snapshots behind the test's back.
pub fn make_config(data_dir: PathBuf) -> SchedulerConfig {
    SchedulerConfig {
        turn_duration_seconds: 3600,
        snapshot_interval_seconds: 3600,
        data_dir,
        ..SchedulerConfig::default()
    }
}
