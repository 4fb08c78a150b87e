// Run with:
//   cargo test --features profiling --test profiling
#![cfg(feature = "profiling")]

use ecdb::engine::scheduler::Scheduler;
use ecdb::engine::systems::SystemRegistry;
use ecdb::profiler;

mod common;
use common::*;

#[test]
fn rounds_are_written_as_chrome_trace_events() {
    let path = std::env::temp_dir().join(format!("ecdb-trace-{}.json", std::process::id()));
    profiler::init(&path);
    profiler::thread_name("Main");

    let mut db = Db::new();
    spawn_movers(&mut db, 8);
    let mut systems = SystemRegistry::new();
    systems.add_system(MovementSystem, 0).unwrap();

    {
        let _g = profiler::span("test::rounds").arg("rounds", profiler::Arg::U64(2));
        let scheduler = Scheduler::default();
        scheduler.run(&mut db, &systems).unwrap();
        scheduler.run(&mut db, &systems).unwrap();
    }

    profiler::shutdown().unwrap();

    let trace: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let events = trace["traceEvents"].as_array().unwrap();
    let count = |name: &str| events.iter().filter(|e| e["name"] == name).count();

    assert_eq!(count("Scheduler::round"), 2);
    assert_eq!(count("Scheduler::tier"), 2);
    assert_eq!(count("test::rounds"), 1);
    assert_eq!(count("thread_name"), 1);

    let _ = std::fs::remove_file(&path);
}
