#![allow(non_snake_case)]

use super::*;

// RuntimeConfig tests

#[test]
fn RuntimeConfig___default___has_expected_values() {
    let config = RuntimeConfig::default();

    assert!(config.worker_threads.is_none());
    assert_eq!(config.thread_name, "webworks-ext");
    assert_eq!(config.max_blocking_threads, 64);
    assert_eq!(config.shutdown_grace, Duration::from_secs(1));
}

#[test]
fn RuntimeConfig___builder_chain___combines_options() {
    let config = RuntimeConfig::new()
        .with_worker_threads(2)
        .with_thread_name("push-worker")
        .with_shutdown_grace(Duration::from_millis(50));

    assert_eq!(config.worker_threads, Some(2));
    assert_eq!(config.thread_name, "push-worker");
    assert_eq!(config.shutdown_grace, Duration::from_millis(50));
}

// AsyncRuntime tests

#[test]
fn AsyncRuntime___with_defaults___not_shutting_down() {
    let runtime = AsyncRuntime::with_defaults().unwrap();

    assert!(!runtime.is_shutting_down());
}

#[test]
fn AsyncRuntime___block_on___runs_future() {
    let runtime = AsyncRuntime::new(RuntimeConfig::new().with_worker_threads(1)).unwrap();

    let value = runtime.block_on(async {
        tokio::time::sleep(Duration::from_millis(1)).await;
        7
    });

    assert_eq!(value, 7);
}

#[test]
fn AsyncRuntime___spawn___task_completes() {
    let runtime = AsyncRuntime::new(RuntimeConfig::new().with_worker_threads(1)).unwrap();

    let task = runtime.spawn(async { "done" });

    assert_eq!(runtime.block_on(task).unwrap(), "done");
}

#[test]
fn AsyncRuntime___shutdown___fires_signal() {
    let runtime = AsyncRuntime::with_defaults().unwrap();
    let signal = runtime.shutdown_signal();

    runtime.shutdown();

    assert!(runtime.is_shutting_down());
    assert!(signal.is_triggered());
}

#[test]
fn AsyncRuntime___drop___fires_signal() {
    let runtime = AsyncRuntime::with_defaults().unwrap();
    let signal = runtime.shutdown_signal();

    drop(runtime);

    assert!(signal.is_triggered());
}
