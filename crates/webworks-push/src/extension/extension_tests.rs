#![allow(non_snake_case)]

use super::*;
use crate::status::PushStatus;
use crate::test_support::{FakeConnector, START_ARGS, context, drain};
use std::time::Duration;
use test_case::test_case;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Instant, sleep, timeout};
use webworks_core::{ExtensionConfig, RecoveryConfig};

async fn started(
    config: ExtensionConfig,
) -> (
    Arc<FakeConnector>,
    PushExtension,
    ExtensionContext,
    UnboundedReceiver<String>,
) {
    let connector = FakeConnector::new();
    let ext = PushExtension::new(connector.clone());
    let (ctx, mut events) = context(config);
    ext.on_start(&ctx).await.unwrap();
    ext.invoke(&ctx, "startService", START_ARGS).await.unwrap();
    assert_eq!(drain(&mut events), vec!["7 push.create.callback 0"]);
    (connector, ext, ctx, events)
}

async fn wait_for_state(ext: &PushExtension, state: MonitorState) {
    for _ in 0..500 {
        if ext.monitor_state() == Some(state) {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("monitor never reached {state}, stuck in {:?}", ext.monitor_state());
}

async fn next_event(events: &mut UnboundedReceiver<String>, within: Duration) -> String {
    timeout(within, events.recv())
        .await
        .expect("no event in time")
        .expect("event channel closed")
}

#[tokio::test]
async fn PushExtension___invoke_before_start___is_invalid_state() {
    let ext = PushExtension::new(FakeConnector::new());
    let (ctx, _events) = context(ExtensionConfig::default());

    let err = ext.invoke(&ctx, "createChannel", "").await.unwrap_err();

    assert_eq!(err.error_code(), 1);
}

#[tokio::test]
async fn PushExtension___on_start_twice___fails() {
    let ext = PushExtension::new(FakeConnector::new());
    let (ctx, _events) = context(ExtensionConfig::default());

    ext.on_start(&ctx).await.unwrap();
    let err = ext.on_start(&ctx).await.unwrap_err();

    assert!(matches!(err, ExtensionError::InvalidState { .. }));
}

#[tokio::test]
async fn PushExtension___channel_request_before_start_service___is_not_started() {
    let ext = PushExtension::new(FakeConnector::new());
    let (ctx, _events) = context(ExtensionConfig::default());
    ext.on_start(&ctx).await.unwrap();

    let err = ext.invoke(&ctx, "createChannel", "").await.unwrap_err();

    assert_eq!(err.error_code(), 1);
    assert!(err.to_string().contains("no push service"));
}

#[tokio::test]
async fn PushExtension___unknown_command___is_rejected() {
    let (_connector, ext, ctx, _events) = started(ExtensionConfig::default()).await;

    let err = ext.invoke(&ctx, "launchMissiles", "").await.unwrap_err();

    assert!(matches!(err, ExtensionError::UnknownCommand(ref c) if c == "launchMissiles"));
}

#[test_case("startService", "not json" ; "start service garbage")]
#[test_case("startService", r#"{"appId":"1-abc"}"# ; "start service missing target")]
#[test_case("acknowledge", r#"{"id":"p-1"}"# ; "acknowledge missing decision")]
#[test_case("extractPushPayload", "{}" ; "extract missing data")]
#[tokio::test]
async fn PushExtension___malformed_arguments___are_invalid_arguments(command: &str, args: &str) {
    let (_connector, ext, ctx, _events) = started(ExtensionConfig::default()).await;

    let err = ext.invoke(&ctx, command, args).await.unwrap_err();

    assert_eq!(err.error_code(), 7);
}

#[tokio::test]
async fn PushExtension___start_service___passes_options_to_connector() {
    let (connector, ext, _ctx, _events) = started(ExtensionConfig::default()).await;

    let options = &connector.options()[0];
    assert_eq!(options.app_id, "1-RDce63it6363");
    assert_eq!(options.invoke_target_id, "sample.pushcapture.invoke.push");
    assert_eq!(options.ppg_url, "http://cp.pushapi.na.blackberry.com");
    assert_eq!(ext.monitor_state(), Some(MonitorState::Watching));
}

#[tokio::test]
async fn PushExtension___channel_commands___emit_completions() {
    let (connector, ext, ctx, mut events) = started(ExtensionConfig::default()).await;

    assert_eq!(ext.invoke(&ctx, "createChannel", "").await.unwrap(), "");
    ext.invoke(&ctx, "destroyChannel", "").await.unwrap();

    assert_eq!(
        drain(&mut events),
        vec![
            "7 push.createChannel.callback 0 token-1",
            "7 push.destroyChannel.callback 0",
        ]
    );
    assert_eq!(
        connector.service().calls(),
        vec![
            "createSession",
            "createChannel http://cp.pushapi.na.blackberry.com",
            "destroyChannel",
        ]
    );
}

#[tokio::test]
async fn PushExtension___launch_registration___reports_under_one_event() {
    let (_connector, ext, ctx, mut events) = started(ExtensionConfig::default()).await;

    ext.invoke(&ctx, "registerToLaunch", "").await.unwrap();
    ext.invoke(&ctx, "unregisterFromLaunch", "").await.unwrap();

    assert_eq!(
        drain(&mut events),
        vec![
            "7 push.launchApplicationOnPush.callback 0",
            "7 push.launchApplicationOnPush.callback 502",
        ]
    );
}

#[tokio::test]
async fn PushExtension___acknowledge___accepts_or_rejects() {
    let (connector, ext, ctx, _events) = started(ExtensionConfig::default()).await;

    ext.invoke(&ctx, "acknowledge", r#"{"id":"p-1","shouldAcceptPush":true}"#)
        .await
        .unwrap();
    ext.invoke(&ctx, "acknowledge", r#"{"id":"p-2","shouldAcceptPush":false}"#)
        .await
        .unwrap();

    let calls = connector.service().calls();
    assert_eq!(&calls[1..], ["accept p-1", "reject p-2"]);
}

#[tokio::test]
async fn PushExtension___extract_push_payload___returns_json() {
    let (_connector, ext, ctx, _events) = started(ExtensionConfig::default()).await;

    let json = ext
        .invoke(&ctx, "extractPushPayload", r#"{"data":"cHVzaDpvaw=="}"#)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["valid"], true);
    assert_eq!(value["isAckRequired"], true);
    assert_eq!(value["data"], serde_json::json!([111, 107]));
}

#[tokio::test(start_paused = true)]
async fn PushExtension___service_notifications___arrive_as_events() {
    let (connector, _ext, _ctx, mut events) = started(ExtensionConfig::default()).await;
    let service = connector.service();

    service.send(b"S");
    assert_eq!(
        next_event(&mut events, Duration::from_secs(1)).await,
        "7 push.create.simChangeCallback"
    );

    service.send(b"T");
    assert_eq!(
        next_event(&mut events, Duration::from_secs(1)).await,
        "7 push.create.pushTransportReadyCallback 1"
    );
}

#[tokio::test(start_paused = true)]
async fn PushExtension___dropped_connection___recovers_and_reports_ready() {
    let (connector, ext, ctx, mut events) = started(ExtensionConfig::default()).await;
    let service = connector.service();
    service.next_channel_result(PushStatus::CONNECTION_CLOSED);
    ext.invoke(&ctx, "createChannel", "").await.unwrap();
    assert_eq!(
        drain(&mut events),
        vec!["7 push.createChannel.callback 501 "]
    );

    service.drop_peer();
    wait_for_state(&ext, MonitorState::Recovering).await;
    service.reconnect();

    assert_eq!(
        next_event(&mut events, Duration::from_secs(10)).await,
        "7 push.create.pushServiceConnectionReadyCallback 1"
    );
    wait_for_state(&ext, MonitorState::Watching).await;
    assert_eq!(service.count("createSession"), 2);
    assert_eq!(connector.connections(), 1);
}

#[tokio::test(start_paused = true)]
async fn PushExtension___service_down_for_a_while___is_polled_with_backoff() {
    let config = ExtensionConfig {
        recovery: RecoveryConfig::new(5, 60),
        ..ExtensionConfig::default()
    };
    let (connector, ext, ctx, mut events) = started(config).await;
    let service = connector.service();
    service.next_channel_result(PushStatus::CONNECTION_CLOSED);
    ext.invoke(&ctx, "createChannel", "").await.unwrap();
    drain(&mut events);

    service.drop_peer();
    wait_for_state(&ext, MonitorState::Recovering).await;
    let lost_at = Instant::now();

    // Down through the 5s and 15s checks, back before the 35s one.
    sleep(Duration::from_secs(20)).await;
    assert_eq!(ext.monitor_state(), Some(MonitorState::Recovering));
    assert!(drain(&mut events).is_empty());
    service.reconnect();

    assert_eq!(
        next_event(&mut events, Duration::from_secs(60)).await,
        "7 push.create.pushServiceConnectionReadyCallback 1"
    );
    let waited = lost_at.elapsed();
    assert!(waited >= Duration::from_secs(34), "restored after {waited:?}");
    assert!(waited < Duration::from_secs(36), "restored after {waited:?}");
}

#[tokio::test(start_paused = true)]
async fn PushExtension___restore_without_failed_request___is_silent() {
    let (connector, ext, _ctx, mut events) = started(ExtensionConfig::default()).await;
    let service = connector.service();

    service.drop_peer();
    wait_for_state(&ext, MonitorState::Recovering).await;
    service.reconnect();

    // Initial interval is 2s.
    sleep(Duration::from_secs(3)).await;
    wait_for_state(&ext, MonitorState::Watching).await;
    assert_eq!(service.count("createSession"), 2);
    assert!(drain(&mut events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn PushExtension___on_stop___shuts_down_monitor_and_service() {
    let (connector, ext, ctx, _events) = started(ExtensionConfig::default()).await;

    ext.on_stop(&ctx).await.unwrap();

    assert_eq!(ext.monitor_state(), None);
    let err = ext.invoke(&ctx, "createChannel", "").await.unwrap_err();
    assert_eq!(err.error_code(), 1);
    assert_eq!(connector.service().calls(), vec!["createSession"]);
}

#[tokio::test(start_paused = true)]
async fn PushExtension___on_stop_during_recovery___stops_polling() {
    let (connector, ext, ctx, _events) = started(ExtensionConfig::default()).await;
    let service = connector.service();
    service.drop_peer();
    wait_for_state(&ext, MonitorState::Recovering).await;

    ext.on_stop(&ctx).await.unwrap();
    service.reconnect();
    sleep(Duration::from_secs(120)).await;

    assert_eq!(service.count("createSession"), 1);
}

#[test]
fn PushExtension___metadata___names_push_class() {
    let ext = PushExtension::new(FakeConnector::new());

    let metadata = ext.metadata().unwrap();
    assert_eq!(metadata.name, PUSH_CLASS);
    assert_eq!(ext.supported_commands().len(), 7);
    assert!(ext.supported_commands().contains(&"extractPushPayload"));
}
