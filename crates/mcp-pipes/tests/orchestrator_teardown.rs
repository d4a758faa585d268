//! Orchestrator: attribution of cross-session results and LIFO release.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use mcp_pipes::orchestrator::{CapabilityKey, Orchestrator};
use mcp_pipes::providers::{basics, multi};
use mcp_pipes::types::{CapabilityKind, ContentItem, InvocationRequest};

use common::fixtures::{entries, ready_session, CallLog, ScriptedSession};

fn log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

fn scripted(names: &[&str], log: &CallLog) -> Orchestrator<ScriptedSession> {
    let mut orchestrator = Orchestrator::new();
    for name in names {
        orchestrator
            .push(*name, ScriptedSession::new(name, log))
            .unwrap();
    }
    orchestrator
}

#[tokio::test]
async fn test_close_all_is_reverse_acquisition_order() {
    let log = log();
    let mut orchestrator = scripted(&["first", "second", "third"], &log);
    assert_eq!(orchestrator.names(), vec!["first", "second", "third"]);

    let report = orchestrator.close_all().await;
    assert!(report.is_clean());
    assert_eq!(report.order, vec!["third", "second", "first"]);
    assert_eq!(
        entries(&log, ":close"),
        vec!["third:close", "second:close", "first:close"]
    );
    assert!(orchestrator.is_empty());
}

#[tokio::test]
async fn test_failed_close_does_not_stop_teardown() {
    let log = log();
    let mut orchestrator = Orchestrator::new();
    orchestrator.push("a", ScriptedSession::new("a", &log)).unwrap();
    orchestrator
        .push("b", ScriptedSession::new("b", &log).failing_close())
        .unwrap();
    orchestrator.push("c", ScriptedSession::new("c", &log)).unwrap();

    let report = orchestrator.close_all().await;
    assert_eq!(report.order, vec!["c", "b", "a"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].session, "b");
    assert_eq!(entries(&log, ":close"), vec!["c:close", "b:close", "a:close"]);
}

#[tokio::test]
async fn test_newest_session_failing_close_keeps_order() {
    let log = log();
    let mut orchestrator = Orchestrator::new();
    orchestrator.push("a", ScriptedSession::new("a", &log)).unwrap();
    orchestrator.push("b", ScriptedSession::new("b", &log)).unwrap();
    orchestrator
        .push("c", ScriptedSession::new("c", &log).failing_close())
        .unwrap();

    let report = orchestrator.close_all().await;
    assert_eq!(report.order, vec!["c", "b", "a"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].session, "c");
    assert_eq!(entries(&log, ":close"), vec!["c:close", "b:close", "a:close"]);
    assert!(orchestrator.is_empty());
}

#[tokio::test]
async fn test_drop_releases_newest_first() {
    let log = log();
    {
        let _orchestrator = scripted(&["x", "y", "z"], &log);
    }
    assert_eq!(entries(&log, ":drop"), vec!["z:drop", "y:drop", "x:drop"]);
}

#[tokio::test]
async fn test_duplicate_names_rejected() {
    let log = log();
    let mut orchestrator = scripted(&["same"], &log);
    assert!(orchestrator
        .push("same", ScriptedSession::new("same-2", &log))
        .is_err());
    assert_eq!(orchestrator.len(), 1);
}

#[tokio::test]
async fn test_results_are_attributed_per_session() {
    let log = log();
    let mut orchestrator = Orchestrator::new();
    orchestrator
        .push(
            "slow",
            ScriptedSession::new("slow", &log).with_delay(Duration::from_millis(50)),
        )
        .unwrap();
    orchestrator.push("fast", ScriptedSession::new("fast", &log)).unwrap();

    let requests = vec![
        ("slow".to_string(), InvocationRequest::tool("one")),
        ("fast".to_string(), InvocationRequest::tool("two")),
        ("slow".to_string(), InvocationRequest::tool("three")),
        ("fast".to_string(), InvocationRequest::tool("missing")),
        ("nobody".to_string(), InvocationRequest::tool("four")),
    ];
    let results = orchestrator.invoke_all(&requests).await;

    let keys: Vec<CapabilityKey> = results.iter().map(|(k, _)| k.clone()).collect();
    assert_eq!(keys[0].to_string(), "slow/one");
    assert_eq!(keys[4].to_string(), "nobody/four");

    assert_eq!(
        results[0].1.as_ref().unwrap(),
        &vec![ContentItem::text("slow answered one")]
    );
    assert_eq!(
        results[2].1.as_ref().unwrap(),
        &vec![ContentItem::text("slow answered three")]
    );
    assert!(results[3].1.as_ref().unwrap_err().is_unknown_capability());
    assert!(results[4].1.is_err());

    // Within one session, requests ran in the order given.
    assert_eq!(
        entries(&log, "slow:invoke"),
        vec!["slow:invoke:one", "slow:invoke:three"]
    );

    let listed = orchestrator.list_all(CapabilityKind::Tool).await;
    assert_eq!(listed[0].0, "slow");
    assert_eq!(listed[1].1.as_ref().unwrap()[0].identifier, "fast-only");

    orchestrator.close_all().await;
}

#[tokio::test]
async fn test_same_identifier_on_two_providers() {
    // Both providers register `shared`; results must stay apart.
    let registry = |text: &'static str| {
        basics::hello_registry().with(
            mcp_pipes::types::CapabilityDescriptor::tool("shared"),
            mcp_pipes::registry::handler_fn(move |_| async move {
                Ok(vec![ContentItem::text(text)])
            }),
        )
    };

    let mut orchestrator = Orchestrator::new();
    orchestrator
        .push("left", ready_session("left", registry("from left")).await)
        .unwrap();
    orchestrator
        .push("right", ready_session("right", registry("from right")).await)
        .unwrap();
    orchestrator
        .push("a", ready_session("a", multi::server_a_registry()).await)
        .unwrap();

    let requests = vec![
        ("right".to_string(), InvocationRequest::tool("shared")),
        ("left".to_string(), InvocationRequest::tool("shared")),
        (
            "a".to_string(),
            InvocationRequest::prompt("greet-user-a").arg("name", "Ada"),
        ),
    ];
    let results = orchestrator.invoke_all(&requests).await;

    assert_eq!(results[0].0.session, "right");
    assert_eq!(results[0].1.as_ref().unwrap(), &vec![ContentItem::text("from right")]);
    assert_eq!(results[1].1.as_ref().unwrap(), &vec![ContentItem::text("from left")]);
    assert_eq!(
        results[2].1.as_ref().unwrap(),
        &vec![ContentItem::text("[A] Hello, Ada! You're connected to Server A.")]
    );

    let report = orchestrator.close_all().await;
    assert_eq!(report.order, vec!["a", "right", "left"]);
    assert!(report.is_clean());
}
