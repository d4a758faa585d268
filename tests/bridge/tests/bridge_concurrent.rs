//! Concurrent clients: several agents driving providers at the same time.
//!
//! Each agent owns its sessions; nothing is shared between agents except the
//! provider code itself.

use std::sync::Arc;
use tokio::sync::Barrier;

use mcp_pipes::config::AssetConfig;
use mcp_pipes::orchestrator::Orchestrator;
use mcp_pipes::providers::{self, ProviderKind};
use mcp_pipes::session::{ClientSession, SessionOptions};
use mcp_pipes::types::{
    ContentItem, InvocationRequest, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest,
    RequestId,
};
use serde_json::json;

// ─── Helpers ───────────────────────────────────────────────────────────────

async fn connect(kind: ProviderKind) -> ClientSession {
    let transport = providers::in_process(kind, &AssetConfig::default());
    let mut session = ClientSession::new(transport, SessionOptions::default());
    session.initialize().await.expect("handshake");
    session
}

fn text(items: &[ContentItem]) -> &str {
    items
        .first()
        .and_then(ContentItem::as_text)
        .expect("Expected text content")
}

// ─── Tests ─────────────────────────────────────────────────────────────────

/// Five agents, each with its own pair of sessions, start together.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_agents() {
    let barrier = Arc::new(Barrier::new(5));
    let mut handles = vec![];

    for agent_num in 0..5u32 {
        let barrier_clone = barrier.clone();

        handles.push(tokio::spawn(async move {
            barrier_clone.wait().await; // Synchronize start

            let mut orchestrator = Orchestrator::new();
            orchestrator
                .push("server-a", connect(ProviderKind::ServerA).await)
                .unwrap();
            orchestrator
                .push("server-b", connect(ProviderKind::ServerB).await)
                .unwrap();

            let name = format!("agent-{agent_num}");
            let requests = vec![
                (
                    "server-a".to_string(),
                    InvocationRequest::prompt("greet-user-a").arg("name", name.as_str()),
                ),
                (
                    "server-b".to_string(),
                    InvocationRequest::prompt("greet-user-b").arg("name", name.as_str()),
                ),
            ];
            let results = orchestrator.invoke_all(&requests).await;

            let a = results[0].1.as_ref().unwrap();
            assert_eq!(
                text(a),
                format!("[A] Hello, {name}! You're connected to Server A.")
            );
            let b = results[1].1.as_ref().unwrap();
            assert!(text(b).starts_with(&format!("[B] Hi {name}!")));

            let report = orchestrator.close_all().await;
            assert!(report.is_clean());
            assert_eq!(report.order, vec!["server-b", "server-a"]);

            agent_num
        }));
    }

    for handle in handles {
        let agent_num = handle.await.unwrap();
        println!("Agent {} completed successfully", agent_num);
    }
}

/// One provider handler answering interleaved requests from many tasks.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_handler_interleaved_requests() {
    let handler = Arc::new(providers::handler(ProviderKind::Greet, &AssetConfig::default()));

    handler
        .handle_message(JsonRpcMessage::Request(JsonRpcRequest::new(
            RequestId::Number(0),
            "initialize",
            Some(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "test", "version": "1.0"}
            })),
        )))
        .await;
    handler
        .handle_message(JsonRpcMessage::Notification(JsonRpcNotification::new(
            "notifications/initialized",
            None,
        )))
        .await;

    let mut handles = vec![];
    for i in 0..20i64 {
        let handler = Arc::clone(&handler);
        handles.push(tokio::spawn(async move {
            let response = handler
                .handle_message(JsonRpcMessage::Request(JsonRpcRequest::new(
                    RequestId::Number(i + 1),
                    "prompts/get",
                    Some(json!({
                        "name": "greet-user",
                        "arguments": {"name": format!("caller-{i}")}
                    })),
                )))
                .await
                .unwrap();
            (i, response)
        }));
    }

    for handle in handles {
        let (i, response) = handle.await.unwrap();
        assert_eq!(response["id"], i + 1);
        assert_eq!(
            response["result"]["messages"][0]["content"]["text"],
            format!("Hello, caller-{i}! Welcome to the MCP world.")
        );
    }
}

/// Closing one session leaves its neighbours untouched.
#[tokio::test]
async fn test_close_is_isolated() {
    let mut a = connect(ProviderKind::Hello).await;
    let mut b = connect(ProviderKind::Hello).await;

    a.close().await.unwrap();
    assert!(a.ping().await.is_err());

    let items = b.read_resource("resource://hello").await.unwrap();
    assert_eq!(text(&items), "A simple resource that just says hello!");
    b.close().await.unwrap();
}
