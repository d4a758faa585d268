//! Client sessions against in-process providers: handshake, listing,
//! invocation, failure classes and closing.

mod common;

use std::time::Duration;

use serde_json::Map;

use mcp_pipes::providers::{ocr, ProviderKind};
use mcp_pipes::registry::{handler_fn, CapabilityRegistry};
use mcp_pipes::session::SessionOptions;
use mcp_pipes::transport::Transport;
use mcp_pipes::types::{
    CapabilityDescriptor, CapabilityKind, ContentItem, ErrorKind, InvocationRequest, McpError,
    ProtocolError, SessionState, TransportError,
};
use mcp_pipes::ClientSession;
use mcp_pipes_tools::OcrEngine;
use tokio_test::{assert_err, assert_ok};

use common::fixtures::{ready_builtin, ready_session, session_for};

#[tokio::test]
async fn test_handshake_reports_provider_identity() {
    let mut session = session_for(
        "greet",
        mcp_pipes::providers::basics::greet_registry(),
        SessionOptions::default(),
    );
    assert_eq!(session.state(), SessionState::Created);

    let server = session.initialize().await.unwrap();
    assert_eq!(server.server_info.name, "greet");
    assert_eq!(server.capabilities.declared_kinds(), vec![CapabilityKind::Prompt]);
    assert_eq!(session.state(), SessionState::Ready);

    // A second handshake on the same session is a state error.
    let err = session.initialize().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
}

#[tokio::test]
async fn test_operations_require_ready_session() {
    let mut session = session_for(
        "hello",
        mcp_pipes::providers::basics::hello_registry(),
        SessionOptions::default(),
    );
    let err = session.list_resources().await.unwrap_err();
    assert!(matches!(
        err,
        McpError::InvalidState {
            state: SessionState::Created,
            ..
        }
    ));

    session.initialize().await.unwrap();
    session.close().await.unwrap();
    let err = session.read_resource("resource://hello").await.unwrap_err();
    assert!(matches!(
        err,
        McpError::InvalidState {
            state: SessionState::Closed,
            ..
        }
    ));
    // Closing again is a no-op.
    assert_ok!(session.close().await);
}

#[tokio::test]
async fn test_list_and_invoke_builtin_providers() {
    let mut greet = ready_builtin(ProviderKind::Greet).await;
    let prompts = greet.list_prompts().await.unwrap();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].identifier, "greet-user");
    assert!(!prompts[0].arguments[0].required);

    let items = greet
        .invoke(&InvocationRequest::prompt("greet-user").arg("name", "Ada"))
        .await
        .unwrap();
    assert_eq!(items, vec![ContentItem::text("Hello, Ada! Welcome to the MCP world.")]);

    let items = greet.get_prompt("greet-user", Map::new()).await.unwrap();
    assert_eq!(items, vec![ContentItem::text("Hello, stranger! Welcome to the MCP world.")]);

    let mut hello = ready_builtin(ProviderKind::Hello).await;
    let resources = hello.list_resources().await.unwrap();
    assert_eq!(resources[0].label(), "Hello Resource (resource://hello)");
    assert_eq!(resources[0].mime_type.as_deref(), Some("text/plain"));
    assert!(hello.list_tools().await.unwrap().is_empty());

    greet.close().await.unwrap();
    hello.close().await.unwrap();
}

#[tokio::test]
async fn test_unknown_capability_keeps_session_usable() {
    let mut session = ready_builtin(ProviderKind::Hello).await;

    let err = session.read_resource("resource://missing").await.unwrap_err();
    assert!(err.is_unknown_capability());
    match err {
        McpError::Protocol(ProtocolError::UnknownCapability { kind, name }) => {
            assert_eq!(kind, CapabilityKind::Resource);
            assert_eq!(name, "resource://missing");
        }
        other => panic!("unexpected error {other:?}"),
    }

    assert_eq!(session.state(), SessionState::Ready);
    assert_ok!(session.ping().await);
    let items = assert_ok!(session.read_resource("resource://hello").await);
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_tool_failure_is_execution_error() {
    let registry = CapabilityRegistry::new().with(
        CapabilityDescriptor::tool("explode"),
        handler_fn(|_| async { Err(McpError::ToolExecution("kaboom".into())) }),
    );
    let mut session = ready_session("faulty", registry).await;

    let err = session.call_tool("explode", Map::new()).await.unwrap_err();
    assert!(matches!(&err, McpError::ToolExecution(m) if m == "kaboom"));
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn test_tool_result_keeps_item_order() {
    let registry = CapabilityRegistry::new().with(
        CapabilityDescriptor::tool("chart"),
        handler_fn(|_| async {
            Ok(vec![
                ContentItem::text("Figure 1: revenue"),
                ContentItem::blob(vec![9], "image/png"),
                ContentItem::text("Source: finance"),
            ])
        }),
    );
    let mut session = ready_session("charts", registry).await;

    let items = session.call_tool("chart", Map::new()).await.unwrap();
    assert_eq!(
        items,
        vec![
            ContentItem::text("Figure 1: revenue"),
            ContentItem::blob(vec![9], "image/png"),
            ContentItem::text("Source: finance"),
        ]
    );
}

#[tokio::test]
async fn test_timeout_closes_session() {
    let registry = CapabilityRegistry::new().with(
        CapabilityDescriptor::tool("slow"),
        handler_fn(|_| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec![ContentItem::text("late")])
        }),
    );
    let mut session = session_for(
        "slow",
        registry,
        SessionOptions::with_timeout(Duration::from_millis(200)),
    );
    session.initialize().await.unwrap();

    let err = session.call_tool("slow", Map::new()).await.unwrap_err();
    assert!(matches!(
        err,
        McpError::Transport(TransportError::TimedOut { ref method, .. }) if method == "tools/call"
    ));
    assert_eq!(session.state(), SessionState::Closed);
    assert_err!(session.ping().await);
}

#[tokio::test]
async fn test_provider_exit_is_closed_transport() {
    // Provider end dropped straight away: the handshake sees EOF.
    let (client, provider) = tokio::io::duplex(1024);
    drop(provider);
    let (read, write) = tokio::io::split(client);
    let mut session = ClientSession::new(
        Transport::from_pipes("gone", read, write),
        SessionOptions::default(),
    );

    let err = session.initialize().await.unwrap_err();
    assert!(matches!(err, McpError::Protocol(ProtocolError::Handshake(_))));
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn test_missing_ocr_binary_degrades_to_mock() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("invoice.png");
    std::fs::write(&image, b"not really a png").unwrap();

    let registry = ocr::registry_with(OcrEngine::with_binary(dir.path().join("no-tesseract")));
    let mut session = ready_session("ocr-server", registry).await;

    let mut args = Map::new();
    args.insert("image_path".into(), image.display().to_string().into());
    let items = session.call_tool(ocr::TOOL_NAME, args).await.unwrap();
    let text = items[0].as_text().unwrap();
    assert!(text.contains("Tesseract binary not found"));
    assert!(text.contains("Invoice #12345"));

    // A missing input is not a dependency problem and is not mocked.
    let mut args = Map::new();
    args.insert("image_path".into(), "/nonexistent/scan.png".into());
    let err = session.call_tool(ocr::TOOL_NAME, args).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Argument);
}

#[tokio::test]
async fn test_report_logo_arrives_as_blob() {
    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.png");
    std::fs::write(&logo, b"\x89PNG\r\n\x1a\nlogo").unwrap();
    let assets = mcp_pipes::config::AssetConfig {
        logo: Some(logo),
        ..Default::default()
    };

    let transport = mcp_pipes::providers::in_process(ProviderKind::Report, &assets);
    let mut session = ClientSession::new(transport, SessionOptions::default());
    session.initialize().await.unwrap();

    let items = session.read_resource("resource://logo").await.unwrap();
    assert_eq!(items[0], ContentItem::blob(b"\x89PNG\r\n\x1a\nlogo".to_vec(), "image/png"));
    session.close().await.unwrap();
}
