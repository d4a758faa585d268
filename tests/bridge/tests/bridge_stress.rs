//! Stress tests: many requests, many sessions, large payloads.
//!
//! Bounds are generous; these catch pathological slowdowns, not
//! regressions of a few percent.

use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Map};

use mcp_pipes::config::AssetConfig;
use mcp_pipes::normalize::first_blob;
use mcp_pipes::providers::{self, ProviderKind};
use mcp_pipes::registry::{handler_fn, CapabilityRegistry};
use mcp_pipes::session::{ClientSession, SessionOptions};
use mcp_pipes::transport::Transport;
use mcp_pipes::types::{CapabilityDescriptor, ContentItem, Implementation};
use mcp_pipes::ProtocolHandler;

// ─── Helpers ───────────────────────────────────────────────────────────────

async fn connect_registry(name: &str, registry: CapabilityRegistry) -> ClientSession {
    let handler = ProtocolHandler::new(
        std::sync::Arc::new(registry),
        Implementation::new(name, "stress"),
    );
    let mut session = ClientSession::new(
        Transport::in_process(name, handler),
        SessionOptions::with_timeout(Duration::from_secs(30)),
    );
    session.initialize().await.expect("handshake");
    session
}

// ─── Tests ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_many_sequential_requests() {
    let transport = providers::in_process(ProviderKind::Greet, &AssetConfig::default());
    let mut session = ClientSession::new(transport, SessionOptions::default());
    session.initialize().await.unwrap();

    let start = Instant::now();
    for i in 0..1_000 {
        let mut args = Map::new();
        args.insert("name".into(), json!(format!("n{i}")));
        let items = session.get_prompt("greet-user", args).await.unwrap();
        assert_eq!(
            items[0].as_text().unwrap(),
            format!("Hello, n{i}! Welcome to the MCP world.")
        );
    }
    let elapsed = start.elapsed();
    println!("1000 prompt round trips in {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(30));

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_open_and_close_many_sessions() {
    let start = Instant::now();
    for _ in 0..100 {
        let transport = providers::in_process(ProviderKind::Hello, &AssetConfig::default());
        let mut session = ClientSession::new(transport, SessionOptions::default());
        session.initialize().await.unwrap();
        session.close().await.unwrap();
    }
    println!("100 session lifecycles in {:?}", start.elapsed());
}

#[tokio::test]
async fn test_large_blob_round_trip() {
    // 4 MiB of non-trivial bytes, well past the in-process pipe buffer.
    let payload: Vec<u8> = (0..4 * 1024 * 1024u32).map(|i| (i % 251) as u8).collect();
    let expected = payload.clone();

    let registry = CapabilityRegistry::new().with(
        CapabilityDescriptor::tool("big"),
        handler_fn(move |_| {
            let payload = payload.clone();
            async move { Ok(vec![ContentItem::blob(payload, "application/octet-stream")]) }
        }),
    );
    let mut session = connect_registry("bulk", registry).await;

    let start = Instant::now();
    let items = session.call_tool("big", Map::new()).await.unwrap();
    println!("4 MiB blob in {:?}", start.elapsed());

    let (bytes, mime) = first_blob(&items).expect("Expected a blob");
    assert_eq!(mime, "application/octet-stream");
    assert_eq!(bytes.len(), expected.len());
    assert!(bytes == expected.as_slice());

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_wide_listing() {
    let mut registry = CapabilityRegistry::new();
    for i in 0..500 {
        let text = STANDARD.encode(format!("payload {i}"));
        registry.register(
            CapabilityDescriptor::resource(format!("resource://item-{i}"))
                .with_name(format!("item-{i}")),
            handler_fn(move |_| {
                let text = text.clone();
                async move { Ok(vec![ContentItem::text(text)]) }
            }),
        );
    }
    let mut session = connect_registry("wide", registry).await;

    let listed = session.list_resources().await.unwrap();
    assert_eq!(listed.len(), 500);
    assert_eq!(listed[0].identifier, "resource://item-0");
    assert_eq!(listed[499].identifier, "resource://item-499");

    let items = session.read_resource("resource://item-250").await.unwrap();
    assert_eq!(items[0].as_text().unwrap(), STANDARD.encode("payload 250"));

    session.close().await.unwrap();
}
