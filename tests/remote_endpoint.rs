//! Remote path against a canned one-connection HTTP listener: the
//! 200/400/500 contract of `POST /api/v1/ai/filter` end to end.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use storefront_search::search::local::ChatModelFactory;
use storefront_search::search::remote::{ConfigError, RemoteError, RemoteInferenceAdapter};
use storefront_search::{
    CatalogSnapshot, ChatModel, LocalInferenceAdapter, Product, Query, QueryResolver,
    SearchConfig, SearchSource,
};

fn catalog() -> CatalogSnapshot {
    CatalogSnapshot::new(vec![
        Product {
            id: 1,
            title: "Red Shirt".into(),
            price: 19.99,
            description: "Comfortable cotton shirt".into(),
            category: "men's clothing".into(),
            image: "img1".into(),
        },
        Product {
            id: 2,
            title: "Gold Ring".into(),
            price: 149.0,
            description: "A classic band".into(),
            category: "jewelery".into(),
            image: "img2".into(),
        },
    ])
}

fn gold_ring_json() -> serde_json::Value {
    json!({
        "id": 2,
        "title": "Gold Ring",
        "price": 149.0,
        "description": "A classic band",
        "category": "jewelery",
        "image": "img2"
    })
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Bind an ephemeral port, answer exactly one request with the canned
/// status and body, then close.
async fn serve_once(status_line: &'static str, body: String) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        // Drain the request: headers, then content-length worth of body.
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(header_end) = find_subsequence(&buf, b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
    });

    addr
}

fn adapter_for(addr: SocketAddr) -> RemoteInferenceAdapter {
    RemoteInferenceAdapter::new(format!("http://{addr}"), &SearchConfig::default()).unwrap()
}

struct ScriptedModel {
    reply: String,
}

impl ChatModel for ScriptedModel {
    fn id(&self) -> &str {
        "scripted"
    }
    fn complete(&self, _: &str, _: &str) -> anyhow::Result<String> {
        Ok(self.reply.clone())
    }
}

fn scripted_local(reply: &str) -> ChatModelFactory {
    let reply = reply.to_string();
    Box::new(move || {
        Ok(Arc::new(ScriptedModel {
            reply: reply.clone(),
        }) as Arc<dyn ChatModel>)
    })
}

fn silent_local() -> ChatModelFactory {
    scripted_local("[]")
}

fn resolver_for(addr: SocketAddr) -> QueryResolver {
    let config = SearchConfig {
        remote_endpoint: Some(format!("http://{addr}")),
        ..SearchConfig::default()
    };
    QueryResolver::new(config, Arc::new(LocalInferenceAdapter::new(silent_local()))).unwrap()
}

#[tokio::test]
async fn catalog_fetch_parses_the_product_array() {
    let body = json!([gold_ring_json()]).to_string();
    let addr = serve_once("200 OK", body).await;

    let client = reqwest::Client::new();
    let snapshot = storefront_search::catalog::fetch(&client, &format!("http://{addr}"))
        .await
        .unwrap();
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.contains_id(2));
}

#[tokio::test]
async fn successful_filter_returns_validated_products() {
    let body = json!({"success": true, "data": [gold_ring_json()]}).to_string();
    let addr = serve_once("200 OK", body).await;

    let products = adapter_for(addr)
        .filter("a ring for a gift", &catalog())
        .await
        .unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, 2);
    assert!(catalog().contains_id(products[0].id));
}

#[tokio::test]
async fn bad_request_reports_config_error_directly() {
    let body = json!({"error": "searchTerm and data is required"}).to_string();
    let addr = serve_once("400 Bad Request", body).await;

    let err = adapter_for(addr)
        .filter("a ring for a gift", &catalog())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RemoteError::Config(ConfigError::MissingFields)
    ));
}

#[tokio::test]
async fn server_failure_surfaces_the_status() {
    let body = json!({"success": false, "error": "model exploded"}).to_string();
    let addr = serve_once("500 Internal Server Error", body).await;

    let err = adapter_for(addr)
        .filter("a ring for a gift", &catalog())
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Status(500)));
}

#[tokio::test]
async fn configured_remote_is_preferred_over_a_ready_local_model() {
    // The local model is ready and would answer [1] (Red Shirt); the remote
    // endpoint answers with the Gold Ring. Remote must win.
    let body = json!({"success": true, "data": [gold_ring_json()]}).to_string();
    let addr = serve_once("200 OK", body).await;

    let local = Arc::new(LocalInferenceAdapter::new(scripted_local("[1]")));
    local.initialize().unwrap();
    assert!(local.is_ready());

    let config = SearchConfig {
        remote_endpoint: Some(format!("http://{addr}")),
        ..SearchConfig::default()
    };
    let resolver = QueryResolver::new(config, local).unwrap();

    let resolution = resolver
        .resolve(&Query::new("a ring for a gift"), &catalog())
        .await;
    assert_eq!(resolution.result.source, SearchSource::RemoteAi);
    assert_eq!(
        resolution
            .result
            .products
            .iter()
            .map(|p| p.id)
            .collect::<Vec<_>>(),
        vec![2]
    );
}

#[tokio::test]
async fn resolver_treats_remote_empty_as_authoritative() {
    let body = json!({"success": true, "data": []}).to_string();
    let addr = serve_once("200 OK", body).await;

    let resolution = resolver_for(addr)
        .resolve(&Query::new("waterproof hiking boots"), &catalog())
        .await;
    assert!(resolution.result.empty);
    assert!(resolution.result.products.is_empty());
    assert_eq!(resolution.result.source, SearchSource::RemoteAi);
    assert!(resolution.warning.is_none());
}

#[tokio::test]
async fn resolver_falls_back_on_remote_failure_with_a_warning() {
    let body = json!({"success": false, "error": "quota"}).to_string();
    let addr = serve_once("500 Internal Server Error", body).await;

    let resolution = resolver_for(addr)
        .resolve(&Query::new("classic band"), &catalog())
        .await;
    assert_eq!(resolution.result.source, SearchSource::Fallback);
    assert_eq!(resolution.result.products[0].id, 2);
    assert!(
        resolution
            .warning
            .as_deref()
            .unwrap()
            .contains("remote filtering failed")
    );
}

#[tokio::test]
async fn resolver_falls_back_on_unreachable_endpoint() {
    // Nothing is listening here; the connection is refused immediately.
    let config = SearchConfig {
        remote_endpoint: Some("http://127.0.0.1:1".into()),
        ..SearchConfig::default()
    };
    let resolver = QueryResolver::new(
        config,
        Arc::new(LocalInferenceAdapter::new(silent_local())),
    )
    .unwrap();

    let resolution = resolver
        .resolve(&Query::new("comfortable cotton"), &catalog())
        .await;
    assert_eq!(resolution.result.source, SearchSource::Fallback);
    assert_eq!(resolution.result.products[0].id, 1);
    assert!(resolution.warning.is_some());
}

#[tokio::test]
async fn invalid_response_shape_falls_back_too() {
    // Well-formed envelope, malformed product: strict validation fails and
    // the resolver absorbs it.
    let body = json!({"success": true, "data": [{"id": "two"}]}).to_string();
    let addr = serve_once("200 OK", body).await;

    let resolution = resolver_for(addr)
        .resolve(&Query::new("classic jewelery band"), &catalog())
        .await;
    assert_eq!(resolution.result.source, SearchSource::Fallback);
    assert!(resolution.warning.is_some());
}
