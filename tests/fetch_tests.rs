use fundwatch::error::FundError;
use fundwatch::pricing::{fetch_text, HttpTransport, InFlightRegistry};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// Accepts connections and never answers.
async fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}/js/000001.js", addr)
}

/// Answers every request with `body` and closes.
async fn fixed_server(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/javascript\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}/js/000001.js", addr)
}

#[tokio::test]
async fn test_silent_server_times_out_and_registry_drains() {
    let url = silent_server().await;
    let transport = HttpTransport::new().unwrap();
    let registry = InFlightRegistry::new();

    let started = Instant::now();
    let result = fetch_text(&transport, &registry, &url, Duration::from_millis(200)).await;

    assert!(matches!(result, Err(FundError::Timeout(_))), "got {:?}", result);
    assert!(started.elapsed() >= Duration::from_millis(200));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_http_transport_returns_body() {
    let url = fixed_server(r#"jsonpgz({"fundcode":"000001"});"#).await;
    let transport = HttpTransport::new().unwrap();
    let registry = InFlightRegistry::new();

    let body = fetch_text(&transport, &registry, &url, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(body, r#"jsonpgz({"fundcode":"000001"});"#);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_refused_connection_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HttpTransport::new().unwrap();
    let registry = InFlightRegistry::new();
    let result = fetch_text(
        &transport,
        &registry,
        &format!("http://{}/js/000001.js", addr),
        Duration::from_secs(5),
    )
    .await;

    assert!(matches!(result, Err(FundError::Network(_))), "got {:?}", result);
    assert!(registry.is_empty());
}
