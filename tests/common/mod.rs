// Shared helpers for integration tests

#![allow(dead_code)]

use kale_pool_client::config::ApiConfig;
use kale_pool_client::credentials::{CredentialStore, MemoryCredentialStore};
use kale_pool_client::ApiClient;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Retry base small enough to keep tests fast but large enough to measure.
pub const TEST_BACKOFF_MS: u64 = 20;

pub fn test_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        backend_base_url: base_url.to_string(),
        pooler_base_url: base_url.to_string(),
        timeout_ms: 2_000,
        max_retries: 3,
        backoff_base_ms: TEST_BACKOFF_MS,
    }
}

pub fn client_for(base_url: &str) -> ApiClient {
    client_with_store(base_url, Arc::new(MemoryCredentialStore::new()))
}

pub fn client_with_store(base_url: &str, store: Arc<dyn CredentialStore>) -> ApiClient {
    ApiClient::new(&test_config(base_url), store).expect("client builds")
}

/// One scripted reply of a [`ScriptedServer`].
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, &'static str),
    /// Read the request, then never answer.
    Hang,
}

/// Minimal HTTP/1.1 server answering connections from a fixed script.
///
/// Each connection gets the next reply; once the script runs out the last
/// reply repeats. Every reply closes the connection so each attempt opens a
/// fresh one and is counted once.
pub struct ScriptedServer {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl ScriptedServer {
    pub async fn start(script: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let url = format!("http://{}", listener.local_addr().expect("addr"));
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let index = counter.fetch_add(1, Ordering::SeqCst);
                let reply = script
                    .get(index)
                    .or_else(|| script.last())
                    .cloned()
                    .unwrap_or(Reply::Status(200, "null"));

                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }

                    match reply {
                        Reply::Status(status, body) => {
                            let response = format!(
                                "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                status,
                                body.len(),
                                body
                            );
                            let _ = socket.write_all(response.as_bytes()).await;
                            let _ = socket.shutdown().await;
                        }
                        Reply::Hang => {
                            tokio::time::sleep(Duration::from_secs(60)).await;
                        }
                    }
                });
            }
        });

        Self { url, hits }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}
