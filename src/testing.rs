//! Test doubles: an in-process HTTP stub and a scripted hub.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::error::OperationError;
use crate::hub::HubClient;

/// Serves exactly one request with `status` and `body`.
///
/// Returns the base URL and a handle resolving to the raw request text.
pub(crate) async fn serve_once(
    status: &'static str,
    body: &'static str,
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if request_complete(&raw) {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&raw).into_owned()
    });

    (base, handle)
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(head_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..head_end]
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    raw.len() >= head_end + 4 + content_length
}

/// Scripted hub: counts calls and records sent payloads.
#[derive(Default)]
pub(crate) struct FakeHub {
    pub(crate) twin_calls: AtomicUsize,
    pub(crate) sent: Mutex<Vec<Vec<u8>>>,
    pub(crate) fail_with: Option<&'static str>,
    pub(crate) hang: bool,
}

impl FakeHub {
    async fn respond(&self) -> Result<(), OperationError> {
        if self.hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        match self.fail_with {
            Some(reason) => Err(OperationError::failed(reason)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl HubClient for FakeHub {
    fn identity(&self) -> String {
        "edge-1/probe".into()
    }

    async fn get_twin(&self) -> Result<serde_json::Value, OperationError> {
        self.twin_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        Ok(serde_json::json!({ "properties": { "desired": { "$version": 1 } } }))
    }

    async fn send_event(&self, payload: Vec<u8>) -> Result<(), OperationError> {
        self.respond().await?;
        self.sent.lock().unwrap().push(payload);
        Ok(())
    }
}
