//! HTTP reachability probe.

use super::{ProbeError, Prober, TARGET_URL};
use crate::history::Sample;

use async_trait::async_trait;
use chrono::Utc;
use std::time::{Duration, Instant};

/// Issue a single GET against `url`.
///
/// Any HTTP response, whatever its status, counts as reachable; the body is
/// not read. Returns the time until the response head arrived.
pub async fn run_http_probe(client: &reqwest::Client, url: &str) -> Result<Duration, ProbeError> {
    let start = Instant::now();

    client
        .get(url)
        .send()
        .await
        .map_err(|_| ProbeError::Unreachable)?;

    Ok(start.elapsed())
}

/// Prober that checks reachability of [`TARGET_URL`] over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    url: String,
}

impl HttpProber {
    pub fn new() -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: TARGET_URL.to_string(),
        })
    }

    #[cfg(test)]
    fn with_url(url: &str) -> Result<Self, ProbeError> {
        let mut prober = Self::new()?;
        prober.url = url.to_string();
        Ok(prober)
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self) -> Sample {
        match run_http_probe(&self.client, &self.url).await {
            Ok(latency) => Sample::connected(Utc::now(), latency),
            Err(_) => Sample::disconnected(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Status;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port.
    async fn one_shot_server(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_http_probe_invalid_url() {
        let client = reqwest::Client::new();
        let result = run_http_probe(&client, "http://256.256.256.256").await;
        assert!(matches!(result, Err(ProbeError::Unreachable)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_disconnected() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let prober = HttpProber::with_url(&format!("http://{}", addr)).unwrap();
        let sample = prober.probe().await;
        assert_eq!(sample.status, Status::Disconnected);
        assert_eq!(sample.latency, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_error_status_counts_as_connected() {
        let url = one_shot_server(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;

        let before = Utc::now();
        let prober = HttpProber::with_url(&url).unwrap();
        let sample = prober.probe().await;
        assert_eq!(sample.status, Status::Connected);
        assert!(sample.timestamp >= before);
    }

    #[test]
    fn test_default_target() {
        let prober = HttpProber::new().unwrap();
        assert_eq!(prober.url, TARGET_URL);
    }
}
