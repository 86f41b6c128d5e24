use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::ReadAt;
use anyhow::{Result, anyhow, bail};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRY: u32 = 10;

/// EPUB served over HTTP, read lazily with Range requests.
///
/// Only the central directory, `container.xml`, the package document and
/// the spine's chapters are fetched, never the images or fonts.
pub struct HttpRangeReader {
    client: Client,
    url: String,
    size: u64,
    transferred_bytes: AtomicU64,
}

impl HttpRangeReader {
    /// Probe the server with a HEAD request and build a reader.
    ///
    /// The server must advertise `Accept-Ranges: bytes` and a
    /// `Content-Length`, which doubles as the upload size for validation.
    pub async fn new(url: String) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let size = probe(&client, &url).await?;
        tracing::debug!(%url, size, "remote book supports range requests");

        Ok(Self {
            client,
            url,
            size,
            transferred_bytes: AtomicU64::new(0),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }

    async fn fetch_range(&self, start: u64, end: u64) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(&self.url)
            .header(reqwest::header::RANGE, format!("bytes={}-{}", start, end))
            .send()
            .await
    }
}

async fn probe(client: &Client, url: &str) -> Result<u64> {
    let resp = client.head(url).send().await?;

    if !resp.status().is_success() {
        bail!("HTTP request failed with status: {}", resp.status());
    }

    let headers = resp.headers();
    let ranges = headers
        .get(reqwest::header::ACCEPT_RANGES)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none");
    if !ranges.contains("bytes") {
        bail!("Remote server does not support Range requests");
    }

    headers
        .get(reqwest::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow!("Remote server did not return Content-Length"))
}

#[async_trait]
impl ReadAt for HttpRangeReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || offset >= self.size {
            return Ok(0);
        }

        let end = (offset + buf.len() as u64 - 1).min(self.size - 1);
        let wanted = (end - offset + 1) as usize;

        let mut received = 0;
        let mut attempt = 0;

        while received < wanted {
            match self.fetch_range(offset + received as u64, end).await {
                Ok(resp) => {
                    if resp.status() != StatusCode::PARTIAL_CONTENT {
                        bail!("HTTP request failed with status: {}", resp.status());
                    }

                    let bytes = resp.bytes().await?;
                    if bytes.is_empty() {
                        bail!("Remote server returned an empty range");
                    }
                    let n = bytes.len().min(wanted - received);
                    buf[received..received + n].copy_from_slice(&bytes[..n]);
                    received += n;

                    self.transferred_bytes.fetch_add(n as u64, Ordering::Relaxed);
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    attempt += 1;
                    if attempt >= MAX_RETRY {
                        bail!("Max retries exceeded fetching {}", self.url);
                    }
                    tracing::warn!(attempt, max = MAX_RETRY, error = %e, "range request failed, retrying");
                    tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(received)
    }

    fn size(&self) -> u64 {
        self.size
    }
}
