//! Artifact download from export job locations

use crate::config::TransferSettings;
use crate::domain::{BackupError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

/// Source of completed export artifacts
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Stream the artifact at `url` into `sink`
    ///
    /// # Returns
    ///
    /// The number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-success response or a network failure.
    async fn fetch_to(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64>;
}

/// HTTP artifact fetcher
///
/// The body is read incrementally and written out in pieces of at most
/// `chunk_bytes`, so memory use does not grow with the artifact size.
pub struct HttpArtifactFetcher {
    client: Client,
    chunk_bytes: usize,
}

impl HttpArtifactFetcher {
    /// Create a fetcher from transfer settings
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: &TransferSettings) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(settings.download_timeout())
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BackupError::Transfer(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            chunk_bytes: settings.download_chunk_bytes.max(1),
        })
    }
}

/// Parse a download location, accepting only http and https
///
/// Export locations are pre-signed, so only the host is ever logged.
fn parse_location(url: &str) -> Result<Url> {
    let location = Url::parse(url)
        .map_err(|e| BackupError::Transfer(format!("Invalid artifact location: {e}")))?;
    match location.scheme() {
        "http" | "https" => Ok(location),
        scheme => Err(BackupError::Transfer(format!(
            "Unsupported artifact location scheme '{scheme}'"
        ))),
    }
}

#[async_trait]
impl ArtifactFetcher for HttpArtifactFetcher {
    async fn fetch_to(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64> {
        let location = parse_location(url)?;
        tracing::debug!(host = location.host_str().unwrap_or_default(), "Downloading artifact");

        let mut response = self.client.get(location).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(BackupError::Transfer(format!(
                "Artifact download failed with status {status}"
            )));
        }

        let mut buffer: Vec<u8> = Vec::with_capacity(self.chunk_bytes);
        let mut total: u64 = 0;

        while let Some(bytes) = response.chunk().await? {
            let mut remaining: &[u8] = &bytes;
            while !remaining.is_empty() {
                let take = (self.chunk_bytes - buffer.len()).min(remaining.len());
                buffer.extend_from_slice(&remaining[..take]);
                remaining = &remaining[take..];

                if buffer.len() == self.chunk_bytes {
                    sink.write_all(&buffer).await?;
                    total += buffer.len() as u64;
                    buffer.clear();
                }
            }
        }

        if !buffer.is_empty() {
            sink.write_all(&buffer).await?;
            total += buffer.len() as u64;
        }
        sink.flush().await?;

        tracing::debug!(bytes = total, "Artifact downloaded");
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(chunk_bytes: usize) -> TransferSettings {
        TransferSettings {
            download_chunk_bytes: chunk_bytes,
            ..TransferSettings::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_streams_body() {
        let mut server = mockito::Server::new_async().await;
        let body = vec![7u8; 20_000];
        let mock = server
            .mock("GET", "/bundle.qs")
            .with_status(200)
            .with_body(body.clone())
            .create_async()
            .await;

        let fetcher = HttpArtifactFetcher::new(&settings(8192)).unwrap();
        let mut sink: Vec<u8> = Vec::new();
        let written = fetcher
            .fetch_to(&format!("{}/bundle.qs", server.url()), &mut sink)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(written, 20_000);
        assert_eq!(sink, body);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/expired")
            .with_status(403)
            .create_async()
            .await;

        let fetcher = HttpArtifactFetcher::new(&settings(1024)).unwrap();
        let mut sink: Vec<u8> = Vec::new();
        let err = fetcher
            .fetch_to(&format!("{}/expired", server.url()), &mut sink)
            .await
            .unwrap_err();

        assert!(matches!(err, BackupError::Transfer(_)));
        assert!(err.to_string().contains("403"));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_location() {
        let fetcher = HttpArtifactFetcher::new(&settings(1024)).unwrap();
        let mut sink: Vec<u8> = Vec::new();

        let err = fetcher.fetch_to("not a url", &mut sink).await.unwrap_err();
        assert!(err.to_string().contains("Invalid artifact location"));

        let err = fetcher
            .fetch_to("file:///etc/passwd", &mut sink)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("'file'"));
        assert!(sink.is_empty());
    }
}
