use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use percent_encoding::percent_decode_str;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

/// Standard alphabet, accepting payloads with or without `=` padding.
const DATA_URL_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Where the bytes behind a profile's image reference live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Empty,
    Http(String),
    Local(PathBuf),
    Data(String),
    Unsupported(String),
}

impl Source {
    /// Classify `reference`. Protocol-relative `//host/path` becomes https.
    pub fn parse(reference: &str) -> Self {
        let reference = reference.trim();
        if reference.is_empty() {
            Source::Empty
        } else if reference.starts_with("http://") || reference.starts_with("https://") {
            Source::Http(reference.to_string())
        } else if let Some(rest) = reference.strip_prefix("//") {
            Source::Http(format!("https://{}", rest))
        } else if let Some(path) = reference.strip_prefix("file://") {
            Source::Local(PathBuf::from(path))
        } else if reference.starts_with("data:") {
            Source::Data(reference.to_string())
        } else if reference.contains("://") {
            Source::Unsupported(reference.to_string())
        } else {
            Source::Local(PathBuf::from(reference))
        }
    }
}

/// Decode an inline `data:[<media type>][;base64],<payload>` URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let (meta, payload) = url.split_once(',').context("data URL has no payload")?;
    let meta = match meta.strip_prefix("data:") {
        Some(meta) => meta,
        None => bail!("not a data URL"),
    };

    if meta.ends_with(";base64") {
        let payload: Vec<u8> = percent_decode_str(payload)
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        DATA_URL_BASE64
            .decode(payload)
            .context("invalid base64 payload in data URL")
    } else {
        Ok(percent_decode_str(payload).collect())
    }
}

/// Downloads entry content before it is handed to the encoder.
///
/// Fetch failures never abort an export: they come back as `None` so the
/// caller can substitute a placeholder entry.
pub struct Fetcher {
    client: Client,
    max_retry: u32,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            max_retry: 10,
        })
    }

    /// Attempts per HTTP request on connect or timeout errors.
    pub fn max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = max_retry.max(1);
        self
    }

    /// Fetch the bytes behind `reference`, or `None` when they cannot be had.
    pub async fn fetch(&self, reference: &str) -> Option<Vec<u8>> {
        match self.try_fetch(&Source::parse(reference)).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("fetch failed for {}: {:#}", reference, e);
                None
            }
        }
    }

    async fn try_fetch(&self, source: &Source) -> Result<Option<Vec<u8>>> {
        match source {
            Source::Empty => Ok(None),
            Source::Local(path) => Ok(Some(tokio::fs::read(path).await?)),
            Source::Http(url) => self.get(url).await,
            Source::Data(url) => Ok(Some(decode_data_url(url)?)),
            Source::Unsupported(reference) => bail!("unsupported image reference: {}", reference),
        }
    }

    async fn get(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let mut retry_count = 0;
        loop {
            match self.client.get(url).send().await {
                Ok(resp) => {
                    if !resp.status().is_success() {
                        log::warn!("GET {} returned {}", url, resp.status());
                        return Ok(None);
                    }
                    return Ok(Some(resp.bytes().await?.to_vec()));
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    retry_count += 1;
                    if retry_count >= self.max_retry {
                        bail!("Max retries exceeded: {}", e);
                    }
                    log::debug!(
                        "Connection error, retry {}/{}: {}",
                        retry_count,
                        self.max_retry,
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(500 * retry_count as u64)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
