//! Outbound key-set retrieval.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;

use crate::services::jwks::KeySetError;

/// Raw key-set document as returned by the source.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub body: Vec<u8>,
    // Freshness advertised by the source (`Cache-Control: max-age`).
    pub max_age: Option<Duration>,
}

/// Transport used by the key-set cache to download documents.
///
/// Implementations must be cheap to share (`Arc<dyn KeySetFetcher>`).
#[async_trait]
pub trait KeySetFetcher: Send + Sync + 'static {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, KeySetError>;
}

/// Plain unauthenticated HTTP GET.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl KeySetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, KeySetError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| KeySetError::fetch_failed(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeySetError::fetch_failed(url, format!("HTTP {status}")));
        }

        let max_age = response
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_max_age);

        let body = response
            .bytes()
            .await
            .map_err(|e| KeySetError::fetch_failed(url, e))?;

        Ok(FetchedDocument {
            body: body.to_vec(),
            max_age,
        })
    }
}

// Only `max-age` is honoured; `no-store`/`no-cache` are ignored.
fn parse_max_age(cache_control: &str) -> Option<Duration> {
    cache_control.split(',').find_map(|directive| {
        let (name, value) = directive.trim().split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("max-age") {
            return None;
        }
        value
            .trim()
            .trim_matches('"')
            .parse::<u64>()
            .ok()
            .map(Duration::from_secs)
    })
}
