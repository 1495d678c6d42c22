//! HTTP document source: `GET <base_url>/<id>`.

use async_trait::async_trait;
use std::time::Duration;

use scripture_search_core::loader::{DocumentSource, LoadError};

pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, encode_segment(id))
    }
}

/// Percent-encode a path segment per RFC 3986.
///
/// Encodes all characters except unreserved characters:
/// `A-Z a-z 0-9 - _ . ~`, so ids such as `John1,2&3.html` stay one segment.
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, id: &str) -> Result<Option<String>, LoadError> {
        let url = self.url_for(id);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LoadError::other(id, e))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LoadError::other(id, format!("GET {} returned {}", url, status)));
        }

        let body = resp.text().await.map_err(|e| LoadError::other(id, e))?;
        Ok(Some(body))
    }
}
