//! HTTP text retrieval over a shared reqwest client.

use reqwest::{Client, Url};

use crate::backend::{resolve_relative, TextSource};
use crate::error::AssetError;

/// Text retrieval over HTTP(S). References are absolute URLs; relative
/// material-library and texture filenames resolve against the mesh URL.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Reuse an existing client (shared connection pool, timeouts, etc.).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSource for HttpSource {
    async fn fetch_text(&self, reference: &str) -> Result<String, AssetError> {
        let response = self
            .client
            .get(reference)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AssetError::Retrieval(reference.to_string(), e.to_string()))?;
        response
            .text()
            .await
            .map_err(|e| AssetError::Retrieval(reference.to_string(), e.to_string()))
    }

    fn resolve(&self, base: &str, relative: &str) -> String {
        match Url::parse(base).and_then(|url| url.join(relative)) {
            Ok(resolved) => resolved.to_string(),
            Err(_) => resolve_relative(base, relative),
        }
    }
}
