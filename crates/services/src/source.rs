//! Fetching the external word list text.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::SourceError;

/// Anything that can produce the raw tabular word-list text.
#[async_trait]
pub trait WordSource: Send + Sync {
    /// Fetch the raw source text.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` on transport failure or a non-success status.
    async fn fetch(&self) -> Result<String, SourceError>;
}

/// Fetches the word list over HTTP.
#[derive(Clone)]
pub struct HttpWordSource {
    client: Client,
    url: String,
}

impl HttpWordSource {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl WordSource for HttpWordSource {
    async fn fetch(&self) -> Result<String, SourceError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus(status));
        }
        Ok(response.text().await?)
    }
}

/// Serves a fixed text, for tests and for file-backed word lists.
#[derive(Clone)]
pub struct StaticWordSource {
    text: String,
}

impl StaticWordSource {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read the word list from a local file.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Io` when the file cannot be read.
    pub fn from_file(path: &std::path::Path) -> Result<Self, SourceError> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }
}

#[async_trait]
impl WordSource for StaticWordSource {
    async fn fetch(&self) -> Result<String, SourceError> {
        Ok(self.text.clone())
    }
}
