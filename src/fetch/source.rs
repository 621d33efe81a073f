use crate::config::SourceConfig;
use crate::error::{ProcessingError, Result};
use crate::readers::SheetReader;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Something that can hand over the raw text of the station sheet.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Stable identifier, used as the cache key.
    fn id(&self) -> &str;

    async fn fetch_text(&self) -> Result<String>;
}

/// Published spreadsheet reachable over HTTP(S).
pub struct HttpSheetSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSheetSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self::with_client(config.url.clone(), client))
    }

    pub fn with_client(url: String, client: reqwest::Client) -> Self {
        Self { url, client }
    }
}

#[async_trait]
impl SheetSource for HttpSheetSource {
    fn id(&self) -> &str {
        &self.url
    }

    async fn fetch_text(&self) -> Result<String> {
        debug!(url = %self.url, "Fetching sheet");

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProcessingError::FetchStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Sheet downloaded");

        Ok(SheetReader::decode_sheet_bytes(&body))
    }
}

/// Sheet exported to a local file.
pub struct FileSheetSource {
    path: PathBuf,
    id: String,
}

impl FileSheetSource {
    pub fn new(path: PathBuf) -> Self {
        let id = path.display().to_string();
        Self { path, id }
    }
}

#[async_trait]
impl SheetSource for FileSheetSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch_text(&self) -> Result<String> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(SheetReader::decode_sheet_bytes(&bytes))
    }
}
