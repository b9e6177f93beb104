use std::{sync::Arc, time::Duration};

use archivbot_core::{
    config::ArchiveConfig, ApiError, LookupResult, Recording, SearchResult, StatsResult,
    StatsSnapshot,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// With this limit the archive returns its newest recording and the query is not sent.
pub const MOST_RECENT_LIMIT: u32 = 1;

/// Large enough that the archive returns every match.
pub const SEARCH_LIMIT: u32 = 10_000;

#[async_trait]
pub trait ArchiveApi: Send + Sync {
    async fn search(&self, query: &str, limit: u32) -> Result<SearchResult, ApiError>;
    async fn lookup(&self, id: &str) -> Result<Recording, ApiError>;
    async fn stats(&self) -> Result<StatsSnapshot, ApiError>;
}

#[async_trait]
impl<T> ArchiveApi for Arc<T>
where
    T: ArchiveApi + ?Sized,
{
    async fn search(&self, query: &str, limit: u32) -> Result<SearchResult, ApiError> {
        (**self).search(query, limit).await
    }

    async fn lookup(&self, id: &str) -> Result<Recording, ApiError> {
        (**self).lookup(id).await
    }

    async fn stats(&self) -> Result<StatsSnapshot, ApiError> {
        (**self).stats().await
    }
}

#[derive(Clone, Debug)]
pub struct ArchiveClient {
    client: Client,
    base_url: String,
}

impl ArchiveClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Url::parse(&base_url).map_err(|error| {
            ApiError::Transport(format!("invalid archive url `{base_url}`: {error}"))
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ApiError::Transport(error.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ArchiveConfig) -> Result<Self, ApiError> {
        Self::new(config.backend_base(), Duration::from_secs(config.request_timeout_secs))
    }

    pub fn search_url(&self, query: &str, limit: u32) -> Result<Url, ApiError> {
        let mut url = self.endpoint("/vods/")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &limit.to_string());
            if limit != MOST_RECENT_LIMIT {
                pairs.append_pair("q", query);
            }
        }
        Ok(url)
    }

    pub fn lookup_url(&self, id: &str) -> Result<Url, ApiError> {
        let mut url = self.endpoint("/vods")?;
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::Transport(format!("archive url `{}` cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    pub fn stats_url(&self) -> Result<Url, ApiError> {
        self.endpoint("/stats/long")
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}{path}", self.base_url);
        Url::parse(&raw)
            .map_err(|error| ApiError::Transport(format!("invalid archive url `{raw}`: {error}")))
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        debug!(event_name = "archive.request.sent", url = %url, "requesting archive endpoint");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| ApiError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::UnexpectedStatus { code: status.as_u16() });
        }

        let body = response.text().await.map_err(|error| ApiError::Transport(error.to_string()))?;
        serde_json::from_str(&body).map_err(|error| ApiError::Decode(error.to_string()))
    }
}

#[async_trait]
impl ArchiveApi for ArchiveClient {
    async fn search(&self, query: &str, limit: u32) -> Result<SearchResult, ApiError> {
        let result: SearchResult = self.get_json(self.search_url(query, limit)?).await?;
        if result.error {
            warn!(
                event_name = "archive.search.flagged",
                limit,
                "archive flagged search result as error"
            );
        }
        Ok(result)
    }

    async fn lookup(&self, id: &str) -> Result<Recording, ApiError> {
        let result: LookupResult =
            self.get_json(self.lookup_url(id)?).await.map_err(|error| match error {
                ApiError::UnexpectedStatus { code } if code == StatusCode::NOT_FOUND.as_u16() => {
                    ApiError::NotFound { id: id.to_owned() }
                }
                other => other,
            })?;
        if result.error {
            warn!(
                event_name = "archive.lookup.flagged",
                id,
                "archive flagged lookup result as error"
            );
        }
        Ok(result.recording)
    }

    async fn stats(&self) -> Result<StatsSnapshot, ApiError> {
        let result: StatsResult = self.get_json(self.stats_url()?).await?;
        if result.error {
            warn!(event_name = "archive.stats.flagged", "archive flagged stats result as error");
        }
        Ok(result.stats)
    }
}
