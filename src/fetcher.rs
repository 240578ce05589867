use anyhow::Context as _;
use bytes::Bytes;
use url::Url;

use crate::error::FeedError;
use crate::post::{self, PostRecord};

pub const DEFAULT_FEED_PATH: &str = "/api/facebook/feed";

/// Outcome of one feed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedResult {
    Success(Vec<PostRecord>),
    NoData,
}

impl FeedResult {
    /// Records worth rendering, or `None` when the fallback should stay.
    pub fn into_posts(self) -> Option<Vec<PostRecord>> {
        match self {
            FeedResult::Success(posts) if !posts.is_empty() => Some(posts),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct FeedFetcher {
    client: reqwest::Client,
    endpoint: Url,
}

impl FeedFetcher {
    pub fn new(user_agent: &str, base_url: &Url, feed_path: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build reqwest client")?;
        let endpoint = base_url
            .join(feed_path)
            .with_context(|| format!("resolve feed path {} against {}", feed_path, base_url))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Issues exactly one request. Every failure collapses into `NoData`.
    pub async fn fetch_feed(&self) -> FeedResult {
        match self.try_fetch().await {
            Ok(posts) => {
                tracing::debug!(endpoint = %self.endpoint, count = posts.len(), "feed fetched");
                FeedResult::Success(posts)
            }
            Err(e) => {
                tracing::debug!(endpoint = %self.endpoint, error = %e, "feed unavailable; keeping fallback");
                FeedResult::NoData
            }
        }
    }

    async fn try_fetch(&self) -> Result<Vec<PostRecord>, FeedError> {
        let body = self.get_bytes().await?;
        post::parse_feed(&body)
    }

    async fn get_bytes(&self) -> Result<Bytes, FeedError> {
        let resp = self.client.get(self.endpoint.clone()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }

        Ok(resp.bytes().await?)
    }
}
