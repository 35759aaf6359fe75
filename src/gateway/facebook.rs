//! Facebook Graph API adapter.
//!
//! Fetches aggregate engagement data only (counts of posts, reactions,
//! comments), never individual post content. Raw counts stay inside this
//! module: the only thing that leaves is the bucketed [`SignalBucket`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{SignalFetchError, SignalSource};
use crate::signals::{bucketize, EngagementCounts};
use crate::types::SignalBucket;

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v19.0";
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Identity fields returned by token verification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FacebookUser {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    data: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    reactions: Option<SummaryWrapper>,
    comments: Option<SummaryWrapper>,
}

#[derive(Debug, Deserialize)]
struct SummaryWrapper {
    summary: Option<Summary>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(default)]
    total_count: u64,
}

/// Graph API client with an overridable base URL (tests point it at a
/// local mock server).
#[derive(Debug, Clone)]
pub struct GraphApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for GraphApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphApiClient {
    pub fn new() -> Self {
        Self::with_base_url(GRAPH_API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Verify an access token, returning the user's identity on success.
    pub async fn verify_access_token(
        &self,
        access_token: &str,
    ) -> Result<FacebookUser, SignalFetchError> {
        let url = format!(
            "{}/me?fields=id,name&access_token={access_token}",
            self.base_url
        );
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(SignalFetchError::TokenRejected(status.as_u16()));
        }
        if !status.is_success() {
            return Err(SignalFetchError::Upstream(status.as_u16()));
        }
        resp.json::<FacebookUser>()
            .await
            .map_err(|e| SignalFetchError::Malformed(e.to_string()))
    }

    /// Fetch raw engagement counts over the trailing window.
    ///
    /// The posts query is required; a failed feed query is tolerated and
    /// leaves reaction/comment counts at zero.
    pub async fn fetch_engagement(
        &self,
        access_token: &str,
        window_days: u32,
    ) -> Result<EngagementCounts, SignalFetchError> {
        debug!(window_days, "fetching engagement counts");

        let posts_url = format!(
            "{}/me/posts?fields=id&limit=100&access_token={access_token}",
            self.base_url
        );
        let resp = self.http.get(&posts_url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SignalFetchError::Upstream(status.as_u16()));
        }
        let posts: PostsResponse = resp
            .json()
            .await
            .map_err(|e| SignalFetchError::Malformed(e.to_string()))?;

        let mut counts = EngagementCounts {
            posts: posts.data.len() as u64,
            ..Default::default()
        };

        let feed_url = format!(
            "{}/me/feed?fields=id,reactions.summary(true),comments.summary(true)\
             &limit=50&access_token={access_token}",
            self.base_url
        );
        match self.http.get(&feed_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                if let Ok(feed) = resp.json::<FeedResponse>().await {
                    for item in feed.data {
                        if let Some(s) = item.reactions.and_then(|w| w.summary) {
                            counts.reactions += s.total_count;
                        }
                        if let Some(s) = item.comments.and_then(|w| w.summary) {
                            counts.comments += s.total_count;
                        }
                    }
                }
            }
            Ok(resp) => {
                debug!(status = resp.status().as_u16(), "feed query failed, counts stay zero");
            }
            Err(err) => {
                debug!(error = %err, "feed query failed, counts stay zero");
            }
        }

        Ok(counts)
    }
}

#[async_trait]
impl SignalSource for GraphApiClient {
    async fn fetch_signals(&self, access_token: &str, window_days: u32) -> SignalBucket {
        match self.fetch_engagement(access_token, window_days).await {
            Ok(counts) => bucketize(&counts),
            Err(err) => {
                warn!(error = %err, "signal fetch failed, using default bucket");
                SignalBucket::default()
            }
        }
    }
}
