use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::entities::Platform;
use crate::record_store::ReadCache;

#[derive(Debug, Clone, Error)]
pub enum SocialError {
    #[error("Social lookup is not configured")]
    NotConfigured,

    #[error("Social lookup failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for SocialError {
    fn from(error: reqwest::Error) -> Self {
        SocialError::Transport(error.to_string())
    }
}

#[async_trait]
pub trait FollowerSource: Send + Sync {
    async fn followers(&self, platform: Platform, handle: &str) -> Result<i64, SocialError>;
}

#[derive(Deserialize)]
struct FollowersBody {
    followers: i64,
}

/// `GET {base}/{platform}/{handle}` → `{"followers": n}`.
pub struct HttpFollowerSource {
    base_url: String,
    http: reqwest::Client,
}

impl HttpFollowerSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SocialError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl FollowerSource for HttpFollowerSource {
    async fn followers(&self, platform: Platform, handle: &str) -> Result<i64, SocialError> {
        let url = format!(
            "{}/{}/{}",
            self.base_url,
            platform.as_str(),
            urlencoding::encode(handle.trim_start_matches('@'))
        );
        let body: FollowersBody = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.followers)
    }
}

/// Follower lookups behind a long-lived read cache.
pub struct SocialTracker {
    source: Option<Arc<dyn FollowerSource>>,
    cache: ReadCache<i64>,
    lookups: AtomicUsize,
}

impl SocialTracker {
    pub fn new(source: Option<Arc<dyn FollowerSource>>, cache_ttl: Duration) -> Self {
        Self {
            source,
            cache: ReadCache::new(cache_ttl),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        self.source.is_some()
    }

    /// Remote lookups issued so far, cache hits excluded.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    pub async fn followers(&self, platform: Platform, handle: &str) -> Result<i64, SocialError> {
        let source = self.source.as_ref().ok_or(SocialError::NotConfigured)?;
        let key = format!("{}:{}", platform.as_str(), handle.trim().to_lowercase());
        if let Some(count) = self.cache.get(&key) {
            return Ok(count);
        }

        self.lookups.fetch_add(1, Ordering::Relaxed);
        let count = source.followers(platform, handle.trim()).await?;
        self.cache.put(key, count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(i64);

    #[async_trait]
    impl FollowerSource for FixedSource {
        async fn followers(&self, _platform: Platform, _handle: &str) -> Result<i64, SocialError> {
            Ok(self.0)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn lookups_are_cached_for_the_ttl() {
        let tracker = SocialTracker::new(Some(Arc::new(FixedSource(420))), Duration::from_secs(300));

        assert_eq!(tracker.followers(Platform::X, "@ada").await.unwrap(), 420);
        assert_eq!(tracker.followers(Platform::X, "@ADA").await.unwrap(), 420);
        assert_eq!(tracker.lookups(), 1);

        tokio::time::advance(Duration::from_secs(301)).await;
        tracker.followers(Platform::X, "@ada").await.unwrap();
        assert_eq!(tracker.lookups(), 2);
    }

    #[tokio::test]
    async fn disabled_tracker_reports_not_configured() {
        let tracker = SocialTracker::disabled();
        assert!(matches!(
            tracker.followers(Platform::Youtube, "ada").await,
            Err(SocialError::NotConfigured)
        ));
    }
}
