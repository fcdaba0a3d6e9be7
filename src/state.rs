use std::sync::Arc;
use std::time::Duration;

use crate::config::{
    Config, RECORD_STORE_CACHE_TTL_SECONDS, REMOTE_REQUEST_TIMEOUT_SECONDS,
    SOCIAL_CACHE_TTL_SECONDS, SYNC_ITEM_DELAY_MILLIS,
};
use crate::fallback::{CompletionCache, HistoryOverlay, LocalMirror};
use crate::record_store::http::HttpConnector;
use crate::record_store::{MemorySheetTransport, RecordStoreClient};
use crate::repositories::{
    CheckChartRepository, CheckProgressRepository, GoalHistoryRepository, GroupRepository,
    ProfileRepository, StudentRepository,
};
use crate::services::social::{FollowerSource, HttpFollowerSource, SocialTracker};
use crate::services::sync_queue::SyncQueue;
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::jwt::JwtManager;

/// Everything a handler needs, built once in `main` and shared through
/// axum's `State`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub jwt: JwtManager,
    pub store: Arc<RecordStoreClient>,
    pub completions: Arc<CompletionCache>,
    pub mirror: Arc<LocalMirror>,
    pub pending_history: Arc<HistoryOverlay>,
    pub sync_queue: Arc<SyncQueue>,
    pub social: Arc<SocialTracker>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// State with an in-process mirror and social lookups disabled.
    pub fn new(config: Config, store: RecordStoreClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            jwt: JwtManager::new(config.jwt_secret.clone()),
            config: Arc::new(config),
            store: Arc::new(store),
            completions: Arc::new(CompletionCache::new()),
            mirror: Arc::new(LocalMirror::in_memory()),
            pending_history: Arc::new(HistoryOverlay::new()),
            sync_queue: Arc::new(SyncQueue::new(Duration::from_millis(SYNC_ITEM_DELAY_MILLIS))),
            social: Arc::new(SocialTracker::disabled()),
            clock,
        }
    }

    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let cache_ttl = Duration::from_secs(RECORD_STORE_CACHE_TTL_SECONDS);
        let min_delay = Duration::from_millis(config.record_store_min_delay_ms);
        let timeout = Duration::from_secs(REMOTE_REQUEST_TIMEOUT_SECONDS);

        let store = match config.record_store_mode.as_str() {
            "memory" => {
                tracing::warn!("Record store running in memory; data is lost on restart");
                RecordStoreClient::with_transport(
                    Arc::new(MemorySheetTransport::new()),
                    cache_ttl,
                    min_delay,
                )
            }
            "http" => RecordStoreClient::new(
                HttpConnector {
                    env_credentials: config.record_store_credentials.clone(),
                    credentials_file: config.record_store_credentials_file.clone(),
                    api_base: config.record_store_api_base.clone(),
                    timeout,
                },
                cache_ttl,
                min_delay,
            ),
            other => anyhow::bail!("Unknown record store mode: {}", other),
        };

        let social_source: Option<Arc<dyn FollowerSource>> = match &config.social_lookup_url {
            Some(url) if !url.trim().is_empty() => {
                Some(Arc::new(HttpFollowerSource::new(url, timeout)?))
            }
            _ => None,
        };

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let mirror = LocalMirror::load(&config.local_mirror_path, &clock.today_string());
        let social = SocialTracker::new(
            social_source,
            Duration::from_secs(SOCIAL_CACHE_TTL_SECONDS),
        );

        let mut state = Self::new(config, store, clock);
        state.mirror = Arc::new(mirror);
        state.social = Arc::new(social);
        Ok(state)
    }

    pub fn with_social(mut self, social: SocialTracker) -> Self {
        self.social = Arc::new(social);
        self
    }

    pub fn today(&self) -> String {
        self.clock.today_string()
    }

    pub fn timestamp(&self) -> String {
        self.clock.now().to_rfc3339()
    }

    pub fn students(&self) -> StudentRepository {
        StudentRepository::new(self.store.clone())
    }

    pub fn profiles(&self) -> ProfileRepository {
        ProfileRepository::new(self.store.clone())
    }

    pub fn goal_history(&self) -> GoalHistoryRepository {
        GoalHistoryRepository::new(self.store.clone())
    }

    pub fn groups(&self) -> GroupRepository {
        GroupRepository::new(self.store.clone())
    }

    pub fn check_charts(&self) -> CheckChartRepository {
        CheckChartRepository::new(self.store.clone())
    }

    pub fn check_progress(&self) -> CheckProgressRepository {
        CheckProgressRepository::new(self.store.clone())
    }
}
