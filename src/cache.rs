use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::ProviderError;
use crate::models::{Season, StatKind};
use crate::provider::StatsProvider;
use crate::table::StatTable;

/// Seasons remembered per stat kind.
pub const DEFAULT_CAPACITY: usize = 128;

/// Least-recently-used store of fetched tables keyed by season.
pub struct SeasonCache {
    inner: Mutex<LruCache<Season, Arc<StatTable>>>,
}

impl SeasonCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn get(&self, season: Season) -> Option<Arc<StatTable>> {
        self.inner.lock().await.get(&season).cloned()
    }

    pub async fn put(&self, season: Season, table: Arc<StatTable>) {
        self.inner.lock().await.put(season, table);
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

/// Memoizes provider lookups, one independent cache per [`StatKind`].
///
/// The lock is released while the provider runs, so two requests racing on
/// the same cold season may both fetch it; the later result wins. Failed
/// fetches are never stored.
pub struct MemoizedFetcher {
    provider: Arc<dyn StatsProvider>,
    team_batting: SeasonCache,
    team_pitching: SeasonCache,
    player_batting: SeasonCache,
    player_pitching: SeasonCache,
}

impl MemoizedFetcher {
    pub fn new(provider: Arc<dyn StatsProvider>) -> Self {
        Self::with_capacity(provider, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(provider: Arc<dyn StatsProvider>, capacity: usize) -> Self {
        Self {
            provider,
            team_batting: SeasonCache::new(capacity),
            team_pitching: SeasonCache::new(capacity),
            player_batting: SeasonCache::new(capacity),
            player_pitching: SeasonCache::new(capacity),
        }
    }

    fn store(&self, kind: StatKind) -> &SeasonCache {
        match kind {
            StatKind::TeamBatting => &self.team_batting,
            StatKind::TeamPitching => &self.team_pitching,
            StatKind::PlayerBatting => &self.player_batting,
            StatKind::PlayerPitching => &self.player_pitching,
        }
    }

    pub async fn fetch(&self, kind: StatKind, season: Season) -> Result<Arc<StatTable>, ProviderError> {
        let store = self.store(kind);
        if let Some(table) = store.get(season).await {
            tracing::debug!("Cache hit for {} {}", kind, season);
            return Ok(table);
        }

        tracing::debug!("Cache miss for {} {}", kind, season);
        let table = Arc::new(self.provider.fetch(kind, season).await?);
        store.put(season, Arc::clone(&table)).await;
        Ok(table)
    }
}
