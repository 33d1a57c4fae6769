use async_trait::async_trait;

use crate::error::ProviderError;
use crate::models::{Season, StatKind};
use crate::table::StatTable;

mod fangraphs;

pub use fangraphs::{FanGraphsProvider, DEFAULT_BASE_URL};

/// Source of season-level stat tables.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    async fn fetch(&self, kind: StatKind, season: Season) -> Result<StatTable, ProviderError>;
}
