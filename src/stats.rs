use crate::cache::MemoizedFetcher;
use crate::error::StatsError;
use crate::models::{DataType, Record, Season, StatKind};
use crate::table::StatTable;

/// Qualifying thresholds for player leaderboards.
pub const MIN_AT_BATS: f64 = 100.0;
pub const MIN_INNINGS_PITCHED: f64 = 40.0;

/// Column both team tables are joined on.
pub const TEAM_KEY: &str = "Team";

const BATTING_RENAMES: [(&str, &str); 2] = [("SO", "SO_batting"), ("BB", "BB_batting")];
const PITCHING_RENAMES: [(&str, &str); 2] = [("SO", "SO_pitching"), ("BB", "BB_pitching")];

pub struct StatsService {
    fetcher: MemoizedFetcher,
}

impl StatsService {
    pub fn new(fetcher: MemoizedFetcher) -> Self {
        Self { fetcher }
    }

    pub async fn run(&self, data_type: DataType, season: Season) -> Result<Vec<Record>, StatsError> {
        match data_type {
            DataType::TeamStats => self.team_stats(season).await,
            DataType::PlayerBatting => self.player_batting(season).await,
            DataType::PlayerPitching => self.player_pitching(season).await,
        }
    }

    /// Team batting and pitching joined per team. Strikeouts and walks exist
    /// on both sides, so they are suffixed before the merge.
    pub async fn team_stats(&self, season: Season) -> Result<Vec<Record>, StatsError> {
        let batting = self.fetcher.fetch(StatKind::TeamBatting, season).await?;
        let pitching = self.fetcher.fetch(StatKind::TeamPitching, season).await?;

        let batting = StatTable::clone(&batting).rename(&BATTING_RENAMES)?;
        let pitching = StatTable::clone(&pitching).rename(&PITCHING_RENAMES)?;
        let merged = StatTable::outer_merge(&batting, &pitching, TEAM_KEY)?;

        Ok(merged.to_records()?)
    }

    pub async fn player_batting(&self, season: Season) -> Result<Vec<Record>, StatsError> {
        let stats = self.fetcher.fetch(StatKind::PlayerBatting, season).await?;
        let qualified = stats.filter_at_least("AB", MIN_AT_BATS)?;
        Ok(qualified.to_records()?)
    }

    pub async fn player_pitching(&self, season: Season) -> Result<Vec<Record>, StatsError> {
        let stats = self.fetcher.fetch(StatKind::PlayerPitching, season).await?;
        let qualified = stats.filter_at_least("IP", MIN_INNINGS_PITCHED)?;
        Ok(qualified.to_records()?)
    }
}
