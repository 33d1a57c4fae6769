use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One output row: column name to JSON scalar, in table column order.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// A statistics-collection year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Season(pub i32);

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four tables the provider can produce for a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    TeamBatting,
    TeamPitching,
    PlayerBatting,
    PlayerPitching,
}

impl StatKind {
    pub const ALL: [StatKind; 4] = [
        StatKind::TeamBatting,
        StatKind::TeamPitching,
        StatKind::PlayerBatting,
        StatKind::PlayerPitching,
    ];

    pub fn is_team(self) -> bool {
        matches!(self, StatKind::TeamBatting | StatKind::TeamPitching)
    }

    pub fn is_batting(self) -> bool {
        matches!(self, StatKind::TeamBatting | StatKind::PlayerBatting)
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatKind::TeamBatting => "team_batting",
            StatKind::TeamPitching => "team_pitching",
            StatKind::PlayerBatting => "player_batting",
            StatKind::PlayerPitching => "player_pitching",
        };
        f.write_str(name)
    }
}

/// Pipelines exposed through `GET /stats?dataType=...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    TeamStats,
    PlayerBatting,
    PlayerPitching,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDataType(pub String);

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "team_stats" => Ok(DataType::TeamStats),
            "player_batting" => Ok(DataType::PlayerBatting),
            "player_pitching" => Ok(DataType::PlayerPitching),
            other => Err(UnknownDataType(other.to_string())),
        }
    }
}

/// Raw query string for the stats endpoint. Both fields are validated by the
/// handler so that bad input maps onto our own 400 body.
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    #[serde(rename = "dataType", default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
}

/// Success envelope for `/stats`
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub data: Vec<Record>,
}

impl StatsResponse {
    pub fn ok(data: Vec<Record>) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
}
