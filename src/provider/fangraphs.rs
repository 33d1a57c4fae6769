use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

use super::StatsProvider;
use crate::error::ProviderError;
use crate::models::{Season, StatKind};
use crate::table::StatTable;

pub const DEFAULT_BASE_URL: &str = "https://www.fangraphs.com";

const LEADERS_PATH: &str = "/api/leaders/major-league/data";

// Large enough that every player of a season fits on a single page
const PAGE_ITEMS: &str = "2000000000";

// Names and teams come back wrapped in links, e.g. <a href="...">NYY</a>
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("HTML tag pattern is valid"));

#[derive(Deserialize)]
struct LeadersResponse {
    data: Vec<serde_json::Map<String, Value>>,
}

/// Client for the FanGraphs leaderboard API.
#[derive(Debug, Clone)]
pub struct FanGraphsProvider {
    http: reqwest::Client,
    base_url: String,
}

impl Default for FanGraphsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FanGraphsProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn leaders_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), LEADERS_PATH)
    }
}

#[async_trait]
impl StatsProvider for FanGraphsProvider {
    async fn fetch(&self, kind: StatKind, season: Season) -> Result<StatTable, ProviderError> {
        let stats = if kind.is_batting() { "bat" } else { "pit" };
        let team = if kind.is_team() { "0,ts" } else { "0" };
        let season = season.to_string();

        let url = self.leaders_url();
        debug!("Fetching {} for {} from {}", kind, season, url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("age", ""),
                ("pos", "all"),
                ("stats", stats),
                ("lg", "all"),
                ("qual", "0"),
                ("season", season.as_str()),
                ("season1", season.as_str()),
                ("startdate", ""),
                ("enddate", ""),
                ("month", "0"),
                ("team", team),
                ("pageitems", PAGE_ITEMS),
                ("pagenum", "1"),
                ("ind", "0"),
                ("rost", "0"),
                ("players", ""),
                ("type", "8"),
                ("sortdir", "default"),
                ("sortstat", "WAR"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        let mut leaders: LeadersResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;

        for record in &mut leaders.data {
            for value in record.values_mut() {
                strip_markup(value);
            }
        }

        let table = StatTable::from_records(&leaders.data);
        debug!("Provider returned {} rows for {} {}", table.len(), kind, season);
        Ok(table)
    }
}

fn strip_markup(value: &mut Value) {
    if let Value::String(s) = value
        && s.contains('<')
    {
        let cleaned = HTML_TAG.replace_all(s, "").trim().to_string();
        *s = cleaned;
    }
}
