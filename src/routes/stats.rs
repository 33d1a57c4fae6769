use axum::{
    extract::{Query, State},
    response::Json,
};

use super::{AppState, Clock};
use crate::error::ApiError;
use crate::models::{DataType, Season, StatsQuery, StatsResponse};

const INVALID_DATA_TYPE: &str = "Invalid dataType";

/// GET /stats?dataType=team_stats&season=2024
///
/// `dataType` is one of `team_stats`, `player_batting` or `player_pitching`.
/// `season` defaults to the current year when absent or zero.
pub async fn get_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, ApiError> {
    let data_type: DataType = params
        .data_type
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| ApiError::InvalidArgument(INVALID_DATA_TYPE.to_string()))?;

    let season = resolve_season(params.season.as_deref(), state.clock.as_ref())?;
    tracing::debug!("Serving {:?} for season {}", data_type, season);

    let data = state.stats.run(data_type, season).await?;

    Ok(Json(StatsResponse::ok(data)))
}

fn resolve_season(raw: Option<&str>, clock: &dyn Clock) -> Result<Season, ApiError> {
    let year = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s
            .parse::<i32>()
            .map_err(|_| ApiError::InvalidArgument(format!("season must be an integer, got '{}'", s)))?,
        None => 0,
    };

    // Zero is treated like an absent season
    if year == 0 {
        Ok(Season(clock.current_year()))
    } else {
        Ok(Season(year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::CountingProvider;
    use crate::cache::MemoizedFetcher;
    use crate::models::StatKind;
    use crate::routes::router;
    use crate::stats::StatsService;
    use crate::table::{Cell, Column, StatTable};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct FixedClock(i32);

    impl Clock for FixedClock {
        fn current_year(&self) -> i32 {
            self.0
        }
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn fixture_provider() -> CountingProvider {
        let team_batting = StatTable::new(vec![
            Column::new("Team", vec![text("A"), text("B")]),
            Column::new("SO", vec![Cell::Int(1250), Cell::Int(1310)]),
            Column::new("BB", vec![Cell::Int(530), Cell::Int(470)]),
            Column::new("AVG", vec![Cell::Float(0.251), Cell::Float(0.244)]),
        ])
        .unwrap();
        let team_pitching = StatTable::new(vec![
            Column::new("Team", vec![text("B"), text("C")]),
            Column::new("SO", vec![Cell::Int(1402), Cell::Int(1288)]),
            Column::new("BB", vec![Cell::Int(455), Cell::Int(512)]),
            Column::new("W", vec![Cell::Float(92.0), Cell::Float(f64::NAN)]),
        ])
        .unwrap();
        let player_batting = StatTable::new(vec![
            Column::new("Name", vec![text("Everyday"), text("Bench"), text("Platoon")]),
            Column::new("AB", vec![Cell::Int(601), Cell::Int(57), Cell::Int(212)]),
            Column::new("HR", vec![Cell::Float(38.0), Cell::Float(2.0), Cell::Missing]),
        ])
        .unwrap();
        let player_pitching = StatTable::new(vec![
            Column::new("Name", vec![text("Ace"), text("Mopup"), text("Closer")]),
            Column::new("IP", vec![Cell::Float(201.2), Cell::Float(12.1), Cell::Float(61.0)]),
        ])
        .unwrap();

        CountingProvider::default()
            .with_table(StatKind::TeamBatting, team_batting)
            .with_table(StatKind::TeamPitching, team_pitching)
            .with_table(StatKind::PlayerBatting, player_batting)
            .with_table(StatKind::PlayerPitching, player_pitching)
    }

    fn app_with(provider: CountingProvider, year: i32) -> (axum::Router, Arc<CountingProvider>) {
        let provider = Arc::new(provider);
        let stats = StatsService::new(MemoizedFetcher::new(provider.clone()));
        let state = AppState::with_clock(stats, Arc::new(FixedClock(year)));
        (router(state), provider)
    }

    async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn contains_null(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Array(items) => items.iter().any(contains_null),
            Value::Object(map) => map.values().any(contains_null),
            _ => false,
        }
    }

    #[tokio::test]
    async fn root_reports_running() {
        let (app, _) = app_with(CountingProvider::default(), 2024);
        let (status, body) = get(&app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "PyBaseball service is running"}));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _) = app_with(CountingProvider::default(), 2024);
        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn team_stats_merges_both_tables() {
        let (app, _) = app_with(fixture_provider(), 2024);
        let (status, body) = get(&app, "/stats?dataType=team_stats&season=2023").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert!(!contains_null(&body));

        let data = body["data"].as_array().unwrap();
        let teams: Vec<&str> = data.iter().map(|r| r["Team"].as_str().unwrap()).collect();
        assert_eq!(teams, vec!["A", "B", "C"]);

        assert_eq!(data[0]["SO_pitching"], json!(0));
        assert_eq!(data[0]["W"], json!(0));
        assert_eq!(data[1]["SO_batting"], json!(1310));
        assert_eq!(data[1]["SO_pitching"], json!(1402));
        assert_eq!(data[1]["W"], json!(92));
        assert_eq!(data[2]["BB_batting"], json!(0));
        assert_eq!(data[2]["AVG"], json!(0.0));
        assert!(data[0].get("SO").is_none());
    }

    #[tokio::test]
    async fn player_batting_filters_low_at_bats() {
        let (app, _) = app_with(fixture_provider(), 2024);
        let (status, body) = get(&app, "/stats?dataType=player_batting&season=2023").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"],
            json!([
                {"Name": "Everyday", "AB": 601, "HR": 38},
                {"Name": "Platoon", "AB": 212, "HR": 0}
            ])
        );
    }

    #[tokio::test]
    async fn player_pitching_filters_low_innings() {
        let (app, _) = app_with(fixture_provider(), 2024);
        let (status, body) = get(&app, "/stats?dataType=player_pitching&season=2023").await;

        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert!(data.iter().all(|r| r["IP"].as_f64().unwrap() >= 40.0));
    }

    #[tokio::test]
    async fn unknown_data_type_is_rejected_without_fetching() {
        let (app, provider) = app_with(fixture_provider(), 2024);

        let (status, body) = get(&app, "/stats?dataType=bogus&season=2023").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Invalid dataType");

        let (status, _) = get(&app, "/stats?season=2023").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn non_integer_season_is_rejected() {
        let (app, provider) = app_with(fixture_provider(), 2024);
        let (status, body) = get(&app, "/stats?dataType=team_stats&season=last").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "season must be an integer, got 'last'");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn season_defaults_to_current_year() {
        let (app, provider) = app_with(fixture_provider(), 2031);

        let (status, _) = get(&app, "/stats?dataType=player_batting").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get(&app, "/stats?dataType=player_pitching&season=0").await;
        assert_eq!(status, StatusCode::OK);

        let seasons = provider.seasons.lock().unwrap().clone();
        assert_eq!(
            seasons,
            vec![
                (StatKind::PlayerBatting, Season(2031)),
                (StatKind::PlayerPitching, Season(2031)),
            ]
        );
    }

    #[tokio::test]
    async fn repeated_requests_are_served_from_cache() {
        let (app, provider) = app_with(fixture_provider(), 2024);

        let (_, first) = get(&app, "/stats?dataType=team_stats&season=2022").await;
        let (_, second) = get(&app, "/stats?dataType=team_stats&season=2022").await;

        assert_eq!(first, second);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn provider_failure_is_a_server_error() {
        let (app, provider) = app_with(CountingProvider::failing(), 2024);

        let (status, body) = get(&app, "/stats?dataType=player_batting&season=2020").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["detail"],
            "An error occurred: stats provider returned status 502: upstream unavailable"
        );

        let (status, _) = get(&app, "/stats?dataType=player_batting&season=2020").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(provider.calls(), 2);
    }
}
