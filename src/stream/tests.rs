//! Tests for stream module

use super::*;
use crate::error::Error;
use crate::http::HttpClientConfig;
use chrono::{Duration, Local, NaiveDate};
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration as StdDuration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> Arc<HttpClient> {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .max_retries(2)
        .retry_delay(StdDuration::from_millis(5))
        .no_request_delay()
        .build();
    Arc::new(HttpClient::with_config(config).unwrap())
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
}

fn records(values: Vec<serde_json::Value>) -> Vec<Record> {
    values
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
}

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .expect(times)
        .mount(server)
        .await;
}

// ============================================================================
// Descriptor / DateWindow Tests
// ============================================================================

#[test]
fn test_descriptor_accessors() {
    let descriptor = StreamDescriptor::new("games", "score/{date}", ["games"]);
    assert_eq!(descriptor.name(), "games");
    assert_eq!(descriptor.endpoint(), "score/{date}");
    assert_eq!(descriptor.field_path(), &["games".to_string()]);

    let empty = StreamDescriptor::new(
        "boxscore",
        "gamecenter/{game_id}/boxscore",
        Vec::<String>::new(),
    );
    assert!(empty.field_path().is_empty());
}

#[test]
fn test_window_visits_each_date_ascending() {
    let window = DateWindow::new(date("2024-11-04"), date("2024-11-07"), 1).unwrap();
    let dates: Vec<String> = window.dates().map(format_date).collect();
    assert_eq!(
        dates,
        vec!["2024-11-04", "2024-11-05", "2024-11-06", "2024-11-07"]
    );
}

#[test]
fn test_window_step_granularity() {
    let window = DateWindow::new(date("2024-11-01"), date("2024-11-10"), 3).unwrap();
    let dates: Vec<String> = window.dates().map(format_date).collect();
    assert_eq!(
        dates,
        vec!["2024-11-01", "2024-11-04", "2024-11-07", "2024-11-10"]
    );
}

#[test]
fn test_window_single_day() {
    let window = DateWindow::new(date("2024-11-04"), date("2024-11-04"), 1).unwrap();
    assert_eq!(window.dates().count(), 1);
}

#[test]
fn test_window_negative_range_is_empty() {
    let window = DateWindow::new(date("2024-11-07"), date("2024-11-04"), 1).unwrap();
    assert_eq!(window.dates().count(), 0);
}

#[test]
fn test_window_crosses_month_boundary() {
    let window = DateWindow::new(date("2024-10-30"), date("2024-11-02"), 1).unwrap();
    let dates: Vec<String> = window.dates().map(format_date).collect();
    assert_eq!(
        dates,
        vec!["2024-10-30", "2024-10-31", "2024-11-01", "2024-11-02"]
    );
}

#[test]
fn test_window_zero_step_rejected() {
    let result = DateWindow::new(date("2024-11-01"), date("2024-11-02"), 0);
    assert!(matches!(result, Err(Error::InvalidConfigValue { .. })));
}

#[test]
fn test_window_parse_defaults() {
    let today = Local::now().date_naive();
    let window = DateWindow::parse(None, None, 1).unwrap();
    assert_eq!(window.end(), today);
    assert_eq!(window.start(), today - Duration::days(7));

    let window = DateWindow::parse(Some("2024-11-04"), Some("2024-11-07"), 2).unwrap();
    assert_eq!(window.start(), date("2024-11-04"));
    assert_eq!(window.end(), date("2024-11-07"));
    assert_eq!(window.step_days(), 2);
}

#[test]
fn test_window_parse_bad_date() {
    let err = DateWindow::parse(Some("11/04/2024"), None, 1).unwrap_err();
    assert!(err.to_string().contains("start_date"));

    let err = DateWindow::parse(None, Some("2024-13-01"), 1).unwrap_err();
    assert!(err.to_string().contains("end_date"));
}

// ============================================================================
// SimpleStream Tests
// ============================================================================

#[tokio::test]
async fn test_simple_stream_reads_records() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/standings/now",
        json!({"standings": [{"teamAbbrev": "BOS"}, {"teamAbbrev": "NYR"}]}),
        1,
    )
    .await;

    let stream = SimpleStream::new(
        test_client(&server),
        StreamDescriptor::new("current_standings", "standings/now", ["standings"]),
    )
    .unwrap();

    let out: Vec<Record> = stream.read_records().collect().await;
    assert_eq!(
        out,
        records(vec![json!({"teamAbbrev": "BOS"}), json!({"teamAbbrev": "NYR"})])
    );
}

#[tokio::test]
async fn test_simple_stream_absent_response_is_empty() {
    let server = MockServer::start().await;
    mount_status(&server, "/standings/now", 404, 1).await;

    let stream = SimpleStream::new(
        test_client(&server),
        StreamDescriptor::new("current_standings", "standings/now", ["standings"]),
    )
    .unwrap();

    let out: Vec<Record> = stream.read_records().collect().await;
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_simple_stream_is_lazy() {
    let server = MockServer::start().await;
    mount_json(&server, "/standings/now", json!({"standings": []}), 0).await;

    let stream = SimpleStream::new(
        test_client(&server),
        StreamDescriptor::new("current_standings", "standings/now", ["standings"]),
    )
    .unwrap();

    // Building the stream without polling it issues no request
    let records = stream.read_records();
    drop(records);
}

#[test]
fn test_simple_stream_rejects_placeholders() {
    let client = Arc::new(HttpClient::new().unwrap());
    let result = SimpleStream::new(
        client,
        StreamDescriptor::new("games", "score/{date}", ["games"]),
    );
    assert!(matches!(result, Err(Error::Template { .. })));
}

// ============================================================================
// IncrementalStream Tests
// ============================================================================

#[tokio::test]
async fn test_incremental_stream_stamps_dates_in_order() {
    let server = MockServer::start().await;
    mount_json(&server, "/score/2024-11-04", json!({"games": [{"id": 1}, {"id": 2}]}), 1).await;
    mount_json(&server, "/score/2024-11-05", json!({"games": [{"id": 3}]}), 1).await;
    mount_json(&server, "/score/2024-11-06", json!({"games": [{"id": 4}]}), 1).await;

    let window = DateWindow::new(date("2024-11-04"), date("2024-11-06"), 1).unwrap();
    let stream = IncrementalStream::new(
        test_client(&server),
        StreamDescriptor::new("games", "score/{date}", ["games"]),
        window,
    )
    .unwrap();

    let out: Vec<Record> = stream.read_records().collect().await;
    assert_eq!(
        out,
        records(vec![
            json!({"id": 1, "date": "2024-11-04"}),
            json!({"id": 2, "date": "2024-11-04"}),
            json!({"id": 3, "date": "2024-11-05"}),
            json!({"id": 4, "date": "2024-11-06"}),
        ])
    );
}

#[tokio::test]
async fn test_incremental_stream_skips_failed_dates() {
    let server = MockServer::start().await;
    mount_status(&server, "/standings/2024-11-04", 404, 1).await;
    mount_status(&server, "/standings/2024-11-05", 500, 2).await;
    mount_json(
        &server,
        "/standings/2024-11-06",
        json!({"standings": [{"teamAbbrev": "BOS"}]}),
        1,
    )
    .await;

    let window = DateWindow::new(date("2024-11-04"), date("2024-11-06"), 1).unwrap();
    let stream = IncrementalStream::new(
        test_client(&server),
        StreamDescriptor::new("daily_standings", "standings/{date}", ["standings"]),
        window,
    )
    .unwrap();

    let out: Vec<Record> = stream.read_records().collect().await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["teamAbbrev"], "BOS");
    assert_eq!(out[0]["date"], "2024-11-06");
}

#[tokio::test]
async fn test_incremental_stream_negative_range_issues_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"games": [{"id": 1}]})))
        .expect(0)
        .mount(&server)
        .await;

    let window = DateWindow::new(date("2024-11-06"), date("2024-11-04"), 1).unwrap();
    let stream = IncrementalStream::new(
        test_client(&server),
        StreamDescriptor::new("games", "score/{date}", ["games"]),
        window,
    )
    .unwrap();

    let out: Vec<Record> = stream.read_records().collect().await;
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_incremental_stream_fetches_dates_on_demand() {
    let server = MockServer::start().await;
    mount_json(&server, "/score/2024-11-04", json!({"games": [{"id": 1}]}), 1).await;
    mount_json(&server, "/score/2024-11-05", json!({"games": [{"id": 2}]}), 0).await;

    let window = DateWindow::new(date("2024-11-04"), date("2024-11-05"), 1).unwrap();
    let stream = IncrementalStream::new(
        test_client(&server),
        StreamDescriptor::new("games", "score/{date}", ["games"]),
        window,
    )
    .unwrap();

    let first: Vec<Record> = stream.read_records().take(1).collect().await;
    assert_eq!(first.len(), 1);
    assert_eq!(first[0]["id"], 1);
}

/// Log sink for asserting when a stream announces itself
#[derive(Clone, Default)]
struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn test_incremental_stream_announces_on_first_poll() {
    let server = MockServer::start().await;
    mount_json(&server, "/score/2024-11-04", json!({"games": [{"id": 1}]}), 1).await;

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let window = DateWindow::new(date("2024-11-04"), date("2024-11-04"), 1).unwrap();
    let stream = IncrementalStream::new(
        test_client(&server),
        StreamDescriptor::new("games", "score/{date}", ["games"]),
        window,
    )
    .unwrap();

    let records = stream.read_records();
    assert!(!logs.contents().contains("Fetching games"));

    let out: Vec<Record> = records.collect().await;
    assert_eq!(out.len(), 1);
    assert!(logs
        .contents()
        .contains("Fetching games from 2024-11-04 to 2024-11-04"));
}

#[test]
fn test_incremental_stream_rejects_foreign_placeholder() {
    let client = Arc::new(HttpClient::new().unwrap());
    let window = DateWindow::new(date("2024-11-04"), date("2024-11-05"), 1).unwrap();
    let result = IncrementalStream::new(
        client,
        StreamDescriptor::new("rosters", "roster/{team_abv}/current", Vec::<String>::new()),
        window,
    );
    assert!(result.is_err());
}

// ============================================================================
// DependentStream Tests
// ============================================================================

fn teams_stream(client: Arc<HttpClient>) -> Arc<ExtractStream> {
    Arc::new(
        SimpleStream::new(
            client,
            StreamDescriptor::new("current_teams", "schedule-calendar/now", ["teams"]),
        )
        .unwrap()
        .into(),
    )
}

fn rosters_stream(client: Arc<HttpClient>) -> DependentStream {
    DependentStream::new(
        Arc::clone(&client),
        StreamDescriptor::new("team_rosters", "roster/{team_abv}/current", Vec::<String>::new()),
        teams_stream(client),
        "abbrev",
        "team_abv",
    )
    .unwrap()
}

#[tokio::test]
async fn test_dependent_stream_skips_failed_partitions() {
    let server = MockServer::start().await;
    mount_status(&server, "/roster/BOS/current", 404, 1).await;
    mount_json(
        &server,
        "/roster/NYR/current",
        json!({"forwards": [{"id": 8478550}]}),
        1,
    )
    .await;

    let stream = rosters_stream(test_client(&server));
    let parents = records(vec![json!({"abbrev": "BOS"}), json!({"abbrev": "NYR"})]);

    let out: Vec<Record> = stream.read_records(Some(&parents)).collect().await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["team_abv"], "NYR");
    assert_eq!(out[0]["forwards"][0]["id"], 8478550);
}

#[tokio::test]
async fn test_dependent_stream_missing_key_issues_no_request() {
    let server = MockServer::start().await;
    mount_json(&server, "/roster/BOS/current", json!({"forwards": []}), 1).await;

    let stream = rosters_stream(test_client(&server));
    let parents = records(vec![
        json!({"name": "no key"}),
        json!({"abbrev": null}),
        json!({"abbrev": "BOS"}),
    ]);

    let out: Vec<Record> = stream.read_records(Some(&parents)).collect().await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["team_abv"], "BOS");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_dependent_stream_materializes_parent() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/schedule-calendar/now",
        json!({"teams": [{"abbrev": "BOS"}, {"abbrev": "NYR"}]}),
        1,
    )
    .await;
    mount_json(&server, "/roster/BOS/current", json!({"goalies": [1]}), 1).await;
    mount_json(&server, "/roster/NYR/current", json!({"goalies": [2]}), 1).await;

    let stream = rosters_stream(test_client(&server));
    let out: Vec<Record> = stream.read_records(None).collect().await;

    let teams: Vec<&str> = out.iter().map(|r| r["team_abv"].as_str().unwrap()).collect();
    assert_eq!(teams, vec!["BOS", "NYR"]);
}

#[tokio::test]
async fn test_dependent_stream_numeric_partition_with_field_path() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/gamecenter/2024020001/landing",
        json!({"summary": {"periods": [{"number": 1}, {"number": 2}]}}),
        1,
    )
    .await;

    let client = test_client(&server);
    let games: Arc<ExtractStream> = Arc::new(
        SimpleStream::new(
            Arc::clone(&client),
            StreamDescriptor::new("games", "score/now", ["games"]),
        )
        .unwrap()
        .into(),
    );
    let stream = DependentStream::new(
        client,
        StreamDescriptor::new(
            "periods",
            "gamecenter/{game_id}/landing",
            ["summary", "periods"],
        ),
        games,
        "id",
        "game_id",
    )
    .unwrap();

    let parents = records(vec![json!({"id": 2024020001})]);
    let out: Vec<Record> = stream.read_records(Some(&parents)).collect().await;

    assert_eq!(
        out,
        records(vec![
            json!({"number": 1, "game_id": 2024020001}),
            json!({"number": 2, "game_id": 2024020001}),
        ])
    );
}

#[tokio::test]
async fn test_dependent_stream_drops_non_object_bodies() {
    let server = MockServer::start().await;
    mount_json(&server, "/roster/BOS/current", json!([{"id": 1}]), 1).await;

    let stream = rosters_stream(test_client(&server));
    let parents = records(vec![json!({"abbrev": "BOS"})]);

    let out: Vec<Record> = stream.read_records(Some(&parents)).collect().await;
    assert!(out.is_empty());
}

#[test]
fn test_partition_values_keep_order_and_duplicates() {
    let client = Arc::new(HttpClient::new().unwrap());
    let stream = rosters_stream(client);
    let parents = records(vec![
        json!({"abbrev": "NYR"}),
        json!({"abbrev": "BOS"}),
        json!({"other": 1}),
        json!({"abbrev": "NYR"}),
    ]);

    assert_eq!(
        stream.partition_values(&parents),
        vec![json!("NYR"), json!("BOS"), json!("NYR")]
    );
}

#[test]
fn test_dependent_stream_rejects_foreign_placeholder() {
    let client = Arc::new(HttpClient::new().unwrap());
    let result = DependentStream::new(
        Arc::clone(&client),
        StreamDescriptor::new("boxscore", "gamecenter/{game_id}/boxscore", Vec::<String>::new()),
        teams_stream(client),
        "abbrev",
        "team_abv",
    );
    assert!(result.is_err());
}

// ============================================================================
// ExtractStream Tests
// ============================================================================

#[test]
fn test_extract_stream_kind_and_parent() {
    let client = Arc::new(HttpClient::new().unwrap());
    let teams = teams_stream(Arc::clone(&client));
    assert_eq!(teams.kind(), StreamKind::Simple);
    assert!(teams.parent().is_none());

    let rosters: ExtractStream = rosters_stream(client).into();
    assert_eq!(rosters.kind(), StreamKind::Dependent);
    assert_eq!(rosters.name(), "team_rosters");
    assert_eq!(rosters.parent().unwrap().name(), "current_teams");
}
