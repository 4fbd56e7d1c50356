// API integration tests that verify HTTP endpoints
// Tests the Axum router against a mocked sheet source

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::fast_retry;
use dispatch_report_service::api::{create_router, AppState};
use dispatch_report_service::fetcher::SheetFetcher;
use dispatch_report_service::schema::RowWindow;
use dispatch_report_service::services::ReportService;
use dispatch_report_service::sheets_client::{SheetsApiClient, SheetsAuth};
use http_body_util::BodyExt; // For `.collect()`
use mockito::{Matcher, Server, ServerGuard};
use serde_json::Value;
use tower::ServiceExt; // For `oneshot`

const SAMPLE_BODY: &str = r#"{
    "range": "gen!A4:F13",
    "majorDimension": "ROWS",
    "values": [
        ["Org A", "10", "7", "2", "1", "0"],
        ["", "", "", "", "", ""],
        ["Org B", "4", "4", "0", "0", "0"],
        ["Idle", "0", "0"]
    ]
}"#;

fn app_for(server: &ServerGuard) -> axum::Router {
    let client = SheetsApiClient::new(
        server.url(),
        "doc-1",
        SheetsAuth::None,
        Duration::from_secs(5),
    )
    .unwrap();
    let fetcher = SheetFetcher::with_settings(client, RowWindow::default(), fast_retry());
    let report_service = ReportService::new(fetcher, Duration::from_secs(60));
    create_router(AppState { report_service })
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = Server::new_async().await;
    let (status, json) = get_json(app_for(&server), "/api/v1/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_periods_endpoint() {
    let server = Server::new_async().await;
    let (status, json) = get_json(app_for(&server), "/api/v1/periods").await;

    assert_eq!(status, StatusCode::OK);
    let periods = json.as_array().unwrap();
    assert_eq!(periods.len(), 13);
    assert_eq!(periods[0]["key"], "jan");
    assert_eq!(periods[5]["sheet_name"], "june");
    assert_eq!(periods[12]["key"], "year");
    assert_eq!(periods[12]["sheet_name"], "gen");
    assert_eq!(periods[12]["label"], "Год");
}

#[tokio::test]
async fn test_report_endpoint() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Regex(r"^/v4/spreadsheets/doc-1/values/gen!A4:F13".to_string()))
        .with_status(200)
        .with_body(SAMPLE_BODY)
        .create_async()
        .await;

    let (status, json) = get_json(app_for(&server), "/api/v1/reports/year").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["period"], "year");
    assert_eq!(json["sheet_name"], "gen");

    let records = json["records"].as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["organization"], "Org A");
    assert_eq!(records[1]["organization"], "Org B");
    assert_eq!(records[2]["organization"], "Idle");

    assert_eq!(json["totals"]["total"], 14);
    assert_eq!(json["totals"]["closed"], 11);
    assert_eq!(json["totals"]["open"], 2);
    assert_eq!(json["totals"]["cancelled"], 1);
    assert_eq!(json["totals"]["erroneous"], 0);

    assert_eq!(json["highlights"]["all_closed"], false);
    assert_eq!(json["highlights"]["needs_attention"], true);

    // Idle organizations are left out of the chart series
    let distribution = json["distribution"].as_array().unwrap();
    assert_eq!(distribution.len(), 2);
    assert!(json["generated_at"].is_string());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_report_endpoint_is_cached() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Regex(r"^/v4/spreadsheets/doc-1/values/".to_string()))
        .with_status(200)
        .with_body(SAMPLE_BODY)
        .expect(1)
        .create_async()
        .await;

    let app = app_for(&server);
    let (first, _) = get_json(app.clone(), "/api/v1/reports/jan").await;
    let (second, _) = get_json(app, "/api/v1/reports/jan").await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unknown_period_is_bad_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (status, json) = get_json(app_for(&server), "/api/v1/reports/quarter").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = json["error"].as_str().unwrap();
    assert!(message.starts_with("could not load period quarter"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_sheet_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", Matcher::Regex(r"^/v4/spreadsheets/doc-1/values/".to_string()))
        .with_status(400)
        .with_body(r#"{"error": {"code": 400, "message": "Unable to parse range: sept!A4:F13"}}"#)
        .create_async()
        .await;

    let (status, json) = get_json(app_for(&server), "/api/v1/reports/sep").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("could not load period sep"));
}

#[tokio::test]
async fn test_unavailable_source_is_service_unavailable() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Regex(r"^/v4/spreadsheets/doc-1/values/".to_string()))
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let (status, json) = get_json(app_for(&server), "/api/v1/reports/feb").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("could not load period feb"));
    assert!(message.contains("3 attempt"));
    // No records are returned alongside the error
    assert!(json.get("records").is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_openapi_document() {
    let server = Server::new_async().await;
    let (status, json) = get_json(app_for(&server), "/api/v1/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/v1/reports/{period}"].is_object());
    assert!(json["components"]["schemas"]["ReportResponse"].is_object());
}
